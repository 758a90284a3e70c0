use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a content-type node, unique within its stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Derive a stage seed from its name using CRC32
pub fn get_stage_seed(stage_name: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(b"stage://");
    hasher.update(stage_name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential node ID generator scoped to one stage
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(stage_name: &str) -> Self {
        Self {
            seed: get_stage_seed(stage_name),
            count: 0,
        }
    }

    pub fn new_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
