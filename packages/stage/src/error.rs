//! Error types for the stage

use crate::id_generator::NodeId;
use pagebuilder_markup::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not attached to a parent collection")]
    MissingParent(NodeId),

    #[error("Node {0} is not a collection")]
    NotACollection(NodeId),

    #[error("Unknown content type: {0}")]
    UnknownContentType(String),

    #[error("Content type '{child}' is not allowed inside '{parent}'")]
    ChildNotAllowed { parent: String, child: String },

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The stage root cannot be moved or removed")]
    RootImmutable,

    #[error("Node {0} appears more than once in the new child list")]
    DuplicateChild(NodeId),
}

/// Problems with a content type definition
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid definition JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid content type '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("Content type '{content_type}' field '{field}' uses unknown converter '{converter}'")]
    UnknownConverter {
        content_type: String,
        field: String,
        converter: String,
    },
}

impl RegistryError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// A raw markup value a converter could not interpret
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("invalid {kind} value {raw:?}")]
    Invalid { kind: &'static str, raw: String },
}

impl ConversionError {
    pub fn invalid(kind: &'static str, raw: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            raw: raw.into(),
        }
    }
}
