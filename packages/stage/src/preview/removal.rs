use crate::config::ContentTypeConfig;
use crate::data_store::DataObject;
use crate::error::StageError;
use crate::id_generator::NodeId;
use crate::stage::Stage;
use serde_json::Value;
use tracing::debug;

/// Prompt shown before removing a configured node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub content: String,
    /// Key under which "don't ask again" is remembered
    pub dismiss_key: Option<String>,
    pub dismissible: bool,
}

impl ConfirmPrompt {
    pub fn removal() -> Self {
        Self {
            title: "Confirm Item Removal".to_string(),
            content: "Are you sure you want to remove this item? The data within this item is not recoverable once removed.".to_string(),
            dismiss_key: Some("pagebuilder_modal_dismissed".to_string()),
            dismissible: true,
        }
    }
}

/// Answers confirmation prompts, typically by asking the user
pub trait Confirmation {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
}

#[derive(Debug)]
pub enum RemoveOutcome {
    Removed,
    /// The node is configured; nothing happens until the removal is accepted
    PendingConfirmation(PendingRemoval),
}

/// A removal waiting on the user's answer
#[derive(Debug)]
#[must_use = "a pending removal does nothing until accepted"]
pub struct PendingRemoval {
    node: NodeId,
    prompt: ConfirmPrompt,
}

impl PendingRemoval {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            prompt: ConfirmPrompt::removal(),
        }
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn prompt(&self) -> &ConfirmPrompt {
        &self.prompt
    }

    /// Remove the node; `Ok(false)` if it is already gone from its parent
    pub fn accept(self, stage: &mut Stage) -> Result<bool, StageError> {
        remove_from_parent(stage, &self.node)
    }

    pub fn decline(self) {
        debug!(node = %self.node, "removal declined");
    }

    /// Ask `confirmation` and act on the answer
    pub fn resolve(self, stage: &mut Stage, confirmation: &mut dyn Confirmation) -> Result<bool, StageError> {
        if confirmation.confirm(&self.prompt) {
            self.accept(stage)
        } else {
            self.decline();
            Ok(false)
        }
    }
}

pub(crate) fn remove_from_parent(stage: &mut Stage, node: &NodeId) -> Result<bool, StageError> {
    let parent = stage
        .parent(node)
        .cloned()
        .ok_or_else(|| StageError::MissingParent(node.clone()))?;
    Ok(stage.remove_child(&parent, node))
}

/// Whether any field differs from its default
///
/// Values and defaults are normalized the same way: falsy values and empty
/// lists become `""`, other lists and objects their JSON text. An empty
/// value therefore matches an empty-list default and vice versa.
/// Fields in `fields_to_ignore_on_remove` are skipped.
pub fn is_configured(config: &ContentTypeConfig, data: &DataObject) -> bool {
    config
        .fields
        .iter()
        .filter(|field| !config.fields_to_ignore_on_remove.contains(&field.name))
        .any(|field| normalize(data.get(&field.name)) != normalize(Some(&field.default)))
}

fn normalize(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) if items.is_empty() => empty(),
        Some(structured @ (Value::Array(_) | Value::Object(_))) => Value::String(structured.to_string()),
        Some(value) if !is_falsy(value) => value.clone(),
        _ => empty(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn empty() -> Value {
    Value::String(String::new())
}
