//! Editing-surface state for one content type node
//!
//! A [`Preview`] watches its node's data store (and child collection, for
//! containers) and keeps derived view state current: visibility, whether
//! the empty-container placeholder shows, and a copy of the data for
//! rendering. It also carries the node's editing actions (duplicate,
//! remove, hide/show) and its options menu.

mod options;
mod placeholder;
mod removal;

pub use options::{retrieve_options, OptionAction, OptionEntry};
pub use placeholder::{compute_placeholder_visible, parse_leading_float, PLACEHOLDER_MIN_HEIGHT};
pub use removal::{is_configured, ConfirmPrompt, Confirmation, PendingRemoval, RemoveOutcome};

use crate::config::ContentTypeConfig;
use crate::data_store::DataObject;
use crate::error::StageError;
use crate::events::{EventBus, StageEvent};
use crate::id_generator::NodeId;
use crate::observable::Subscription;
use crate::registry::ContentTypeDefinition;
use crate::stage::Stage;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, instrument};

/// Derived view state of a node
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    pub display_label: String,
    pub display: bool,
    pub is_placeholder_visible: bool,
    /// Containers only: whether the collection has no children
    pub is_empty: bool,
    pub preview_data: DataObject,
    /// Bumped on every data notification
    pub data_revision: u64,
    /// Bumped on every child-list notification
    pub children_revision: u64,
}

impl PreviewState {
    fn apply_data(&mut self, data: &DataObject) {
        self.display = display_flag(data.get("display"));
        self.is_placeholder_visible = compute_placeholder_visible(data);
        self.preview_data = data.clone();
    }
}

/// What choosing an options menu entry did
#[derive(Debug)]
pub enum OptionOutcome {
    /// Nothing happens on its own (drag handle)
    Ignored,
    /// The host should open the edit form for this node
    EditRequested(NodeId),
    VisibilityToggled(bool),
    Duplicated(NodeId),
    Removal(RemoveOutcome),
}

pub struct Preview {
    node: NodeId,
    definition: Rc<ContentTypeDefinition>,
    state: Rc<RefCell<PreviewState>>,
    _data_subscription: Subscription,
    _children_subscription: Option<Subscription>,
}

impl Preview {
    /// Bind a preview to `node`; state tracks the node until dropped
    pub fn new(stage: &Stage, node: &NodeId) -> Result<Self, StageError> {
        let content_type = stage.node(node)?;
        let definition = Rc::clone(content_type.definition());
        let data = content_type.data_store().get();

        let mut initial = PreviewState {
            display_label: definition.config.label.clone(),
            display: true,
            is_placeholder_visible: true,
            is_empty: content_type.children().is_empty(),
            preview_data: DataObject::new(),
            data_revision: 0,
            children_revision: 0,
        };
        initial.apply_data(&data);
        let state = Rc::new(RefCell::new(initial));

        let data_subscription = {
            let state = Rc::clone(&state);
            let events: EventBus = stage.events().clone();
            let id = node.clone();
            let type_name = definition.name().to_string();
            content_type.data_store().subscribe(move |data| {
                {
                    let mut state = state.borrow_mut();
                    state.apply_data(data);
                    state.data_revision += 1;
                }
                events.emit(StageEvent::PreviewDataUpdated {
                    id: id.clone(),
                    content_type: type_name.clone(),
                });
            })
        };

        let children_subscription = match content_type.collection() {
            Some(collection) => {
                let state = Rc::clone(&state);
                Some(collection.subscribe(move |children| {
                    let mut state = state.borrow_mut();
                    state.is_empty = children.is_empty();
                    state.children_revision += 1;
                }))
            }
            None => None,
        };

        Ok(Self {
            node: node.clone(),
            definition,
            state,
            _data_subscription: data_subscription,
            _children_subscription: children_subscription,
        })
    }

    pub fn node(&self) -> &NodeId {
        &self.node
    }

    pub fn config(&self) -> &ContentTypeConfig {
        &self.definition.config
    }

    pub fn state(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    pub fn display(&self) -> bool {
        self.state.borrow().display
    }

    pub fn is_placeholder_visible(&self) -> bool {
        self.state.borrow().is_placeholder_visible
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty
    }

    pub fn preview_data(&self) -> DataObject {
        self.state.borrow().preview_data.clone()
    }

    /// Class applied to the element that holds a container's children
    pub fn children_css(&self) -> String {
        format!("{}-container", self.definition.name())
    }

    pub fn options(&self) -> Vec<OptionEntry> {
        retrieve_options(&self.definition.config, self.display())
    }

    /// Write one field through the data store
    pub fn update_data(
        &self,
        stage: &Stage,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<bool, StageError> {
        Ok(stage.data_store(&self.node)?.update_field(key, value))
    }

    /// Flip the `display` field; returns the new value
    pub fn toggle_visibility(&self, stage: &Stage) -> Result<bool, StageError> {
        let store = stage.data_store(&self.node)?;
        let shown = !js_truthy(store.get_field("display").as_ref());
        store.update_field("display", shown);
        debug!(node = %self.node, shown, "toggled visibility");
        Ok(shown)
    }

    pub fn is_configured(&self, stage: &Stage) -> Result<bool, StageError> {
        let data = stage.data_store(&self.node)?.get();
        Ok(is_configured(&self.definition.config, &data))
    }

    /// Copy this node; see [`duplicate`]
    pub fn duplicate(&self, stage: &mut Stage, auto_append: bool) -> Result<NodeId, StageError> {
        duplicate(stage, &self.node, auto_append)
    }

    /// Remove this node, asking for confirmation first when it is configured
    #[instrument(skip(self, stage), fields(node = %self.node))]
    pub fn remove(&self, stage: &mut Stage) -> Result<RemoveOutcome, StageError> {
        if stage.parent(&self.node).is_none() {
            return Err(StageError::MissingParent(self.node.clone()));
        }
        if self.is_configured(stage)? {
            debug!("node is configured, asking for confirmation");
            return Ok(RemoveOutcome::PendingConfirmation(PendingRemoval::new(
                self.node.clone(),
            )));
        }
        removal::remove_from_parent(stage, &self.node)?;
        Ok(RemoveOutcome::Removed)
    }

    pub fn handle_option(
        &self,
        stage: &mut Stage,
        action: OptionAction,
    ) -> Result<OptionOutcome, StageError> {
        Ok(match action {
            OptionAction::Move => OptionOutcome::Ignored,
            OptionAction::Edit => OptionOutcome::EditRequested(self.node.clone()),
            OptionAction::ToggleVisibility => {
                OptionOutcome::VisibilityToggled(self.toggle_visibility(stage)?)
            }
            OptionAction::Duplicate => OptionOutcome::Duplicated(self.duplicate(stage, true)?),
            OptionAction::Remove => OptionOutcome::Removal(self.remove(stage)?),
        })
    }
}

impl std::fmt::Debug for Preview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preview")
            .field("node", &self.node)
            .field("content_type", &self.definition.name())
            .field("state", &self.state.borrow())
            .finish()
    }
}

/// Deep-copy `node` and its subtree
///
/// With `auto_append` the copy is inserted directly after the original;
/// otherwise it stays detached for the caller to place. Emits a duplicate
/// notification either way.
#[instrument(skip(stage))]
pub fn duplicate(stage: &mut Stage, node: &NodeId, auto_append: bool) -> Result<NodeId, StageError> {
    let parent = stage.parent(node).cloned();
    if auto_append && parent.is_none() {
        return Err(StageError::MissingParent(node.clone()));
    }
    let index = stage.index_of(node).map(|index| index + 1);
    let content_type = stage.node(node)?.name().to_string();

    let copy = stage.clone_subtree(node)?;
    if let Some(parent) = parent.filter(|_| auto_append) {
        if let Err(err) = stage.add_child(&parent, &copy, index) {
            stage.discard(&copy);
            return Err(err);
        }
    }

    stage.events().emit(StageEvent::DuplicateAfter {
        original: node.clone(),
        duplicate: copy.clone(),
        content_type,
        index,
    });
    Ok(copy)
}

/// Visibility for view state; a type without a `display` field is visible
fn display_flag(value: Option<&Value>) -> bool {
    match value {
        None => true,
        value => js_truthy(value),
    }
}

fn js_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;
    use crate::registry::Registry;
    use serde_json::json;

    fn stage() -> Stage {
        let registry = Registry::builtin(Rc::new(MediaUrlResolver::default())).unwrap();
        Stage::new("preview", Rc::new(registry)).unwrap()
    }

    #[test]
    fn test_state_follows_data() {
        let mut stage = stage();
        let row = stage.create("row", DataObject::new()).unwrap();
        let preview = Preview::new(&stage, &row).unwrap();
        assert!(preview.display());
        assert!(preview.is_empty());

        preview.update_data(&stage, "display", false).unwrap();
        let state = preview.state();
        assert!(!state.display);
        assert_eq!(state.data_revision, 1);
        assert_eq!(state.preview_data["display"], json!(false));
    }

    #[test]
    fn test_is_empty_follows_children() {
        let mut stage = stage();
        let row = stage.create("row", DataObject::new()).unwrap();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        let preview = Preview::new(&stage, &row).unwrap();

        stage.add_child(&row, &heading, None).unwrap();
        assert!(!preview.is_empty());
        assert_eq!(preview.state().children_revision, 1);
    }

    #[test]
    fn test_toggle_visibility() {
        let mut stage = stage();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        let preview = Preview::new(&stage, &heading).unwrap();

        assert!(!preview.toggle_visibility(&stage).unwrap());
        assert!(preview.toggle_visibility(&stage).unwrap());
        assert_eq!(preview.children_css(), "heading-container");
    }

    #[test]
    fn test_dropping_preview_unsubscribes() {
        let mut stage = stage();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        let preview = Preview::new(&stage, &heading).unwrap();
        assert_eq!(stage.data_store(&heading).unwrap().subscriber_count(), 1);
        drop(preview);
        assert_eq!(stage.data_store(&heading).unwrap().subscriber_count(), 0);
    }

    #[test]
    fn test_js_truthy() {
        assert!(!js_truthy(Some(&json!(0))));
        assert!(!js_truthy(Some(&json!(""))));
        assert!(js_truthy(Some(&json!("0"))));
        assert!(display_flag(None));
        assert!(!display_flag(Some(&Value::Null)));
    }
}
