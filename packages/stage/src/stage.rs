//! The content tree
//!
//! A [`Stage`] owns every node in an arena keyed by [`NodeId`]. Parent and
//! child links are ids, and all structural mutation goes through the stage
//! so that a node's parent link and its membership in that parent's
//! collection always agree. Validation happens before any mutation, so a
//! failed operation leaves the tree untouched.

use crate::collection::Collection;
use crate::content_type::ContentType;
use crate::data_store::{DataObject, DataStore};
use crate::error::StageError;
use crate::events::{EventBus, StageEvent};
use crate::id_generator::{IdGenerator, NodeId};
use crate::observable::Subscription;
use crate::registry::{Registry, ROOT_CONTENT_TYPE};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, info};

/// Move a node under `target_parent` at `index` (appending when `None`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub node: NodeId,
    pub target_parent: NodeId,
    pub index: Option<usize>,
}

#[derive(Debug)]
pub struct Stage {
    id: String,
    ids: IdGenerator,
    registry: Rc<Registry>,
    nodes: HashMap<NodeId, ContentType>,
    root: NodeId,
    events: EventBus,
}

impl Stage {
    /// Create an empty stage rooted at a `root-container` node
    pub fn new(id: impl Into<String>, registry: Rc<Registry>) -> Result<Self, StageError> {
        let id = id.into();
        let definition = registry
            .get(ROOT_CONTENT_TYPE)
            .ok_or_else(|| StageError::UnknownContentType(ROOT_CONTENT_TYPE.to_string()))?;

        let mut ids = IdGenerator::new(&id);
        let root = ids.new_id();
        let data = DataStore::new(definition.config.defaults());
        let root_node = ContentType::new(root.clone(), definition, data);
        if !root_node.is_collection() {
            return Err(StageError::NotACollection(root));
        }

        let mut nodes = HashMap::new();
        nodes.insert(root.clone(), root_node);
        info!(stage = %id, root = %root, "created stage");

        Ok(Self {
            id,
            ids,
            registry,
            nodes,
            root,
            events: EventBus::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Number of live nodes, including the root and detached nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&ContentType> {
        self.nodes.get(id)
    }

    pub fn node(&self, id: &NodeId) -> Result<&ContentType, StageError> {
        self.nodes
            .get(id)
            .ok_or_else(|| StageError::NodeNotFound(id.clone()))
    }

    pub fn data_store(&self, id: &NodeId) -> Result<&DataStore, StageError> {
        Ok(&self.node(id)?.data_store)
    }

    pub fn parent(&self, id: &NodeId) -> Option<&NodeId> {
        self.nodes.get(id)?.parent.as_ref()
    }

    pub fn children(&self, id: &NodeId) -> Result<&[NodeId], StageError> {
        Ok(self.collection(id)?.children())
    }

    /// Position of a node within its parent
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.nodes.get(parent)?.collection.as_ref()?.index_of(id)
    }

    /// Watch a container's child order
    pub fn subscribe_children(
        &self,
        id: &NodeId,
        callback: impl FnMut(&[NodeId]) + 'static,
    ) -> Result<Subscription, StageError> {
        Ok(self.collection(id)?.subscribe(callback))
    }

    /// `id` and everything below it, in document order
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        self.walk_from(id).into_iter().map(|(_, id)| id).collect()
    }

    /// Attached nodes with their depth below the root, in document order
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        self.walk_from(&self.root)
    }

    fn walk_from(&self, id: &NodeId) -> Vec<(usize, NodeId)> {
        let mut out = Vec::new();
        let mut stack = vec![(0, id.clone())];
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children().iter().rev().map(|child| (depth + 1, child.clone())));
                out.push((depth, id));
            }
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Create a detached node; `data` is merged over the type's defaults
    pub fn create(&mut self, content_type: &str, data: DataObject) -> Result<NodeId, StageError> {
        let definition = self
            .registry
            .get(content_type)
            .ok_or_else(|| StageError::UnknownContentType(content_type.to_string()))?;

        let mut values = definition.config.defaults();
        values.extend(data);

        let id = self.ids.new_id();
        debug!(id = %id, content_type, "created content type");
        self.nodes.insert(
            id.clone(),
            ContentType::new(id.clone(), definition, DataStore::new(values)),
        );
        Ok(id)
    }

    /// Attach `node` to `parent` at `index`
    ///
    /// A node that already has a parent is moved: it leaves the old
    /// collection before joining the new one. `index` counts positions with
    /// the node already removed; a missing or out-of-range index appends.
    /// Returns the position the node ended up at.
    pub fn add_child(
        &mut self,
        parent: &NodeId,
        node: &NodeId,
        index: Option<usize>,
    ) -> Result<usize, StageError> {
        self.validate_attach(parent, node)?;

        let previous = self.detach(node);
        let inserted = self.collection_mut(parent)?.insert(node.clone(), index);
        if let Some(child) = self.nodes.get_mut(node) {
            child.parent = Some(parent.clone());
        }

        if let Some(previous) = previous.filter(|previous| previous != parent) {
            self.notify_children(&previous);
        }
        self.notify_children(parent);
        self.defer_mount(node);

        debug!(parent = %parent, node = %node, index = inserted, "added child");
        Ok(inserted)
    }

    /// Detach and destroy `node` if it is a child of `parent`
    ///
    /// Returns `false`, changing nothing, when it is not.
    pub fn remove_child(&mut self, parent: &NodeId, node: &NodeId) -> bool {
        let index = self
            .nodes
            .get(parent)
            .and_then(|p| p.collection.as_ref())
            .and_then(|collection| collection.index_of(node));
        let Some(index) = index else {
            debug!(parent = %parent, node = %node, "not a child, nothing to remove");
            return false;
        };

        let content_type = self
            .nodes
            .get(node)
            .map(|n| n.name().to_string())
            .unwrap_or_default();
        self.detach(node);
        let removed = self.destroy_subtree(node);

        self.notify_children(parent);
        self.events.emit(StageEvent::RemoveAfter {
            id: node.clone(),
            content_type,
            parent: parent.clone(),
            index,
            stage_id: self.id.clone(),
        });

        info!(node = %node, index, removed, "removed content type");
        true
    }

    /// Replace a container's children wholesale
    ///
    /// Previous children missing from `children` are detached but stay in
    /// the arena. They are returned so the caller can reattach them or hand
    /// them to [`Stage::discard`].
    pub fn set_children(
        &mut self,
        parent: &NodeId,
        children: Vec<NodeId>,
    ) -> Result<Vec<NodeId>, StageError> {
        self.collection(parent)?;
        let mut seen = HashSet::new();
        for child in &children {
            if !seen.insert(child) {
                return Err(StageError::DuplicateChild(child.clone()));
            }
            self.validate_attach(parent, child)?;
        }

        let previous = self.collection(parent)?.children().to_vec();

        let mut touched: Vec<NodeId> = Vec::new();
        for child in &children {
            let old_parent = self.parent(child).cloned();
            if let Some(old_parent) = old_parent.filter(|p| p != parent) {
                self.detach(child);
                if !touched.contains(&old_parent) {
                    touched.push(old_parent);
                }
            }
        }
        let displaced: Vec<NodeId> = previous
            .iter()
            .filter(|old| !children.contains(*old))
            .cloned()
            .collect();
        for old in &displaced {
            if let Some(node) = self.nodes.get_mut(old) {
                node.parent = None;
            }
        }
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(parent.clone());
            }
        }
        self.collection_mut(parent)?.replace(children.clone());

        for old_parent in &touched {
            self.notify_children(old_parent);
        }
        self.notify_children(parent);
        for child in children.iter().filter(|child| !previous.contains(*child)) {
            self.defer_mount(child);
        }

        debug!(parent = %parent, count = children.len(), displaced = displaced.len(), "replaced children");
        Ok(displaced)
    }

    pub fn apply_move(&mut self, request: MoveRequest) -> Result<usize, StageError> {
        if self.parent(&request.node).is_none() {
            return Err(StageError::MissingParent(request.node));
        }
        self.add_child(&request.target_parent, &request.node, request.index)
    }

    /// Deep-copy a node and its descendants into a new detached subtree
    pub fn clone_subtree(&mut self, source: &NodeId) -> Result<NodeId, StageError> {
        let node = self.node(source)?;
        let definition = Rc::clone(&node.definition);
        let data = node.data_store.get();
        let children = node.children().to_vec();

        let id = self.ids.new_id();
        self.nodes.insert(
            id.clone(),
            ContentType::new(id.clone(), definition, DataStore::new(data)),
        );

        for child in &children {
            let copy = self.clone_subtree(child)?;
            if let Some(collection) = self.nodes.get_mut(&id).and_then(|n| n.collection.as_mut()) {
                collection.insert(copy.clone(), None);
            }
            if let Some(copied) = self.nodes.get_mut(&copy) {
                copied.parent = Some(id.clone());
            }
        }
        Ok(id)
    }

    /// Destroy a detached node and its subtree
    ///
    /// Returns `false` for the root, attached nodes and unknown ids.
    pub fn discard(&mut self, id: &NodeId) -> bool {
        if *id == self.root || self.parent(id).is_some() || !self.contains(id) {
            return false;
        }
        self.destroy_subtree(id);
        true
    }

    /// Deliver queued mount notifications
    pub fn flush_deferred(&self) -> usize {
        self.events.flush()
    }

    fn collection(&self, id: &NodeId) -> Result<&Collection, StageError> {
        self.node(id)?
            .collection
            .as_ref()
            .ok_or_else(|| StageError::NotACollection(id.clone()))
    }

    fn collection_mut(&mut self, id: &NodeId) -> Result<&mut Collection, StageError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| StageError::NodeNotFound(id.clone()))?
            .collection
            .as_mut()
            .ok_or_else(|| StageError::NotACollection(id.clone()))
    }

    fn validate_attach(&self, parent: &NodeId, node: &NodeId) -> Result<(), StageError> {
        if *node == self.root {
            return Err(StageError::RootImmutable);
        }
        let parent_node = self.node(parent)?;
        let child = self.node(node)?;
        if !parent_node.is_collection() {
            return Err(StageError::NotACollection(parent.clone()));
        }
        if self.is_ancestor_or_self(node, parent) {
            return Err(StageError::CycleDetected);
        }
        if !parent_node.config().allows_child(child.name()) {
            return Err(StageError::ChildNotAllowed {
                parent: parent_node.name().to_string(),
                child: child.name().to_string(),
            });
        }
        Ok(())
    }

    /// Unlink a node from its parent; returns the former parent
    fn detach(&mut self, node: &NodeId) -> Option<NodeId> {
        let parent = self.nodes.get_mut(node)?.parent.take()?;
        if let Some(collection) = self.nodes.get_mut(&parent).and_then(|p| p.collection.as_mut()) {
            collection.remove(node);
        }
        Some(parent)
    }

    fn destroy_subtree(&mut self, id: &NodeId) -> usize {
        let doomed = self.descendants(id);
        for id in &doomed {
            if let Some(node) = self.nodes.remove(id) {
                node.destroy();
            }
        }
        doomed.len()
    }

    fn notify_children(&self, id: &NodeId) {
        if let Some(collection) = self.nodes.get(id).and_then(|n| n.collection.as_ref()) {
            collection.notify();
        }
        self.events.emit(StageEvent::StageUpdated {
            stage_id: self.id.clone(),
        });
    }

    fn defer_mount(&self, id: &NodeId) {
        if let Some(node) = self.nodes.get(id) {
            self.events.defer(StageEvent::MountAfter {
                id: id.clone(),
                content_type: node.name().to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;
    use crate::events::{EventKind, EventScope};
    use std::cell::RefCell;

    fn stage() -> Stage {
        let registry = Registry::builtin(Rc::new(MediaUrlResolver::default())).unwrap();
        Stage::new("test", Rc::new(registry)).unwrap()
    }

    #[test]
    fn test_add_child_sets_parent_and_order() {
        let mut stage = stage();
        let root = stage.root().clone();
        let a = stage.create("heading", DataObject::new()).unwrap();
        let b = stage.create("text", DataObject::new()).unwrap();

        stage.add_child(&root, &a, None).unwrap();
        assert_eq!(stage.add_child(&root, &b, Some(0)).unwrap(), 0);

        assert_eq!(stage.children(&root).unwrap(), &[b.clone(), a.clone()]);
        assert_eq!(stage.parent(&a), Some(&root));
        assert_eq!(stage.index_of(&a), Some(1));
    }

    #[test]
    fn test_move_keeps_single_membership() {
        let mut stage = stage();
        let root = stage.root().clone();
        let row1 = stage.create("row", DataObject::new()).unwrap();
        let row2 = stage.create("row", DataObject::new()).unwrap();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        stage.add_child(&root, &row1, None).unwrap();
        stage.add_child(&root, &row2, None).unwrap();
        stage.add_child(&row1, &heading, None).unwrap();

        stage
            .apply_move(MoveRequest {
                node: heading.clone(),
                target_parent: row2.clone(),
                index: None,
            })
            .unwrap();

        assert!(stage.children(&row1).unwrap().is_empty());
        assert_eq!(stage.children(&row2).unwrap(), &[heading.clone()]);
        assert_eq!(stage.parent(&heading), Some(&row2));
    }

    #[test]
    fn test_cycle_and_type_checks_leave_tree_untouched() {
        let mut stage = stage();
        let root = stage.root().clone();
        let row = stage.create("row", DataObject::new()).unwrap();
        let group = stage.create("column-group", DataObject::new()).unwrap();
        stage.add_child(&root, &row, None).unwrap();
        stage.add_child(&row, &group, None).unwrap();

        assert!(matches!(stage.add_child(&group, &row, None), Err(StageError::CycleDetected)));
        assert!(matches!(
            stage.add_child(&root, &group, None),
            Err(StageError::ChildNotAllowed { .. })
        ));
        assert_eq!(stage.parent(&group), Some(&row));
        assert_eq!(stage.children(&root).unwrap(), &[row.clone()]);
    }

    #[test]
    fn test_leaf_is_not_a_collection() {
        let mut stage = stage();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        let text = stage.create("text", DataObject::new()).unwrap();
        assert!(matches!(
            stage.add_child(&heading, &text, None),
            Err(StageError::NotACollection(_))
        ));
    }

    #[test]
    fn test_remove_child_destroys_subtree() {
        let mut stage = stage();
        let root = stage.root().clone();
        let row = stage.create("row", DataObject::new()).unwrap();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        stage.add_child(&root, &row, None).unwrap();
        stage.add_child(&row, &heading, None).unwrap();

        let removed = Rc::new(RefCell::new(Vec::new()));
        let log = removed.clone();
        let _sub = stage.events().on(EventKind::RemoveAfter, EventScope::Any, move |event| {
            log.borrow_mut().push(event.clone())
        });

        assert!(stage.remove_child(&root, &row));
        assert!(!stage.contains(&row));
        assert!(!stage.contains(&heading));
        assert!(matches!(
            removed.borrow()[0],
            StageEvent::RemoveAfter { index: 0, .. }
        ));

        // Second removal is a no-op
        assert!(!stage.remove_child(&root, &row));
        assert_eq!(removed.borrow().len(), 1);
    }

    #[test]
    fn test_set_children_detaches_missing() {
        let mut stage = stage();
        let root = stage.root().clone();
        let a = stage.create("text", DataObject::new()).unwrap();
        let b = stage.create("text", DataObject::new()).unwrap();
        let before = stage.len();
        assert!(stage.set_children(&root, vec![a.clone(), b.clone()]).unwrap().is_empty());
        let displaced = stage.set_children(&root, vec![b.clone()]).unwrap();

        assert_eq!(displaced, vec![a.clone()]);
        assert_eq!(stage.parent(&a), None);
        assert_eq!(stage.children(&root).unwrap(), &[b.clone()]);
        for node in &displaced {
            assert!(stage.discard(node));
        }
        assert!(!stage.discard(&b));
        assert_eq!(stage.len(), before - 1);
    }

    #[test]
    fn test_set_children_rejects_duplicates() {
        let mut stage = stage();
        let root = stage.root().clone();
        let a = stage.create("text", DataObject::new()).unwrap();
        assert!(matches!(
            stage.set_children(&root, vec![a.clone(), a.clone()]),
            Err(StageError::DuplicateChild(_))
        ));
        assert_eq!(stage.parent(&a), None);
    }

    #[test]
    fn test_mount_is_deferred() {
        let mut stage = stage();
        let root = stage.root().clone();
        let mounted = Rc::new(RefCell::new(Vec::new()));
        let log = mounted.clone();
        let _sub = stage.events().on(
            EventKind::MountAfter,
            EventScope::Type("heading".into()),
            move |event| log.borrow_mut().push(event.node().cloned()),
        );

        let heading = stage.create("heading", DataObject::new()).unwrap();
        stage.add_child(&root, &heading, None).unwrap();
        assert!(mounted.borrow().is_empty());

        assert_eq!(stage.flush_deferred(), 1);
        assert_eq!(*mounted.borrow(), vec![Some(heading)]);
    }

    #[test]
    fn test_clone_subtree_copies_data_and_children() {
        let mut stage = stage();
        let mut data = DataObject::new();
        data.insert("min_height".into(), "300".into());
        let row = stage.create("row", data).unwrap();
        let heading = stage.create("heading", DataObject::new()).unwrap();
        stage.add_child(&row, &heading, None).unwrap();

        let copy = stage.clone_subtree(&row).unwrap();
        assert_ne!(copy, row);
        assert_eq!(stage.parent(&copy), None);
        assert_eq!(stage.children(&copy).unwrap().len(), 1);
        assert_ne!(stage.children(&copy).unwrap()[0], heading);

        stage.data_store(&copy).unwrap().update_field("min_height", "10");
        assert_eq!(
            stage.data_store(&row).unwrap().get_field("min_height"),
            Some("300".into())
        );
    }
}
