use crate::id_generator::NodeId;
use crate::observable::{dispatch, Listeners, Subscription};

/// Ordered children of a container node
///
/// Mutation goes through [`crate::Stage`], which keeps parent links and
/// membership consistent; this type only stores the order and notifies
/// watchers.
#[derive(Default)]
pub struct Collection {
    children: Vec<NodeId>,
    listeners: Listeners<[NodeId]>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn index_of(&self, node: &NodeId) -> Option<usize> {
        self.children.iter().position(|child| child == node)
    }

    /// Watch structural changes; the callback sees the new child order
    pub fn subscribe(&self, callback: impl FnMut(&[NodeId]) + 'static) -> Subscription {
        self.listeners.add((), callback)
    }

    /// Insert at `index`, appending when it is absent or out of range
    pub(crate) fn insert(&mut self, node: NodeId, index: Option<usize>) -> usize {
        let index = match index {
            Some(index) if index <= self.children.len() => index,
            _ => self.children.len(),
        };
        self.children.insert(index, node);
        index
    }

    pub(crate) fn remove(&mut self, node: &NodeId) -> Option<usize> {
        let index = self.index_of(node)?;
        self.children.remove(index);
        Some(index)
    }

    pub(crate) fn replace(&mut self, children: Vec<NodeId>) -> Vec<NodeId> {
        std::mem::replace(&mut self.children, children)
    }

    pub(crate) fn notify(&self) {
        let snapshot = self.children.clone();
        dispatch(self.listeners.all(), &snapshot[..]);
    }

    pub(crate) fn destroy(&self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("children", &self.children)
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_insert_clamps_index() {
        let mut collection = Collection::new();
        assert_eq!(collection.insert("a".into(), None), 0);
        assert_eq!(collection.insert("b".into(), Some(0)), 0);
        assert_eq!(collection.insert("c".into(), Some(99)), 2);

        let order: Vec<&str> = collection.children().iter().map(NodeId::as_str).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_notify_passes_current_order() {
        let mut collection = Collection::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let _sub = collection.subscribe(move |children| log.borrow_mut().push(children.len()));

        collection.insert("a".into(), None);
        collection.notify();
        assert_eq!(collection.remove(&"a".into()), Some(0));
        collection.notify();

        assert_eq!(*seen.borrow(), vec![1, 0]);
    }
}
