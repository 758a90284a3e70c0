//! Stage event bus
//!
//! Every event goes out on a generic channel and, when it concerns a node,
//! on channels scoped to that node's content type and to the node itself.
//! Subscribers on the generic channel run first, then type-scoped, then
//! node-scoped ones. Events can also be deferred and delivered later by
//! [`EventBus::flush`], which is how mount notifications reach listeners
//! only after the mutation that caused them has completed.

use crate::id_generator::NodeId;
use crate::observable::{dispatch, Listeners, Subscription};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StageUpdated,
    MountAfter,
    RemoveAfter,
    DuplicateAfter,
    PreviewDataUpdated,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StageUpdated => "stage:updateAfter",
            EventKind::MountAfter => "contentType:mountAfter",
            EventKind::RemoveAfter => "contentType:removeAfter",
            EventKind::DuplicateAfter => "contentType:duplicateAfter",
            EventKind::PreviewDataUpdated => "previewData:updateAfter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageEvent {
    /// A collection's children changed
    StageUpdated { stage_id: String },
    MountAfter {
        id: NodeId,
        content_type: String,
    },
    RemoveAfter {
        id: NodeId,
        content_type: String,
        parent: NodeId,
        index: usize,
        stage_id: String,
    },
    DuplicateAfter {
        original: NodeId,
        duplicate: NodeId,
        content_type: String,
        /// Position of the copy; `None` when the original had no parent
        index: Option<usize>,
    },
    PreviewDataUpdated {
        id: NodeId,
        content_type: String,
    },
}

impl StageEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StageEvent::StageUpdated { .. } => EventKind::StageUpdated,
            StageEvent::MountAfter { .. } => EventKind::MountAfter,
            StageEvent::RemoveAfter { .. } => EventKind::RemoveAfter,
            StageEvent::DuplicateAfter { .. } => EventKind::DuplicateAfter,
            StageEvent::PreviewDataUpdated { .. } => EventKind::PreviewDataUpdated,
        }
    }

    /// Node the event is about
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            StageEvent::StageUpdated { .. } => None,
            StageEvent::MountAfter { id, .. }
            | StageEvent::RemoveAfter { id, .. }
            | StageEvent::PreviewDataUpdated { id, .. } => Some(id),
            StageEvent::DuplicateAfter { original, .. } => Some(original),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            StageEvent::StageUpdated { .. } => None,
            StageEvent::MountAfter { content_type, .. }
            | StageEvent::RemoveAfter { content_type, .. }
            | StageEvent::DuplicateAfter { content_type, .. }
            | StageEvent::PreviewDataUpdated { content_type, .. } => Some(content_type),
        }
    }
}

/// Which events of a kind a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventScope {
    Any,
    Type(String),
    Node(NodeId),
}

struct EventFilter {
    kind: EventKind,
    scope: EventScope,
}

/// Shared handle to a stage's event channels
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Listeners<StageEvent, EventFilter>,
    deferred: Rc<RefCell<VecDeque<StageEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        &self,
        kind: EventKind,
        scope: EventScope,
        callback: impl FnMut(&StageEvent) + 'static,
    ) -> Subscription {
        self.listeners.add(EventFilter { kind, scope }, callback)
    }

    /// Deliver an event now
    pub fn emit(&self, event: StageEvent) {
        let kind = event.kind();
        let mut callbacks = self
            .listeners
            .matching(|f| f.kind == kind && f.scope == EventScope::Any);

        if let Some(content_type) = event.content_type() {
            callbacks.extend(self.listeners.matching(|f| {
                f.kind == kind && matches!(&f.scope, EventScope::Type(name) if name == content_type)
            }));
        }
        if let Some(node) = event.node() {
            callbacks.extend(self.listeners.matching(|f| {
                f.kind == kind && matches!(&f.scope, EventScope::Node(id) if id == node)
            }));
        }

        trace!(event = kind.as_str(), listeners = callbacks.len(), "emitting stage event");
        dispatch(callbacks, &event);
    }

    /// Queue an event for the next [`EventBus::flush`]
    pub fn defer(&self, event: StageEvent) {
        self.deferred.borrow_mut().push_back(event);
    }

    /// Deliver queued events in order, including any queued while flushing
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.deferred.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.emit(event);
            delivered += 1;
        }
        delivered
    }

    pub fn pending(&self) -> usize {
        self.deferred.borrow().len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.listeners.len())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount(id: &str, content_type: &str) -> StageEvent {
        StageEvent::MountAfter {
            id: NodeId::from(id),
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn test_generic_channel_runs_before_type_channel() {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let typed = log.clone();
        let _a = bus.on(EventKind::MountAfter, EventScope::Type("row".into()), move |_| {
            typed.borrow_mut().push("row")
        });
        let generic = log.clone();
        let _b = bus.on(EventKind::MountAfter, EventScope::Any, move |_| {
            generic.borrow_mut().push("any")
        });

        bus.emit(mount("n1", "row"));
        bus.emit(mount("n2", "text"));

        assert_eq!(*log.borrow(), vec!["any", "row", "any"]);
    }

    #[test]
    fn test_node_scope() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let _sub = bus.on(EventKind::MountAfter, EventScope::Node("n1".into()), move |_| {
            *counter.borrow_mut() += 1
        });

        bus.emit(mount("n1", "row"));
        bus.emit(mount("n2", "row"));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn test_deferred_events_wait_for_flush() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let _sub = bus.on(EventKind::MountAfter, EventScope::Any, move |_| {
            *counter.borrow_mut() += 1
        });

        bus.defer(mount("n1", "row"));
        bus.defer(mount("n2", "row"));
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(bus.flush(), 2);
        assert_eq!(*hits.borrow(), 2);
        assert_eq!(bus.pending(), 0);
    }
}
