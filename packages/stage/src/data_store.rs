//! Observable key/value store backing each content-type node

use crate::observable::{dispatch, Listener, Listeners, Subscription};
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tracing::trace;

/// Field values of a content type, keyed by field name
pub type DataObject = Map<String, Value>;

/// Turn a JSON value into a [`DataObject`]; anything but an object is empty
pub fn into_data_object(value: Value) -> DataObject {
    match value {
        Value::Object(map) => map,
        _ => DataObject::new(),
    }
}

/// Observable store of field values
///
/// An absent key is unset; `Value::Null` is an explicit null value. Updates
/// that leave the snapshot structurally unchanged notify nobody.
///
/// Notifications go out in update order. An update made from inside a
/// subscriber is applied at once but notified after the current pass ends.
#[derive(Default)]
pub struct DataStore {
    values: RefCell<DataObject>,
    /// Filter is the watched key; `None` watches the whole store
    listeners: Listeners<DataObject, Option<String>>,
    pending: RefCell<VecDeque<(Vec<Listener<DataObject>>, DataObject)>>,
    draining: Cell<bool>,
}

impl DataStore {
    pub fn new(initial: DataObject) -> Self {
        Self {
            values: RefCell::new(initial),
            ..Self::default()
        }
    }

    /// Current snapshot
    pub fn get(&self) -> DataObject {
        self.values.borrow().clone()
    }

    pub fn get_field(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    /// Merge `values` into the store
    ///
    /// Returns whether anything changed. Each whole-store subscriber is
    /// called once and each key subscriber at most once per update.
    pub fn update(&self, values: DataObject) -> bool {
        let (snapshot, changed) = {
            let mut state = self.values.borrow_mut();
            let changed: Vec<String> = values
                .iter()
                .filter(|(key, value)| state.get(key.as_str()) != Some(*value))
                .map(|(key, _)| key.clone())
                .collect();
            if changed.is_empty() {
                return false;
            }
            for (key, value) in values {
                state.insert(key, value);
            }
            (state.clone(), changed)
        };

        let listeners = self.listeners.matching(|filter| match filter {
            None => true,
            Some(key) => changed.contains(key),
        });
        trace!(keys = ?changed, listeners = listeners.len(), "data store updated");
        self.pending.borrow_mut().push_back((listeners, snapshot));
        self.drain();
        true
    }

    /// Deliver queued notifications; only the outermost update drains
    fn drain(&self) {
        if self.draining.replace(true) {
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some((listeners, snapshot)) = next else {
                break;
            };
            dispatch(listeners, &snapshot);
        }
        self.draining.set(false);
    }

    pub fn update_field(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let mut values = DataObject::new();
        values.insert(key.into(), value.into());
        self.update(values)
    }

    /// Watch every change to the store
    pub fn subscribe(&self, callback: impl FnMut(&DataObject) + 'static) -> Subscription {
        self.listeners.add(None, callback)
    }

    /// Watch changes to a single key
    pub fn subscribe_field(
        &self,
        key: impl Into<String>,
        callback: impl FnMut(&DataObject) + 'static,
    ) -> Subscription {
        self.listeners.add(Some(key.into()), callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every subscriber; values stay readable
    pub(crate) fn destroy(&self) {
        self.listeners.clear();
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("values", &self.values.borrow())
            .field("subscribers", &self.listeners.len())
            .finish()
    }
}
