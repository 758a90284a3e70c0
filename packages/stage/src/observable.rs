//! Listener tables with RAII subscriptions
//!
//! Callbacks run in registration order. The table is never borrowed while a
//! callback runs, so callbacks may subscribe, unsubscribe or trigger further
//! notifications. A callback that is already running is skipped if it is
//! reached again re-entrantly, and one unsubscribed earlier in the same pass
//! is not called.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::warn;

type Callback<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Entry<E: ?Sized, F> {
    id: u64,
    filter: F,
    listener: Listener<E>,
}

/// A callback taken out of its table for one notification pass
pub(crate) struct Listener<E: ?Sized> {
    callback: Callback<E>,
    /// Cleared when the subscription goes away
    alive: Rc<Cell<bool>>,
}

impl<E: ?Sized> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
            alive: Rc::clone(&self.alive),
        }
    }
}

struct Table<E: ?Sized, F> {
    next_id: u64,
    entries: Vec<Entry<E, F>>,
}

trait Detach {
    fn remove_listener(&self, id: u64);
}

impl<E: ?Sized, F> Detach for RefCell<Table<E, F>> {
    fn remove_listener(&self, id: u64) {
        if let Ok(mut table) = self.try_borrow_mut() {
            table.entries.retain(|entry| entry.id != id);
        }
    }
}

/// Ordered callbacks, each registered with a filter value
pub(crate) struct Listeners<E: ?Sized + 'static, F: 'static = ()> {
    table: Rc<RefCell<Table<E, F>>>,
}

impl<E: ?Sized + 'static, F: 'static> Clone for Listeners<E, F> {
    fn clone(&self) -> Self {
        Self {
            table: Rc::clone(&self.table),
        }
    }
}

impl<E: ?Sized + 'static, F: 'static> Default for Listeners<E, F> {
    fn default() -> Self {
        Self {
            table: Rc::new(RefCell::new(Table {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<E: ?Sized + 'static, F: 'static> Listeners<E, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, filter: F, callback: impl FnMut(&E) + 'static) -> Subscription {
        let alive = Rc::new(Cell::new(true));
        let listener = Listener {
            callback: Rc::new(RefCell::new(callback)),
            alive: Rc::clone(&alive),
        };
        let id = {
            let mut table = self.table.borrow_mut();
            table.next_id += 1;
            let id = table.next_id;
            table.entries.push(Entry {
                id,
                filter,
                listener,
            });
            id
        };

        let detach: Rc<dyn Detach> = self.table.clone();
        Subscription {
            table: Some(Rc::downgrade(&detach)),
            alive,
            id,
        }
    }

    /// Snapshot the callbacks whose filter passes `predicate`
    pub fn matching(&self, mut predicate: impl FnMut(&F) -> bool) -> Vec<Listener<E>> {
        self.table
            .borrow()
            .entries
            .iter()
            .filter(|entry| predicate(&entry.filter))
            .map(|entry| entry.listener.clone())
            .collect()
    }

    pub fn all(&self) -> Vec<Listener<E>> {
        self.matching(|_| true)
    }

    pub fn len(&self) -> usize {
        self.table.borrow().entries.len()
    }

    pub fn clear(&self) {
        for entry in self.table.borrow_mut().entries.drain(..) {
            entry.listener.alive.set(false);
        }
    }
}

/// Invoke a snapshot of callbacks with `event`
pub(crate) fn dispatch<E: ?Sized>(listeners: Vec<Listener<E>>, event: &E) {
    for listener in listeners {
        if !listener.alive.get() {
            continue;
        }
        match listener.callback.try_borrow_mut() {
            Ok(mut callback) => (&mut *callback)(event),
            Err(_) => warn!("skipping re-entrant listener"),
        }
    }
}

/// Handle to a registered callback
///
/// Dropping the handle (or calling [`Subscription::dispose`]) removes the
/// callback. [`Subscription::forget`] keeps it registered for as long as the
/// source lives.
#[must_use = "dropping a Subscription unsubscribes its callback"]
pub struct Subscription {
    table: Option<Weak<dyn Detach>>,
    alive: Rc<Cell<bool>>,
    id: u64,
}

impl Subscription {
    pub fn dispose(mut self) {
        self.unsubscribe();
    }

    pub fn forget(mut self) {
        self.table = None;
    }

    fn unsubscribe(&mut self) {
        if let Some(table) = self.table.take() {
            self.alive.set(false);
            if let Some(table) = table.upgrade() {
                table.remove_listener(self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.table.is_some())
            .finish()
    }
}
