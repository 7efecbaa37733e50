//! Immutable-snapshot state store with subscription notifications.
//!
//! All components read application state through [`StateStore::get`] and
//! write through [`StateStore::set`]; nothing keeps a private copy of
//! server-derived data between calls. A [`Snapshot`] is never mutated in
//! place: every `set` builds a fresh one, so the value returned by `get`
//! stays referentially stable between two consecutive `set` calls and
//! subscribers can use pointer identity for cheap change detection.
//!
//! The store is an explicit, constructed value passed to the components
//! that need it, not a process-wide global. It is single-threaded by
//! design, matching the cooperative event-loop model of the application.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::app::Tab;
use crate::graph::Diagram;

/// Point-in-time application state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The tab currently shown.
    pub active_tab: Tab,
    /// Result of the most recent health check.
    pub server_online: bool,
    /// Consecutive failed health checks.
    pub health_failure_count: u32,
    /// Whether periodic refresh is currently active.
    pub is_polling: bool,
    /// `GET /api/llm/status` result, opaque JSON.
    pub llm: Option<Value>,
    /// `GET /api/solace-agi/status` result.
    pub solace: Option<Value>,
    /// `GET /api/skills/list` result.
    pub skills: Option<Value>,
    /// `GET /api/swarms/list` result.
    pub swarms: Option<Value>,
    /// `GET /api/personas/list` result.
    pub personas: Option<Value>,
    /// Session cache of diagram source text, keyed by diagram name.
    pub graph_cache: HashMap<Diagram, String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            active_tab: Tab::Dashboard,
            server_online: false,
            health_failure_count: 0,
            is_polling: false,
            llm: None,
            solace: None,
            skills: None,
            swarms: None,
            personas: None,
            graph_cache: HashMap::new(),
        }
    }
}

/// A partial update merged into the current [`Snapshot`] by
/// [`StateStore::set`]. Fields left as `None` keep their current value.
#[derive(Debug, Default)]
pub struct StateUpdate {
    pub active_tab: Option<Tab>,
    pub server_online: Option<bool>,
    pub health_failure_count: Option<u32>,
    pub is_polling: Option<bool>,
    pub llm: Option<Value>,
    pub solace: Option<Value>,
    pub skills: Option<Value>,
    pub swarms: Option<Value>,
    pub personas: Option<Value>,
    /// Insert one diagram into the session cache.
    pub graph: Option<(Diagram, String)>,
    /// Drop every cached diagram. Applied before `graph`.
    pub clear_graph_cache: bool,
}

/// Handle returned by [`StateStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<RefCell<dyn FnMut(&Snapshot)>>;

/// The single shared mutable resource of the application.
///
/// `set` notifies subscribers synchronously, in registration order.
/// Unsubscribing from inside a callback is safe, but does not remove
/// callbacks already scheduled for the in-progress notification pass.
/// Calling `set` from inside a callback is not supported.
pub struct StateStore {
    snapshot: RefCell<Rc<Snapshot>>,
    subscribers: RefCell<Vec<(SubscriptionId, Callback)>>,
    next_id: Cell<u64>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store holding the default [`Snapshot`].
    pub fn new() -> Self {
        Self {
            snapshot: RefCell::new(Rc::new(Snapshot::default())),
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// The current snapshot. The returned `Rc` is the same allocation until
    /// the next `set`, so `Rc::ptr_eq` detects changes.
    pub fn get(&self) -> Rc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Merge a partial update into a new snapshot, replace the current one,
    /// and notify all subscribers with the new snapshot.
    pub fn set(&self, update: StateUpdate) {
        let next = {
            let current = self.snapshot.borrow();
            let mut snapshot = (**current).clone();
            apply(&mut snapshot, update);
            Rc::new(snapshot)
        };
        *self.snapshot.borrow_mut() = next.clone();

        // Clone the callback list up front: subscribers added or removed by
        // a callback take effect on the next pass.
        let scheduled: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in scheduled {
            (callback.borrow_mut())(&next);
        }
    }

    /// Register a callback invoked on every `set`, after the snapshot has
    /// been replaced.
    pub fn subscribe(&self, callback: impl FnMut(&Snapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.subscribers
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(callback))));
        id
    }

    /// Remove a previously registered callback. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .borrow_mut()
            .retain(|(subscription, _)| *subscription != id);
    }
}

fn apply(snapshot: &mut Snapshot, update: StateUpdate) {
    if let Some(tab) = update.active_tab {
        snapshot.active_tab = tab;
    }
    if let Some(online) = update.server_online {
        snapshot.server_online = online;
    }
    if let Some(count) = update.health_failure_count {
        snapshot.health_failure_count = count;
    }
    if let Some(polling) = update.is_polling {
        snapshot.is_polling = polling;
    }
    if let Some(value) = update.llm {
        snapshot.llm = Some(value);
    }
    if let Some(value) = update.solace {
        snapshot.solace = Some(value);
    }
    if let Some(value) = update.skills {
        snapshot.skills = Some(value);
    }
    if let Some(value) = update.swarms {
        snapshot.swarms = Some(value);
    }
    if let Some(value) = update.personas {
        snapshot.personas = Some(value);
    }
    if update.clear_graph_cache {
        snapshot.graph_cache.clear();
    }
    if let Some((diagram, source)) = update.graph {
        snapshot.graph_cache.insert(diagram, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_merges_cumulatively() {
        let store = StateStore::new();

        store.set(StateUpdate {
            server_online: Some(true),
            ..Default::default()
        });
        store.set(StateUpdate {
            llm: Some(json!({"online": true})),
            ..Default::default()
        });
        store.set(StateUpdate {
            health_failure_count: Some(2),
            ..Default::default()
        });

        let snapshot = store.get();
        assert!(snapshot.server_online);
        assert_eq!(snapshot.llm, Some(json!({"online": true})));
        assert_eq!(snapshot.health_failure_count, 2);
        // Untouched fields keep their defaults.
        assert_eq!(snapshot.active_tab, Tab::Dashboard);
        assert!(snapshot.solace.is_none());
    }

    #[test]
    fn test_get_is_referentially_stable_between_sets() {
        let store = StateStore::new();
        let first = store.get();
        let second = store.get();
        assert!(Rc::ptr_eq(&first, &second));

        store.set(StateUpdate::default());
        let third = store.get();
        assert!(!Rc::ptr_eq(&first, &third));
        assert!(Rc::ptr_eq(&third, &store.get()));
    }

    #[test]
    fn test_subscribers_notified_in_registration_order() {
        let store = StateStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for label in ["a", "b", "c"] {
            let order = order.clone();
            store.subscribe(move |_| order.borrow_mut().push(label));
        }
        store.set(StateUpdate::default());

        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unsubscribe_before_set_never_invokes() {
        let store = StateStore::new();
        let called = Rc::new(Cell::new(false));

        let flag = called.clone();
        let id = store.subscribe(move |_| flag.set(true));
        store.unsubscribe(id);
        store.set(StateUpdate::default());

        assert!(!called.get());
    }

    #[test]
    fn test_unsubscribe_during_notification_does_not_panic() {
        let store = Rc::new(StateStore::new());
        let calls = Rc::new(RefCell::new(Vec::new()));

        // First subscriber unsubscribes the second mid-pass; the second
        // still runs because it was already scheduled.
        let second_id = Rc::new(Cell::new(None));

        let store_handle = store.clone();
        let id_handle = second_id.clone();
        let calls_first = calls.clone();
        store.subscribe(move |_| {
            calls_first.borrow_mut().push("first");
            if let Some(id) = id_handle.get() {
                store_handle.unsubscribe(id);
            }
        });

        let calls_second = calls.clone();
        let id = store.subscribe(move |_| calls_second.borrow_mut().push("second"));
        second_id.set(Some(id));

        store.set(StateUpdate::default());
        assert_eq!(*calls.borrow(), vec!["first", "second"]);

        // The unsubscribe took effect for the next pass.
        store.set(StateUpdate::default());
        assert_eq!(*calls.borrow(), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_graph_cache_insert_and_clear() {
        let store = StateStore::new();
        store.set(StateUpdate {
            graph: Some((Diagram::Skills, "graph TD".to_string())),
            ..Default::default()
        });
        store.set(StateUpdate {
            graph: Some((Diagram::Swarms, "graph LR".to_string())),
            ..Default::default()
        });
        assert_eq!(store.get().graph_cache.len(), 2);

        store.set(StateUpdate {
            clear_graph_cache: true,
            ..Default::default()
        });
        assert!(store.get().graph_cache.is_empty());
    }
}
