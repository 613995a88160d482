//! Observer hook for cache operations.
//!
//! Every public cache operation reports its outcome to a chain of observers
//! after the shard lock has been released. Observers see the action, the
//! key, the payload envelope involved, and a status:
//!
//! | Action | Status     | Meaning                                        |
//! |--------|------------|------------------------------------------------|
//! | `Put`  | `Added`    | new key inserted                               |
//! | `Put`  | `Updated`  | existing key overwritten                       |
//! | `Put`  | `Evicted`  | this event reports the displaced LRU victim    |
//! | `Get`  | `Hit`      | live entry found                               |
//! | `Get`  | `Miss`     | absent, tombstoned, or expired                 |
//! | `Del`  | `Hit`      | live entry tombstoned                          |
//! | `Del`  | `Miss`     | nothing to delete                              |
//!
//! Eviction events also cover hot-level displacement during LRU-2
//! promotion, and always precede the event of the operation that caused
//! them. Tombstoned victims are reclaimed silently; their deletion was
//! already reported.
//!
//! Observers run in registration order. Because dispatch happens outside
//! the shard locks, an observer may call back into the cache; registering
//! another observer from inside an observer is not supported.

use parking_lot::RwLock;

use crate::value::ValueEnvelope;

/// The public operation an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Put,
    Get,
    Del,
}

/// Outcome delivered with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// A `Put` inserted a new key.
    Added,
    /// A `Put` overwrote an existing key.
    Updated,
    /// A live LRU victim was displaced; the event carries the victim.
    Evicted,
    /// A `Get` or `Del` found a live entry.
    Hit,
    /// A `Get` or `Del` found nothing usable.
    Miss,
}

/// Observer callback signature.
pub type InspectFn<K, V> = dyn Fn(Action, &K, &ValueEnvelope<V>, Status) + Send + Sync;

/// One buffered observation, flushed after the shard lock is dropped.
pub(crate) struct Event<K, V> {
    pub action: Action,
    pub key: K,
    pub value: ValueEnvelope<V>,
    pub status: Status,
}

/// Registration-ordered observer chain.
pub(crate) struct InspectorChain<K, V> {
    observers: RwLock<Vec<Box<InspectFn<K, V>>>>,
}

impl<K, V> InspectorChain<K, V> {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Appends an observer; it runs after all previously registered ones.
    pub fn register(&self, observer: Box<InspectFn<K, V>>) {
        self.observers.write().push(observer);
    }

    /// Returns `true` if any observer is registered.
    ///
    /// Callers skip event construction entirely when this is `false`, so an
    /// unobserved cache clones no keys or envelopes.
    pub fn has_observers(&self) -> bool {
        !self.observers.read_recursive().is_empty()
    }

    /// Delivers one event to every observer in registration order.
    ///
    /// Uses a recursive read lock so observers that reenter the cache (and
    /// thereby emit nested events) do not deadlock against a queued writer.
    pub fn emit(&self, event: &Event<K, V>) {
        for observer in self.observers.read_recursive().iter() {
            observer(event.action, &event.key, &event.value, event.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn event(status: Status) -> Event<u64, u64> {
        Event {
            action: Action::Put,
            key: 1,
            value: ValueEnvelope::empty(),
            status,
        }
    }

    #[test]
    fn empty_chain_reports_unobserved() {
        let chain: InspectorChain<u64, u64> = InspectorChain::new();
        assert!(!chain.has_observers());
        chain.emit(&event(Status::Added)); // no observers: nothing to do
    }

    #[test]
    fn observers_run_in_registration_order() {
        let chain: InspectorChain<u64, u64> = InspectorChain::new();
        let log = Arc::new(parking_lot::Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            chain.register(Box::new(move |_, _, _, _| log.lock().push(name)));
        }
        assert!(chain.has_observers());

        chain.emit(&event(Status::Added));
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn every_observer_sees_every_event() {
        let chain: InspectorChain<u64, u64> = InspectorChain::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = Arc::clone(&count);
            chain.register(Box::new(move |_, _, _, _| {
                count.fetch_add(1, Ordering::Relaxed);
            }));
        }

        chain.emit(&event(Status::Hit));
        chain.emit(&event(Status::Miss));
        assert_eq!(count.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn observer_receives_event_fields() {
        let chain: InspectorChain<&'static str, i64> = InspectorChain::new();
        let seen = Arc::new(parking_lot::Mutex::new(None));
        {
            let seen = Arc::clone(&seen);
            chain.register(Box::new(move |action, key, value, status| {
                *seen.lock() = Some((action, *key, value.handle().map(|h| **h), status));
            }));
        }

        chain.emit(&Event {
            action: Action::Del,
            key: "k",
            value: ValueEnvelope::from_value(5),
            status: Status::Hit,
        });
        assert_eq!(*seen.lock(), Some((Action::Del, "k", Some(5), Status::Hit)));
    }
}
