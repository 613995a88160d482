//! Fixed-capacity single-shard LRU bucket.
//!
//! Every shard of the cache is built from one or two of these buckets. A
//! bucket owns three parallel structures sized once at construction:
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                         LruBucket<K, V>                         │
//!   │                                                                 │
//!   │   map: FxHashMap<K, u16>          1-based slot indices          │
//!   │   ┌─────────┬──────┐                                            │
//!   │   │  "a"    │  1   │──────────┐                                 │
//!   │   │  "b"    │  2   │────┐     │                                 │
//!   │   └─────────┴──────┘    │     │                                 │
//!   │                         ▼     ▼                                 │
//!   │   nodes: Vec<Entry>   [ 1 ] [ 2 ] [ 3 ] ...   (reserved once,   │
//!   │                        key    key              pushed only on   │
//!   │                        value  value            the append path) │
//!   │                        expire expire                            │
//!   │                                                                 │
//!   │   links: SentinelList                                           │
//!   │   head ──► [2] ◄──► [1] ◄── tail      (MRU ─────► LRU)          │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Slot lifecycle
//!
//! Slots are handed out in append order while `last < capacity`; once the
//! bucket is full, a `put` of a new key reuses the tail slot in place: the
//! victim's key is unmapped, the slot's fields are overwritten, and the slot
//! moves to the head. Nothing is ever freed, so no allocation happens on the
//! full-bucket hot path.
//!
//! Deletion only tombstones: `expire_at` is zeroed, the payloads are taken
//! out, and the slot sinks to the tail where it becomes the next reuse
//! victim. The key stays mapped until the slot is overwritten, which makes
//! repeated deletes cheap misses.
//!
//! ## Operations
//!
//! | Operation | Time | Notes                                          |
//! |-----------|------|------------------------------------------------|
//! | `put`     | O(1) | update in place / append / reuse tail slot     |
//! | `get`     | O(1) | moves live entries to the MRU head             |
//! | `del`     | O(1) | tombstone + sink to tail, captures deadline    |
//! | `walk`    | O(n) | head to tail, skips tombstones                 |
//!
//! The bucket knows nothing about expiration policy: `expire_at` is an
//! opaque deadline except for the value 0, which marks a tombstone. The
//! shard coordinator decides freshness.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::SentinelList;
use crate::value::ValueEnvelope;

/// A stored entry: key, payload envelope, and nanosecond deadline.
///
/// `expire_at == 0` marks the entry as deleted (tombstoned).
#[derive(Debug)]
pub struct Entry<K, V> {
    key: K,
    value: ValueEnvelope<V>,
    expire_at: i64,
}

impl<K, V> Entry<K, V> {
    /// Returns the entry's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the entry's payload envelope.
    pub fn value(&self) -> &ValueEnvelope<V> {
        &self.value
    }

    /// Returns the entry's deadline (0 for tombstones).
    pub fn expire_at(&self) -> i64 {
        self.expire_at
    }

    /// Replaces the entry's deadline.
    pub fn set_expire_at(&mut self, expire_at: i64) {
        self.expire_at = expire_at;
    }
}

/// Result of [`LruBucket::put`].
#[derive(Debug)]
pub enum PutOutcome<K, V> {
    /// A new key was inserted (appended or reusing a tombstoned slot).
    Added,
    /// An existing key's entry was overwritten in place.
    Updated,
    /// A new key was inserted by evicting the live LRU entry, carried here
    /// so the caller can report it after releasing its lock.
    AddedEvicting {
        key: K,
        value: ValueEnvelope<V>,
    },
}

/// Fixed-capacity LRU map over a pre-allocated slot arena.
#[derive(Debug)]
pub struct LruBucket<K, V> {
    links: SentinelList,
    nodes: Vec<Entry<K, V>>,
    map: FxHashMap<K, u16>,
    cap: u16,
    last: u16,
}

impl<K, V> LruBucket<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a bucket holding at most `capacity` entries.
    ///
    /// `capacity` must be at least 1.
    pub fn new(capacity: u16) -> Self {
        debug_assert!(capacity > 0, "bucket capacity must be at least 1");
        Self {
            links: SentinelList::new(capacity),
            nodes: Vec::with_capacity(capacity as usize),
            map: FxHashMap::with_capacity_and_hasher(capacity as usize, Default::default()),
            cap: capacity,
            last: 0,
        }
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> u16 {
        self.cap
    }

    /// Returns the number of occupied slots, tombstones included.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no slot has ever been occupied.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Inserts or updates `key`, moving its slot to the MRU head.
    ///
    /// When the bucket is full and `key` is new, the tail slot is reused in
    /// place; a live victim is returned via [`PutOutcome::AddedEvicting`],
    /// while a tombstoned victim is reclaimed silently.
    pub fn put(&mut self, key: K, value: ValueEnvelope<V>, expire_at: i64) -> PutOutcome<K, V> {
        if let Some(&slot) = self.map.get(&key) {
            let entry = &mut self.nodes[slot as usize - 1];
            entry.value = value;
            entry.expire_at = expire_at;
            self.links.move_to_head(slot);
            return PutOutcome::Updated;
        }

        if self.last < self.cap {
            self.last += 1;
            let slot = self.last;
            self.nodes.push(Entry {
                key: key.clone(),
                value,
                expire_at,
            });
            self.map.insert(key, slot);
            self.links.attach_head(slot);
            return PutOutcome::Added;
        }

        // Full: reuse the LRU tail slot in place.
        let slot = self.links.tail();
        let entry = &mut self.nodes[slot as usize - 1];
        let was_live = entry.expire_at != 0;
        let old_key = std::mem::replace(&mut entry.key, key.clone());
        let old_value = std::mem::take(&mut entry.value);
        entry.value = value;
        entry.expire_at = expire_at;
        self.map.remove(&old_key);
        self.map.insert(key, slot);
        self.links.move_to_head(slot);

        if was_live {
            PutOutcome::AddedEvicting {
                key: old_key,
                value: old_value,
            }
        } else {
            PutOutcome::Added
        }
    }

    /// Looks up `key`, moving live entries to the MRU head.
    ///
    /// Tombstoned entries are returned without reordering so they stay at
    /// the tail as the next reuse victims; callers treat them as misses.
    pub fn get(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let slot = *self.map.get(key)?;
        if self.nodes[slot as usize - 1].expire_at != 0 {
            self.links.move_to_head(slot);
        }
        Some(&mut self.nodes[slot as usize - 1])
    }

    /// Tombstones `key` and sinks its slot to the tail.
    ///
    /// Returns the taken payload envelope and the deadline the entry had
    /// before deletion. The deadline is captured before the tombstone is
    /// written. Missing or already-tombstoned keys return `None`.
    pub fn del(&mut self, key: &K) -> Option<(ValueEnvelope<V>, i64)> {
        let slot = *self.map.get(key)?;
        let entry = &mut self.nodes[slot as usize - 1];
        if entry.expire_at == 0 {
            return None;
        }
        let expired_at = entry.expire_at;
        entry.expire_at = 0;
        let value = std::mem::take(&mut entry.value);
        self.links.move_to_tail(slot);
        Some((value, expired_at))
    }

    /// Visits entries from MRU to LRU, skipping tombstones.
    ///
    /// Stops when `visit` returns `false`.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&K, &ValueEnvelope<V>, i64) -> bool,
    {
        let mut slot = self.links.head();
        while slot != 0 {
            let entry = &self.nodes[slot as usize - 1];
            if entry.expire_at > 0 && !visit(&entry.key, &entry.value, entry.expire_at) {
                return;
            }
            slot = self.links.next(slot);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.last <= self.cap);
        assert_eq!(self.nodes.len(), self.last as usize);
        // Every occupied slot stays mapped, tombstones included.
        assert_eq!(self.map.len(), self.last as usize);
        for (key, &slot) in &self.map {
            assert!(slot >= 1 && slot <= self.last);
            assert!(self.nodes[slot as usize - 1].key == *key);
        }
        self.links.debug_validate_invariants(self.last as usize);

        // Tombstones cluster at the tail end of the list.
        let mut seen_live = false;
        let mut slot = self.links.tail();
        while slot != 0 {
            let entry = &self.nodes[slot as usize - 1];
            if entry.expire_at != 0 {
                seen_live = true;
            } else {
                assert!(!seen_live, "tombstone found ahead of a live entry");
            }
            slot = self.links.prev(slot);
        }
    }
}
