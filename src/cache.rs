//! Sharded cache facade and two-level (LRU-2) coordinator.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                           Cache<K, V>                             │
//!   │                                                                   │
//!   │   key ──► shard_hash(key) & mask ──► shard index                  │
//!   │                                                                   │
//!   │   shards: Box<[Mutex<ShardState>]>                                │
//!   │   ┌───────────────┬───────────────┬───────────────┬───────────┐   │
//!   │   │  Mutex        │  Mutex        │  Mutex        │   ...     │   │
//!   │   │  l0: bucket   │  l0: bucket   │  l0: bucket   │           │   │
//!   │   │  l1: bucket?  │  l1: bucket?  │  l1: bucket?  │           │   │
//!   │   └───────────────┴───────────────┴───────────────┴───────────┘   │
//!   │                                                                   │
//!   │   observers (fired AFTER the shard lock is released)              │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## LRU-2 promotion
//!
//! ```text
//!   put(k) ───────────────► L0 (newcomers)
//!
//!   get(k):  L0.del(k) hit and fresh ──► re-insert into L1 (hot set)
//!            otherwise ───────────────► look up in L1, refresh deadline
//! ```
//!
//! A key that is written once and never read again ages out of L0 without
//! touching the hot set; only a second access earns L1 residency. Without
//! the hot level the coordinator degenerates to plain LRU on L0.
//!
//! ## Concurrency model
//!
//! One `parking_lot::Mutex` per shard guards that shard's buckets; no
//! global lock exists and no shard ever takes another shard's lock.
//! Operations on one shard linearize in lock-acquisition order; operations
//! on different shards are unordered. All critical sections are O(1)
//! except [`Cache::walk`], which locks one shard at a time.
//!
//! Observer callbacks never run under a shard lock: events produced inside
//! the critical section (evictions, promotions) are carried out of it and
//! delivered afterwards, eviction events first.
//!
//! ## Expiration
//!
//! Deadlines are nanosecond timestamps from [`clock::coarse_now`]. Expired
//! entries are never swept; they are treated as misses on access and sit in
//! place until LRU pressure reuses their slot. Hits refresh the deadline.
//!
//! ## Example Usage
//!
//! ```
//! use std::time::Duration;
//! use shardlru::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(4, 64)
//!     .expiration(Duration::from_secs(30))
//!     .lru2(64)
//!     .build::<String, &'static str>()
//!     .unwrap();
//!
//! cache.put("session:1".to_string(), "alice");
//! assert_eq!(cache.get(&"session:1".to_string()).as_deref(), Some(&"alice"));
//!
//! cache.del(&"session:1".to_string());
//! assert!(cache.get(&"session:1".to_string()).is_none());
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::bucket::{LruBucket, PutOutcome};
use crate::clock;
use crate::ds::CacheKey;
use crate::inspector::{Action, Event, InspectorChain, Status};
use crate::value::ValueEnvelope;

struct ShardState<K, V> {
    l0: LruBucket<K, V>,
    l1: Option<LruBucket<K, V>>,
}

/// Concurrent sharded LRU / LRU-2 cache.
///
/// Construct instances through [`CacheBuilder`](crate::builder::CacheBuilder).
pub struct Cache<K, V> {
    shards: Box<[Mutex<ShardState<K, V>>]>,
    mask: u32,
    cap_per_shard: u16,
    hot_cap_per_shard: Option<u16>,
    expiration: Option<Duration>,
    inspectors: InspectorChain<K, V>,
}

impl<K, V> Cache<K, V>
where
    K: CacheKey,
{
    pub(crate) fn from_parts(
        shard_count: usize,
        mask: u32,
        cap_per_shard: u16,
        hot_cap_per_shard: Option<u16>,
        expiration: Option<Duration>,
    ) -> Self {
        let shards: Vec<Mutex<ShardState<K, V>>> = (0..shard_count)
            .map(|_| {
                Mutex::new(ShardState {
                    l0: LruBucket::new(cap_per_shard),
                    l1: hot_cap_per_shard.map(LruBucket::new),
                })
            })
            .collect();
        Self {
            shards: shards.into_boxed_slice(),
            mask,
            cap_per_shard,
            hot_cap_per_shard,
            expiration,
            inspectors: InspectorChain::new(),
        }
    }

    /// Returns the number of shards (always a power of two).
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the newcomer-level capacity of each shard.
    pub fn capacity_per_shard(&self) -> u16 {
        self.cap_per_shard
    }

    /// Returns the hot-level capacity of each shard, if LRU-2 is enabled.
    pub fn hot_capacity_per_shard(&self) -> Option<u16> {
        self.hot_cap_per_shard
    }

    /// Returns the configured time-to-live, if any.
    pub fn expiration(&self) -> Option<Duration> {
        self.expiration
    }

    #[inline]
    fn shard_index(&self, key: &K) -> usize {
        (key.shard_hash() & self.mask) as usize
    }

    /// Deadline for an entry written now. Without expiration the deadline
    /// is `i64::MAX`, so the freshness test needs no separate mode flag.
    fn deadline(&self) -> i64 {
        match self.expiration {
            Some(ttl) => {
                let ttl = i64::try_from(ttl.as_nanos()).unwrap_or(i64::MAX);
                clock::coarse_now().saturating_add(ttl)
            }
            None => i64::MAX,
        }
    }

    #[inline]
    fn is_fresh(expire_at: i64) -> bool {
        expire_at > 0 && clock::coarse_now() < expire_at
    }

    /// Stores a value as the opaque handle payload.
    pub fn put(&self, key: K, value: V) {
        self.put_envelope(key, ValueEnvelope::from_value(value));
    }

    /// Stores a pre-wrapped shared handle.
    pub fn put_handle(&self, key: K, handle: Arc<V>) {
        self.put_envelope(key, ValueEnvelope::from_handle(handle));
    }

    /// Stores a byte buffer payload.
    pub fn put_bytes(&self, key: K, bytes: impl Into<Arc<[u8]>>) {
        self.put_envelope(key, ValueEnvelope::from_bytes(bytes));
    }

    /// Stores an `i64` as 8 little-endian bytes.
    pub fn put_i64(&self, key: K, n: i64) {
        self.put_envelope(key, ValueEnvelope::from_i64(n));
    }

    fn put_envelope(&self, key: K, value: ValueEnvelope<V>) {
        let idx = self.shard_index(&key);
        let deadline = self.deadline();
        let watching = self.inspectors.has_observers();
        let echo = if watching {
            Some((key.clone(), value.clone()))
        } else {
            None
        };

        let outcome = {
            let mut shard = self.shards[idx].lock();
            shard.l0.put(key, value, deadline)
        };

        let Some((key, value)) = echo else { return };
        let status = match outcome {
            PutOutcome::AddedEvicting {
                key: victim,
                value: victim_value,
            } => {
                self.inspectors.emit(&Event {
                    action: Action::Put,
                    key: victim,
                    value: victim_value,
                    status: Status::Evicted,
                });
                Status::Added
            }
            PutOutcome::Added => Status::Added,
            PutOutcome::Updated => Status::Updated,
        };
        self.inspectors.emit(&Event {
            action: Action::Put,
            key,
            value,
            status,
        });
    }

    /// Looks up the opaque handle payload for `key`.
    ///
    /// Reports a hit to observers whenever a live, unexpired entry exists,
    /// even if that entry carries no handle payload.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.get_envelope(key).and_then(|e| e.handle().cloned())
    }

    /// Looks up the byte payload for `key`.
    pub fn get_bytes(&self, key: &K) -> Option<Arc<[u8]>> {
        self.get_envelope(key)
            .and_then(|e| e.bytes_handle().cloned())
    }

    /// Looks up `key` and decodes its byte payload as a little-endian
    /// `i64`; entries with fewer than 8 stored bytes read as misses.
    pub fn get_i64(&self, key: &K) -> Option<i64> {
        self.get_envelope(key).and_then(|e| e.as_i64())
    }

    fn get_envelope(&self, key: &K) -> Option<ValueEnvelope<V>> {
        let idx = self.shard_index(key);
        let watching = self.inspectors.has_observers();
        let mut displaced: Option<(K, ValueEnvelope<V>)> = None;

        let found = {
            let mut guard = self.shards[idx].lock();
            let state = &mut *guard;
            match state.l1.as_mut() {
                // LRU-2: a fresh newcomer hit moves the entry to the hot
                // level, keeping its deadline. A stale newcomer stays
                // tombstoned at L0's tail and the lookup falls through.
                Some(l1) => match state.l0.del(key) {
                    Some((value, expire_at)) if Self::is_fresh(expire_at) => {
                        if let PutOutcome::AddedEvicting { key: vk, value: vv } =
                            l1.put(key.clone(), value.clone(), expire_at)
                        {
                            displaced = Some((vk, vv));
                        }
                        Some(value)
                    }
                    _ => self.lookup_level(l1, key),
                },
                None => self.lookup_level(&mut state.l0, key),
            }
        };

        if watching {
            if let Some((victim, victim_value)) = displaced {
                self.inspectors.emit(&Event {
                    action: Action::Put,
                    key: victim,
                    value: victim_value,
                    status: Status::Evicted,
                });
            }
            let (value, status) = match &found {
                Some(v) => (v.clone(), Status::Hit),
                None => (ValueEnvelope::empty(), Status::Miss),
            };
            self.inspectors.emit(&Event {
                action: Action::Get,
                key: key.clone(),
                value,
                status,
            });
        }
        found
    }

    /// Single-level lookup: fresh hits refresh MRU position and deadline.
    fn lookup_level(&self, level: &mut LruBucket<K, V>, key: &K) -> Option<ValueEnvelope<V>> {
        let deadline = self.deadline();
        let entry = level.get(key)?;
        if Self::is_fresh(entry.expire_at()) {
            entry.set_expire_at(deadline);
            Some(entry.value().clone())
        } else {
            None
        }
    }

    /// Deletes `key` from both levels.
    ///
    /// When both levels held the key, the observer event reports the copy
    /// with the later deadline (the most recently touched one).
    pub fn del(&self, key: &K) {
        let idx = self.shard_index(key);
        let watching = self.inspectors.has_observers();

        let hit = {
            let mut guard = self.shards[idx].lock();
            let state = &mut *guard;
            let mut hit = state.l0.del(key);
            if let Some(l1) = state.l1.as_mut() {
                if let Some((value, expire_at)) = l1.del(key) {
                    let newer = match &hit {
                        Some((_, l0_expire)) => *l0_expire < expire_at,
                        None => true,
                    };
                    if newer {
                        hit = Some((value, expire_at));
                    }
                }
            }
            hit
        };

        if !watching {
            return;
        }
        let (value, status) = match hit {
            Some((value, _)) => (value, Status::Hit),
            None => (ValueEnvelope::empty(), Status::Miss),
        };
        self.inspectors.emit(&Event {
            action: Action::Del,
            key: key.clone(),
            value,
            status,
        });
    }

    /// Visits every live entry, shard by shard, MRU to LRU within each
    /// level (newcomer level first, then the hot level).
    ///
    /// Holds one shard lock at a time; the visitor runs under that lock and
    /// must not reenter the cache. Returning `false` ends traversal of the
    /// current level; traversal then proceeds with the next level or shard.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &ValueEnvelope<V>, i64) -> bool,
    {
        for shard in self.shards.iter() {
            let guard = shard.lock();
            guard.l0.walk(&mut visit);
            if let Some(l1) = guard.l1.as_ref() {
                l1.walk(&mut visit);
            }
        }
    }

    /// Registers an observer; it runs after all previously registered ones.
    ///
    /// Observers are invoked after the shard lock is released, so they may
    /// call back into the cache.
    pub fn inspect<F>(&self, observer: F)
    where
        F: Fn(Action, &K, &ValueEnvelope<V>, Status) + Send + Sync + 'static,
    {
        self.inspectors.register(Box::new(observer));
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        for shard in self.shards.iter() {
            let guard = shard.lock();
            guard.l0.debug_validate_invariants();
            if let Some(l1) = guard.l1.as_ref() {
                l1.debug_validate_invariants();
            }
        }
    }
}
