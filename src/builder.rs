//! Validated cache construction.
//!
//! The builder fixes every policy decision up front: shard count (rounded
//! up to a power of two), per-shard capacity, optional expiration, and the
//! optional LRU-2 hot level. None of these can change after `build`, which
//! keeps the stored deadlines and the level layout internally consistent
//! for the cache's whole lifetime.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use shardlru::builder::CacheBuilder;
//!
//! let cache = CacheBuilder::new(16, 256)
//!     .expiration(Duration::from_secs(60))
//!     .lru2(128)
//!     .build::<u64, String>()
//!     .unwrap();
//!
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("hello"));
//! ```

use std::time::Duration;

use crate::cache::Cache;
use crate::ds::{next_pow2_mask, CacheKey};
use crate::error::ConfigError;

/// Builder for [`Cache`] instances.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    buckets: u16,
    cap_per_bucket: u16,
    hot_cap_per_bucket: Option<u16>,
    expiration: Option<Duration>,
}

impl CacheBuilder {
    /// Starts a builder for a cache with `buckets` shards of
    /// `cap_per_bucket` entries each.
    ///
    /// The shard count is rounded up to the next power of two; zero is
    /// treated as one. Total capacity is `shards * cap_per_bucket` (plus
    /// the hot level when LRU-2 is enabled), though the share each shard
    /// holds depends on how keys hash.
    pub fn new(buckets: u16, cap_per_bucket: u16) -> Self {
        Self {
            buckets,
            cap_per_bucket,
            hot_cap_per_bucket: None,
            expiration: None,
        }
    }

    /// Sets the entry time-to-live.
    ///
    /// Entries expire lazily: they are reported as misses after the
    /// deadline but stay in their slot until reused. A zero duration means
    /// entries never expire (the default).
    pub fn expiration(mut self, ttl: Duration) -> Self {
        self.expiration = (!ttl.is_zero()).then_some(ttl);
        self
    }

    /// Enables the LRU-2 hot level with `cap_per_bucket` entries per shard.
    ///
    /// With the hot level enabled, an entry is promoted out of the
    /// newcomer level on its first successful `get` and then survives
    /// until evicted from the hot level.
    pub fn lru2(mut self, cap_per_bucket: u16) -> Self {
        self.hot_cap_per_bucket = Some(cap_per_bucket);
        self
    }

    /// Builds the cache.
    ///
    /// Fails with [`ConfigError`] when any per-bucket capacity is zero.
    pub fn build<K, V>(self) -> Result<Cache<K, V>, ConfigError>
    where
        K: CacheKey,
    {
        if self.cap_per_bucket == 0 {
            return Err(ConfigError::new("per-bucket capacity must be at least 1"));
        }
        if self.hot_cap_per_bucket == Some(0) {
            return Err(ConfigError::new(
                "per-bucket hot-level capacity must be at least 1",
            ));
        }
        let mask = next_pow2_mask(self.buckets.max(1));
        let shard_count = mask as usize + 1;
        Ok(Cache::from_parts(
            shard_count,
            mask,
            self.cap_per_bucket,
            self.hot_cap_per_bucket,
            self.expiration,
        ))
    }
}
