pub use crate::bucket::{Entry, LruBucket, PutOutcome};
pub use crate::builder::CacheBuilder;
pub use crate::cache::Cache;
pub use crate::ds::{CacheKey, SentinelList};
pub use crate::error::ConfigError;
pub use crate::inspector::{Action, Status};
pub use crate::value::ValueEnvelope;
