//! Error types for the shardlru library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero per-bucket capacity).
//!
//! ## Example Usage
//!
//! ```
//! use shardlru::builder::CacheBuilder;
//! use shardlru::error::ConfigError;
//!
//! // Fallible construction for user-configurable parameters
//! let cache = CacheBuilder::new(4, 128).build::<u64, String>();
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad: Result<_, ConfigError> = CacheBuilder::new(4, 0).build::<u64, String>();
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::build`](crate::builder::CacheBuilder::build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use shardlru::builder::CacheBuilder;
///
/// let err = match CacheBuilder::new(1, 0).build::<u64, u64>() {
///     Err(e) => e,
///     Ok(_) => panic!("expected error"),
/// };
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
