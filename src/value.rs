//! Value envelope stored against every cache key.
//!
//! Each entry carries two optional payloads: an opaque shared handle
//! (`Arc<V>`) and a byte buffer (`Arc<[u8]>`). Either, both, or neither may
//! be set; the cache never interprets them except for the int64 helper path,
//! which reads and writes 8 little-endian bytes.
//!
//! Both payloads are reference-counted, so cloning an envelope is two
//! pointer bumps and callers may keep a payload alive after the entry is
//! evicted.

use std::fmt;
use std::sync::Arc;

/// Optional opaque-handle + optional byte-buffer payload pair.
pub struct ValueEnvelope<V> {
    handle: Option<Arc<V>>,
    bytes: Option<Arc<[u8]>>,
}

impl<V> ValueEnvelope<V> {
    /// Creates an envelope with no payloads.
    pub fn empty() -> Self {
        Self {
            handle: None,
            bytes: None,
        }
    }

    /// Wraps an owned value as the opaque handle payload.
    pub fn from_value(value: V) -> Self {
        Self::from_handle(Arc::new(value))
    }

    /// Stores a pre-wrapped shared handle.
    pub fn from_handle(handle: Arc<V>) -> Self {
        Self {
            handle: Some(handle),
            bytes: None,
        }
    }

    /// Stores a byte buffer.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            handle: None,
            bytes: Some(bytes.into()),
        }
    }

    /// Stores an `i64` as its 8-byte little-endian encoding.
    pub fn from_i64(n: i64) -> Self {
        Self::from_bytes(n.to_le_bytes().to_vec())
    }

    /// Returns the opaque handle payload, if set.
    pub fn handle(&self) -> Option<&Arc<V>> {
        self.handle.as_ref()
    }

    /// Returns the byte payload, if set.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    /// Returns the byte payload as a shared buffer, if set.
    pub fn bytes_handle(&self) -> Option<&Arc<[u8]>> {
        self.bytes.as_ref()
    }

    /// Decodes the byte payload as a little-endian `i64`.
    ///
    /// Requires at least 8 stored bytes; shorter (or absent) buffers decode
    /// to `None`.
    pub fn as_i64(&self) -> Option<i64> {
        decode_i64(self.bytes()?)
    }

    /// Returns `true` if neither payload is set.
    pub fn is_empty(&self) -> bool {
        self.handle.is_none() && self.bytes.is_none()
    }
}

impl<V> Default for ValueEnvelope<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> Clone for ValueEnvelope<V> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

impl<V> fmt::Debug for ValueEnvelope<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueEnvelope")
            .field("has_handle", &self.handle.is_some())
            .field("byte_len", &self.bytes.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// Decodes a little-endian `i64` from the first 8 bytes of `b`.
pub fn decode_i64(b: &[u8]) -> Option<i64> {
    let raw: [u8; 8] = b.get(..8)?.try_into().ok()?;
    Some(i64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i64_round_trip() {
        for n in [0i64, 1, -1, 42, i64::MIN, i64::MAX] {
            let env: ValueEnvelope<()> = ValueEnvelope::from_i64(n);
            assert_eq!(env.as_i64(), Some(n));
            assert_eq!(env.bytes().map(<[u8]>::len), Some(8));
        }
    }

    #[test]
    fn short_buffer_does_not_decode() {
        let env: ValueEnvelope<()> = ValueEnvelope::from_bytes(vec![1u8, 2, 3]);
        assert_eq!(env.as_i64(), None);
        assert_eq!(decode_i64(&[0u8; 7]), None);
    }

    #[test]
    fn long_buffer_decodes_prefix() {
        let mut buf = 7i64.to_le_bytes().to_vec();
        buf.extend_from_slice(b"trailing");
        assert_eq!(decode_i64(&buf), Some(7));
    }

    #[test]
    fn empty_envelope_has_no_payloads() {
        let env: ValueEnvelope<String> = ValueEnvelope::empty();
        assert!(env.is_empty());
        assert!(env.handle().is_none());
        assert!(env.bytes().is_none());
        assert_eq!(env.as_i64(), None);
    }

    #[test]
    fn handle_envelope_keeps_value() {
        let env = ValueEnvelope::from_value("payload".to_string());
        assert!(!env.is_empty());
        assert_eq!(env.handle().map(|h| h.as_str()), Some("payload"));
        assert!(env.bytes().is_none());
    }

    #[test]
    fn clone_shares_payloads() {
        let env = ValueEnvelope::from_value(9u64);
        let copy = env.clone();
        let (a, b) = (env.handle().unwrap(), copy.handle().unwrap());
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn take_via_default_leaves_empty() {
        let mut env = ValueEnvelope::from_value(1u8);
        let taken = std::mem::take(&mut env);
        assert!(!taken.is_empty());
        assert!(env.is_empty());
    }
}
