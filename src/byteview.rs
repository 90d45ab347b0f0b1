//! Immutable byte view
//!
//! The cache value type. A read-only, reference-counted handle to a byte
//! sequence. Cheap to clone (an `Arc` bump), but any API that would hand a
//! caller the interior bytes by reference must instead copy them out — see
//! [`ByteView::to_vec`].
//!
//! # Design Decisions
//!
//! - No `Eq`/`Hash`: a cached value is never compared, only accounted for
//!   by length.
//! - `Arc<[u8]>` rather than `Vec<u8>` so that a [`ByteView`] returned from a
//!   cache hit can be handed to every coalesced caller (see
//!   [`crate::singleflight`]) without a copy per caller; the one copy that
//!   does happen is on construction, from the loader's or peer's raw bytes.

use std::fmt;
use std::sync::Arc;

/// A read-only handle to an immutable byte sequence.
///
/// Equality and hashing are intentionally not implemented; [`ByteView`] is a
/// cache *value*, not a cache *key*. The only operations the cache's
/// bookkeeping needs are [`len`](ByteView::len) (for byte accounting) and a
/// defensive copy accessor.
#[derive(Clone)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    /// Builds a view by copying `bytes` into a freshly owned allocation.
    ///
    /// This is the only constructor that copies on the cache-population hot
    /// path: the loader's or peer's returned bytes are copied exactly once,
    /// here, and the resulting view is then shared by reference among every
    /// cache hit and every single-flight waiter.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Self {
        Self {
            bytes: Arc::from(bytes.as_ref()),
        }
    }

    /// Wraps an already-owned, already-unique buffer without an extra copy.
    ///
    /// Used by the peer-fetch path, where the response buffer is already
    /// exclusively owned by the caller chain and no defensive copy is
    /// required.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }

    /// Number of bytes this view holds. Never copies.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if this view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a fresh, caller-owned copy of the interior bytes.
    ///
    /// Required whenever the caller might mutate the returned buffer: the
    /// interior bytes of a [`ByteView`] are never mutated after construction,
    /// and every other accessor on this type preserves that invariant by
    /// construction (borrow, never move or expose `Arc` internals).
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Borrows the interior bytes without copying.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Interprets the view as UTF-8, copying into an owned `String`.
    ///
    /// Non-UTF-8 bytes are replaced per [`String::from_utf8_lossy`]; a
    /// convenience accessor for logging/debugging, never used on a
    /// correctness path.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.len()).finish()
    }
}
