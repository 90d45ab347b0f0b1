#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Crate Layout
//!
//! Four components, leaves first, matching the dependency order they're
//! composed in by [`group::Group`]:
//!
//! 1. [`lru`] — bounded, byte-accounted LRU store (single-threaded contract).
//! 2. [`ring`] — consistent-hash ring mapping a key to an owning peer.
//! 3. [`singleflight`] — collapses concurrent identical calls into one.
//! 4. [`group`] — composes the above three with a user loader and a
//!    peer-fetch capability into the read-through miss-path protocol.
//!
//! [`byteview`] and [`cache`] are supporting types used throughout: the
//! cache value type and the thread-safe wrapper around [`lru::LruStore`],
//! respectively. [`error`] holds the crate's error type. [`transport`]
//! (behind the `http` feature) is the default peer-to-peer wire format —
//! an external collaborator the core specifies an interface for but does
//! not require.
//!
//! # Example
//!
//! ```
//! use shardcache::error::BoxError;
//! use shardcache::group::new_group;
//! use std::sync::Arc;
//!
//! let group = new_group("images", 1 << 20, Arc::new(|key: &str| -> Result<Vec<u8>, BoxError> {
//!     Ok(format!("contents of {key}").into_bytes())
//! }));
//!
//! let view = group.get("cat.png").unwrap();
//! assert_eq!(view.to_string_lossy(), "contents of cat.png");
//! ```

/// Immutable byte view: the cache value type.
pub mod byteview;

/// Mutex-guarded, lazily-initialized wrapper around [`lru::LruStore`].
pub mod cache;

/// Crate error type.
pub mod error;

/// Named cache namespaces and the miss-path protocol.
pub mod group;

/// Bounded LRU store with byte-accounted eviction.
pub mod lru;

/// Consistent-hash ring for peer selection.
pub mod ring;

/// Single-flight request coalescing.
pub mod singleflight;

/// Default HTTP peer-to-peer transport (requires the `http` feature).
#[cfg(feature = "http")]
pub mod transport;

pub use byteview::ByteView;
pub use cache::ConcurrentCache;
pub use error::CacheError;
pub use group::{get_group, new_group, Group, Loader, PeerGetter, PeerPicker};
pub use lru::LruStore;
pub use ring::HashRing;
pub use singleflight::SingleFlight;
