//! Error types
//!
//! The miss path genuinely fails (a key can be missing, a loader can
//! error), so this crate defines one typed error enum using `thiserror`.
//!
//! Two failure kinds deliberately never appear as `CacheError` variants:
//! - A failed peer fetch is recovered internally (logged, then the miss
//!   path falls through to the loader) and never escapes
//!   [`crate::group::Group::get`].
//! - Registering a nil loader or registering peers twice are fatal
//!   programmer errors detected at configuration time — they `panic!` at
//!   the call site rather than returning a `Result`. A non-nullable
//!   `Arc<dyn Loader>` makes the first of these unrepresentable outright;
//!   see [`crate::group::Group::register_peers`] for the second.

use std::fmt;
use std::sync::Arc;

/// A type-erased, thread-safe error, used for loader and peer-fetch
/// failures whose concrete type is up to the embedder/transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors a [`crate::group::Group::get`] call can surface to its caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// `Group::get` was called with an empty key.
    #[error("key is required")]
    KeyRequired,

    /// The user-supplied loader returned an error; propagated verbatim.
    #[error("loader failed: {0}")]
    Loader(#[source] ArcError),

    /// A requested group name is unregistered. Surfaced by external
    /// collaborators (e.g. an HTTP handler), never by the core's own
    /// `Group::get` (the core only looks up a `Group` it already has a
    /// handle to).
    #[error("no such group: {0}")]
    NoSuchGroup(String),
}

impl CacheError {
    /// Wraps any error implementing the standard error trait as a
    /// [`CacheError::Loader`].
    pub fn loader(err: impl Into<BoxError>) -> Self {
        CacheError::Loader(ArcError(Arc::from(err.into())))
    }
}

/// A `Clone`-able, type-erased error, needed because a single-flight result
/// is shared by value among every coalesced caller.
#[derive(Clone)]
pub struct ArcError(Arc<dyn std::error::Error + Send + Sync + 'static>);

impl fmt::Debug for ArcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ArcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ArcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}
