//! Default HTTP peer-to-peer transport (feature `http`)
//!
//! An external collaborator, not part of the core: nothing in
//! [`crate::group`] depends on this module; it exists only to give
//! embedders a working default transport.
//!
//! - [`pool::HttpPool`] implements [`crate::group::PeerPicker`], backed by
//!   [`crate::ring::HashRing`] for peer selection and a `reqwest` blocking
//!   client per peer for the fetch itself.
//! - [`server::router`] is the `axum` side: an embedder mounts it to answer
//!   the peers `HttpPool` dials out to.

pub mod pool;
pub mod server;

pub use pool::{HttpGetter, HttpPool, HttpPoolConfig};
pub use server::router;

/// Default base path prefix for peer requests.
pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

/// Default number of virtual replicas per peer on the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;
