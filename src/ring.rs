//! Consistent-hash ring for peer selection
//!
//! Maps a cache key to the peer identifier that owns it, using the classic
//! virtual-node consistent-hash scheme: each real peer is hashed onto the
//! ring `replicas` times so that adding or removing peers reshuffles only a
//! fraction of the key space (removal is not implemented in this version).
//!
//! # Contract
//!
//! Not concurrency-safe — callers must synchronize externally. In practice
//! the only caller is [`crate::transport::HttpPool`] (feature `http`),
//! which wraps one of these in a mutex.
//!
//! # How It Works
//!
//! ```text
//! add("peerA") with replicas = 3:
//!   H("0peerA") ─┐
//!   H("1peerA") ─┼─▶ three positions on the ring, each mapped back to "peerA"
//!   H("2peerA") ─┘
//!
//! get(key):
//!   pos = H(key)
//!   walk `keys` (sorted ascending) to the first entry >= pos, wrapping to
//!   index 0 if pos is past every entry (ring semantics)
//! ```
//!
//! Virtual-node hash collisions across distinct `(i, peer)` pairs overwrite
//! the ring's `peer` mapping in insertion order — accepted rather than
//! defended against.

use std::collections::HashMap;
use std::sync::Arc;

/// A hash function from arbitrary bytes to a ring position.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// Default hash: CRC32 (IEEE polynomial).
fn default_hash() -> HashFn {
    Arc::new(crc32fast::hash)
}

/// A consistent-hash ring mapping byte-string keys to peer identifiers.
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted ascending ring positions.
    keys: Vec<u32>,
    /// Ring position -> owning real peer.
    ring: HashMap<u32, String>,
}

impl HashRing {
    /// Creates an empty ring. `replicas` is the number of virtual nodes
    /// placed per real peer and must be positive. `hash` defaults to
    /// CRC32-IEEE when `None`.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or_else(default_hash),
            replicas,
            keys: Vec::new(),
            ring: HashMap::new(),
        }
    }

    /// Adds real peers to the ring. For each peer and each `i` in
    /// `0..replicas`, places a virtual node at `H(decimal(i) || peer)`.
    /// `keys` is re-sorted after all insertions.
    pub fn add<S: AsRef<str>>(&mut self, peers: impl IntoIterator<Item = S>) {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let virtual_key = format!("{i}{peer}");
                let hash = (self.hash)(virtual_key.as_bytes());
                self.keys.push(hash);
                self.ring.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    /// Returns the peer owning `key`, or `None` if the ring has no peers.
    ///
    /// Deterministic: depends only on `(replicas, hash, set of added
    /// peers)`, never on the calling thread or call order.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let idx = if idx == self.keys.len() { 0 } else { idx };
        self.ring.get(&self.keys[idx]).map(String::as_str)
    }

    /// `true` if no peers have been added yet.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for HashRing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("virtual_nodes", &self.keys.len())
            .finish()
    }
}
