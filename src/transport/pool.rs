//! Client side: a pool of HTTP peers, selected via a consistent-hash ring.

use super::{DEFAULT_BASE_PATH, DEFAULT_REPLICAS};
use crate::error::BoxError;
use crate::group::{PeerGetter, PeerPicker};
use crate::ring::HashRing;
use parking_lot::Mutex;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::sync::Arc;

/// Construction-time parameters for [`HttpPool`].
#[derive(Debug, Clone)]
pub struct HttpPoolConfig {
    /// This process's own address, e.g. `"http://10.0.0.1:8001"`. Used so
    /// [`HttpPool`] can recognize when the ring picks the local node and
    /// correctly report "no remote peer" instead of looping back to self.
    pub self_addr: String,
    /// URL path prefix shared by every peer, e.g. `"/_geecache/"`.
    pub base_path: String,
    /// Virtual replicas per peer on the consistent-hash ring.
    pub replicas: usize,
}

impl HttpPoolConfig {
    /// Config with the default base path and replica count, for `self_addr`.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
        }
    }
}

struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// Implements [`PeerPicker`] over a set of HTTP peer addresses.
///
/// A mutex guards the ring and the per-peer getter map, held only while
/// selecting a peer — released before any network I/O runs.
pub struct HttpPool {
    self_addr: String,
    base_path: String,
    replicas: usize,
    state: Mutex<PoolState>,
}

impl HttpPool {
    /// Creates a pool with no peers yet; call [`HttpPool::set_peers`] to
    /// populate the ring.
    pub fn new(config: HttpPoolConfig) -> Self {
        Self {
            self_addr: config.self_addr,
            base_path: config.base_path,
            replicas: config.replicas,
            state: Mutex::new(PoolState {
                ring: HashRing::new(config.replicas.max(1), None),
                getters: HashMap::new(),
            }),
        }
    }

    /// Replaces the full peer set: a fresh ring is built (no incremental
    /// peer removal in this version) and one [`HttpGetter`] is constructed
    /// per peer.
    pub fn set_peers(&self, peers: impl IntoIterator<Item = impl Into<String>>) {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();
        let mut ring = HashRing::new(self.replicas.max(1), None);
        ring.add(peers.iter().cloned());
        let getters = peers
            .into_iter()
            .map(|peer| {
                let base_url = format!("{peer}{}", self.base_path);
                (peer, Arc::new(HttpGetter::new(base_url)))
            })
            .collect();

        let mut state = self.state.lock();
        state.ring = ring;
        state.getters = getters;
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.lock();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }
        let getter = state.getters.get(peer)?.clone();
        // Lock is dropped here (end of this scope), before the caller ever
        // does network I/O with `getter`.
        Some(getter as Arc<dyn PeerGetter>)
    }
}

impl std::fmt::Debug for HttpPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("HttpPool")
            .field("self_addr", &self.self_addr)
            .field("peers", &state.getters.len())
            .finish()
    }
}

/// Fetches a group/key pair from one specific remote peer over HTTP.
pub struct HttpGetter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpGetter {
    fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl PeerGetter for HttpGetter {
    fn get(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError> {
        let url = format!(
            "{}{}/{}",
            self.base_url,
            utf8_percent_encode(group, NON_ALPHANUMERIC),
            utf8_percent_encode(key, NON_ALPHANUMERIC),
        );
        let response = self.client.get(&url).send()?;
        if !response.status().is_success() {
            return Err(format!("server returned: {}", response.status()).into());
        }
        Ok(response.bytes()?.to_vec())
    }
}
