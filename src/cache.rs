//! Concurrent LRU wrapper
//!
//! A thin `parking_lot::Mutex`-guarded handle around [`LruStore`], lazily
//! constructing the store on first [`ConcurrentCache::add`] so that a
//! [`crate::group::Group`] configured with a byte budget but never written
//! to never allocates one. A single global mutex, not lock-striped
//! segments: miss-path contention is handled upstream by the single-flight
//! coordinator, so this wrapper only needs to keep one store consistent.

use crate::byteview::ByteView;
use crate::lru::LruStore;
use parking_lot::Mutex;

/// Synchronizes access to a single [`LruStore`] for use from multiple
/// threads. The mutex is held for the entirety of each operation and never
/// across I/O — callers must not invoke the user loader or a peer fetch
/// while holding a reference derived from this type.
pub struct ConcurrentCache {
    cache_bytes: usize,
    store: Mutex<Option<LruStore>>,
}

impl ConcurrentCache {
    /// Creates a wrapper with the given byte budget. No allocation happens
    /// until the first `add`.
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            store: Mutex::new(None),
        }
    }

    /// Looks up `key`. Returns `None` without allocating the store if it was
    /// never initialized (i.e. nothing has ever been added).
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.store.lock();
        guard.as_mut()?.get(key)
    }

    /// Inserts `key` / `value`, lazily constructing the underlying
    /// [`LruStore`] with this wrapper's configured budget and no eviction
    /// callback on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.store.lock();
        let store = guard.get_or_insert_with(|| LruStore::new(self.cache_bytes, None));
        store.add(key, value);
    }

    /// Number of entries currently cached; `0` if never initialized.
    pub fn len(&self) -> usize {
        self.store.lock().as_ref().map_or(0, LruStore::len)
    }

    /// `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ConcurrentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentCache")
            .field("cache_bytes", &self.cache_bytes)
            .field("len", &self.len())
            .finish()
    }
}
