//! Least Recently Used (LRU) store with byte-accounted eviction
//!
//! A bounded `key -> value` map whose eviction policy is pure recency: the
//! entry least recently touched by [`LruStore::get`] or [`LruStore::add`] is
//! the first dropped once the configured byte budget is exceeded.
//!
//! # Contract
//!
//! **Not** concurrency-safe — callers must serialize access externally (see
//! [`crate::cache::ConcurrentCache`] for the synchronized wrapper this crate
//! actually hands to [`crate::group::Group`]).
//!
//! # How It Works
//!
//! Entries live in a `HashMap<String, Node>` plus an intrusive recency order
//! threaded through each `Node`'s `prev`/`next` key, so the whole store is
//! safe, ordinary Rust with no raw pointers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         LruStore                            │
//! │                                                               │
//! │  HashMap<String, Node>         head ◀──▶ ... ◀──▶ tail       │
//! │  ┌──────────────┐              (MRU)              (LRU)      │
//! │  │ "a" ─────────┼──▶ Node { value, prev: None,  next: "b" }  │
//! │  │ "b" ─────────┼──▶ Node { value, prev: "a",   next: None } │
//! │  └──────────────┘                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `get`/`add` on an existing key unlink + relink the node at `head`, both
//! O(1) amortized (one hash lookup, a handful of key-string clones in place
//! of the pointer swaps a raw-pointer intrusive list would use).

use crate::byteview::ByteView;
use std::collections::HashMap;

struct Node {
    value: ByteView,
    prev: Option<String>,
    next: Option<String>,
}

/// Charge an entry contributes to `used_bytes`: `len(key) + value.len()`.
fn charge(key: &str, value: &ByteView) -> usize {
    key.len() + value.len()
}

/// A bounded LRU store. See the module docs for the data structure.
///
/// `max_bytes == 0` means unbounded: entries are never evicted for size,
/// only ever removed explicitly via [`LruStore::remove_oldest`].
pub struct LruStore {
    max_bytes: usize,
    used_bytes: usize,
    entries: HashMap<String, Node>,
    head: Option<String>,
    tail: Option<String>,
    on_evicted: Option<Box<dyn FnMut(&str, &ByteView) + Send>>,
}

impl LruStore {
    /// Creates an empty store with the given byte budget and optional
    /// eviction callback.
    ///
    /// `on_evicted` runs synchronously inside [`LruStore::remove_oldest`],
    /// while no other lock is held by this type (it holds none itself); the
    /// callback must not re-enter this store.
    pub fn new(
        max_bytes: usize,
        on_evicted: Option<Box<dyn FnMut(&str, &ByteView) + Send>>,
    ) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            entries: HashMap::new(),
            head: None,
            tail: None,
            on_evicted,
        }
    }

    /// Current byte charge: `Σ (len(key) + value.len())` over present entries.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up `key`. On a hit, moves the entry to the front of the
    /// recency order (the most-recently-touched end) and returns a clone of
    /// its value (a cheap `Arc` bump, see [`ByteView`]).
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.unlink(key);
        self.push_front(key.to_string());
        self.entries.get(key).map(|n| n.value.clone())
    }

    /// Inserts or updates `key`. Updates in place and re-charges the delta
    /// if present; otherwise inserts at the front and charges the full
    /// `len(key) + value.len()`. Either path is followed by the eviction
    /// loop: while `max_bytes > 0` and `used_bytes > max_bytes`, the back
    /// entry is evicted.
    ///
    /// A single entry larger than `max_bytes` is permitted: it is inserted,
    /// then evicted by the very next loop iteration, returning the store to
    /// empty. Not defended against — an oversized entry is a caller
    /// misconfiguration, not a condition this store tries to reject.
    pub fn add(&mut self, key: &str, value: ByteView) {
        if let Some(node) = self.entries.get_mut(key) {
            let old_len = node.value.len();
            node.value = value.clone();
            self.used_bytes = self.used_bytes + value.len() - old_len;
            self.unlink(key);
            self.push_front(key.to_string());
        } else {
            self.used_bytes += charge(key, &value);
            self.entries.insert(
                key.to_string(),
                Node {
                    value,
                    prev: None,
                    next: None,
                },
            );
            self.push_front(key.to_string());
        }

        while self.max_bytes > 0 && self.used_bytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    /// Removes the least-recently-touched entry, if any, and invokes
    /// `on_evicted(key, value)` if one is set.
    pub fn remove_oldest(&mut self) {
        let Some(key) = self.tail.clone() else {
            return;
        };
        self.unlink(&key);
        if let Some(node) = self.entries.remove(&key) {
            self.used_bytes -= charge(&key, &node.value);
            if let Some(cb) = self.on_evicted.as_mut() {
                cb(&key, &node.value);
            }
        }
    }

    /// Unlinks `key` from the recency order in place, leaving its entry (if
    /// present) in the map with stale `prev`/`next`. Callers must immediately
    /// either re-link it (`push_front`) or remove it from the map.
    fn unlink(&mut self, key: &str) {
        let (prev, next) = match self.entries.get(key) {
            Some(n) => (n.prev.clone(), n.next.clone()),
            None => return,
        };
        match &prev {
            Some(p) => self.entries.get_mut(p).unwrap().next = next.clone(),
            None => self.head = next.clone(),
        }
        match &next {
            Some(n) => self.entries.get_mut(n).unwrap().prev = prev,
            None => self.tail = prev,
        }
    }

    /// Links `key` (already present in `entries` with arbitrary `prev`/`next`)
    /// at the head of the recency order.
    fn push_front(&mut self, key: String) {
        let old_head = self.head.take();
        if let Some(node) = self.entries.get_mut(&key) {
            node.prev = None;
            node.next = old_head.clone();
        }
        if let Some(h) = &old_head {
            if let Some(node) = self.entries.get_mut(h) {
                node.prev = Some(key.clone());
            }
        } else {
            self.tail = Some(key.clone());
        }
        self.head = Some(key);
    }
}

impl std::fmt::Debug for LruStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruStore")
            .field("len", &self.len())
            .field("used_bytes", &self.used_bytes)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}
