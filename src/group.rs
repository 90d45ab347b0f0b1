//! Group orchestrator: named cache namespaces and the miss-path protocol
//!
//! Composes [`crate::cache::ConcurrentCache`], [`crate::singleflight::SingleFlight`]
//! and the peer abstractions below into the end-to-end lookup protocol:
//! local hit → single-flight-guarded (peer fetch → source load) →
//! populate → return.

use crate::byteview::ByteView;
use crate::cache::ConcurrentCache;
use crate::error::{BoxError, CacheError};
use crate::singleflight::SingleFlight;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// User-supplied source-of-truth for a group, invoked on total miss.
///
/// The blanket impl below lets a plain closure be passed directly to
/// [`new_group`] without a hand-written wrapper type.
pub trait Loader: Send + Sync {
    /// Loads the bytes for `key` from the source of truth, or fails.
    fn load(&self, key: &str) -> Result<Vec<u8>, BoxError>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync,
{
    fn load(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        self(key)
    }
}

/// Chooses, for a given key, the [`PeerGetter`] that owns it — or `None` if
/// the key belongs to the local node or no peers are configured.
///
/// The boundary to the transport layer: the core ships no concrete
/// implementation of this trait in its default feature set. See the
/// `http` feature (`crate::transport`) for the default HTTP-backed one.
pub trait PeerPicker: Send + Sync {
    /// Picks the peer owning `key`, if any and if it isn't the local node.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a key's bytes from one specific remote peer.
///
/// Any error this returns is opaque to the core: [`Group::get`] treats it
/// uniformly as "fall back to the local loader".
pub trait PeerGetter: Send + Sync {
    /// Fetches `key` from `group` on the remote peer this getter addresses.
    fn get(&self, group: &str, key: &str) -> Result<Vec<u8>, BoxError>;
}

/// A named cache namespace: a byte budget, a loader, and an optional peer
/// set, composed into the read-through miss-path protocol.
///
/// Constructed via [`new_group`] and looked up via [`get_group`]; never
/// constructed directly. Groups are created, never destroyed — there is
/// no API to unregister one.
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    main_cache: ConcurrentCache,
    peers: RwLock<Option<Arc<dyn PeerPicker>>>,
    flight: SingleFlight<ByteView>,
}

impl Group {
    /// This group's name, as registered with [`new_group`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers the peer set to consult on a local miss. May be called at
    /// most once per group — a second call is a fatal programmer error and
    /// panics.
    pub fn register_peers(&self, picker: Arc<dyn PeerPicker>) {
        let mut guard = self.peers.write();
        assert!(
            guard.is_none(),
            "register_peers called more than once for group {:?}",
            self.name
        );
        *guard = Some(picker);
    }

    /// Looks up `key`: a local cache hit returns immediately; a miss runs
    /// the single-flight-guarded protocol (peer attempt, then local load,
    /// then populate).
    pub fn get(&self, key: &str) -> Result<ByteView, CacheError> {
        if key.is_empty() {
            return Err(CacheError::KeyRequired);
        }
        if let Some(view) = self.main_cache.get(key) {
            tracing::debug!(group = %self.name, key, "cache hit");
            return Ok(view);
        }
        self.flight.do_call(key, || self.load(key))
    }

    /// The single-flight body: peer attempt (soft-fallback on failure),
    /// then the user loader (propagated on failure), then populate.
    fn load(&self, key: &str) -> Result<ByteView, CacheError> {
        if let Some(picker) = self.peers.read().clone() {
            if let Some(getter) = picker.pick_peer(key) {
                match self.get_from_peer(getter.as_ref(), key) {
                    Ok(view) => return Ok(view),
                    Err(err) => {
                        tracing::warn!(group = %self.name, key, error = %err, "peer fetch failed, falling back to loader");
                    }
                }
            }
        }
        self.get_locally(key)
    }

    fn get_locally(&self, key: &str) -> Result<ByteView, CacheError> {
        let bytes = self.loader.load(key).map_err(CacheError::loader)?;
        let view = ByteView::from_vec(bytes);
        self.main_cache.add(key, view.clone());
        Ok(view)
    }

    /// Fetches from a specific remote peer. No defensive copy here, since
    /// [`ByteView::from_vec`] takes ownership of an already-unique buffer.
    fn get_from_peer(&self, getter: &dyn PeerGetter, key: &str) -> Result<ByteView, BoxError> {
        let bytes = getter.get(&self.name, key)?;
        Ok(ByteView::from_vec(bytes))
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("has_peers", &self.peers.read().is_some())
            .finish()
    }
}

fn registry() -> &'static RwLock<HashMap<String, Arc<Group>>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, Arc<Group>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Creates and registers a new [`Group`] under `name`.
///
/// If `name` is already registered, the previous `Group` is silently
/// replaced (logged at `warn` level).
///
/// `loader` is a non-nullable `Arc<dyn Loader>`, so registering a group
/// with no loader can't happen here by construction.
pub fn new_group(name: impl Into<String>, cache_bytes: usize, loader: Arc<dyn Loader>) -> Arc<Group> {
    let name = name.into();
    let group = Arc::new(Group {
        name: name.clone(),
        loader,
        main_cache: ConcurrentCache::new(cache_bytes),
        peers: RwLock::new(None),
        flight: SingleFlight::new(),
    });

    let mut reg = registry().write();
    if reg.contains_key(&name) {
        tracing::warn!(group = %name, "new_group overwrote an existing registration for this name");
    } else {
        tracing::info!(group = %name, cache_bytes, "registered cache group");
    }
    reg.insert(name, group.clone());
    group
}

/// Looks up a previously registered group by name.
pub fn get_group(name: &str) -> Option<Arc<Group>> {
    registry().read().get(name).cloned()
}

/// Clears every registered group.
///
/// The registry otherwise has no teardown path — it's initialized on
/// first use and never torn down. This exists purely for test isolation
/// between independent test functions that each want a clean
/// `name -> Group` namespace.
pub fn clear_registry() {
    registry().write().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn unique_name(tag: &str) -> String {
        use std::sync::atomic::AtomicU64;
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        format!("{tag}-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        value: Vec<u8>,
    }

    impl Loader for CountingLoader {
        fn load(&self, _key: &str) -> Result<Vec<u8>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.clone())
        }
    }

    #[test]
    fn empty_key_is_rejected() {
        let group = new_group(unique_name("empty-key"), 1024, Arc::new(|_: &str| Ok(vec![])));
        assert!(matches!(group.get(""), Err(CacheError::KeyRequired)));
    }

    #[test]
    fn miss_then_hit_invokes_the_loader_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
            value: b"value-a".to_vec(),
        };
        let group = new_group(unique_name("miss-then-hit"), 1024, Arc::new(loader));

        let first = group.get("a").unwrap();
        let second = group.get("a").unwrap();

        assert_eq!(first.as_bytes(), b"value-a");
        assert_eq!(second.as_bytes(), b"value-a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loader_errors_propagate_to_the_caller() {
        let group = new_group(
            unique_name("loader-error"),
            1024,
            Arc::new(|_: &str| -> Result<Vec<u8>, BoxError> { Err("boom".into()) }),
        );
        assert!(matches!(group.get("k"), Err(CacheError::Loader(_))));
    }

    #[test]
    fn get_group_finds_a_registered_group_by_name() {
        let name = unique_name("lookup");
        let created = new_group(name.clone(), 1024, Arc::new(|_: &str| Ok(vec![1])));
        let found = get_group(&name).expect("group should be registered");
        assert!(Arc::ptr_eq(&created, &found));
        assert!(get_group("does-not-exist-at-all").is_none());
    }

    #[test]
    #[should_panic(expected = "register_peers called more than once")]
    fn registering_peers_twice_is_a_fatal_error() {
        struct NoPeers;
        impl PeerPicker for NoPeers {
            fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
                None
            }
        }
        let group = new_group(unique_name("double-register"), 1024, Arc::new(|_: &str| Ok(vec![])));
        group.register_peers(Arc::new(NoPeers));
        group.register_peers(Arc::new(NoPeers));
    }

    #[test]
    fn double_registration_under_the_same_name_overwrites_silently() {
        let name = unique_name("dup-name");
        let first = new_group(name.clone(), 1024, Arc::new(|_: &str| Ok(b"first".to_vec())));
        let second = new_group(name.clone(), 1024, Arc::new(|_: &str| Ok(b"second".to_vec())));
        assert!(!Arc::ptr_eq(&first, &second));
        let found = get_group(&name).unwrap();
        assert!(Arc::ptr_eq(&found, &second));
    }

    struct FailingPeerGetter;
    impl PeerGetter for FailingPeerGetter {
        fn get(&self, _group: &str, _key: &str) -> Result<Vec<u8>, BoxError> {
            Err("peer unreachable".into())
        }
    }

    struct AlwaysRemote(Arc<dyn PeerGetter>);
    impl PeerPicker for AlwaysRemote {
        fn pick_peer(&self, _key: &str) -> Option<Arc<dyn PeerGetter>> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn a_failing_peer_falls_back_to_the_local_loader_without_surfacing_an_error() {
        let group = new_group(
            unique_name("peer-fallback"),
            1024,
            Arc::new(|_: &str| Ok(b"local-value".to_vec())),
        );
        group.register_peers(Arc::new(AlwaysRemote(Arc::new(FailingPeerGetter))));

        let result = group.get("k").expect("peer failure must not surface as an error");
        assert_eq!(result.as_bytes(), b"local-value");
    }

    struct WorkingPeerGetter(Vec<u8>);
    impl PeerGetter for WorkingPeerGetter {
        fn get(&self, _group: &str, _key: &str) -> Result<Vec<u8>, BoxError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn a_successful_peer_fetch_is_used_instead_of_the_local_loader() {
        let local_calls = Arc::new(StdMutex::new(0usize));
        let local_calls2 = local_calls.clone();
        let group = new_group(unique_name("peer-success"), 1024, loader_from_fn(move |_| {
            *local_calls2.lock().unwrap() += 1;
            Ok(b"should-not-be-used".to_vec())
        }));
        group.register_peers(Arc::new(AlwaysRemote(Arc::new(WorkingPeerGetter(
            b"from-peer".to_vec(),
        )))));

        let result = group.get("k").unwrap();
        assert_eq!(result.as_bytes(), b"from-peer");
        assert_eq!(*local_calls.lock().unwrap(), 0);
    }

    /// Test-only helper: wraps a `FnMut`-ish closure (via interior
    /// mutability) as a `Loader`, since `Loader`'s blanket impl only covers
    /// `Fn`, not `FnMut`.
    fn loader_from_fn(
        f: impl Fn(&str) -> Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    ) -> Arc<dyn Loader> {
        Arc::new(f)
    }

    #[test]
    fn concurrent_gets_for_a_cold_key_load_the_source_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = CountingLoader {
            calls: calls.clone(),
            value: b"hot-key-value".to_vec(),
        };
        let group = Arc::new(new_group(
            unique_name("concurrent-cold-key"),
            1 << 20,
            Arc::new(loader),
        ));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let group = group.clone();
                std::thread::spawn(move || group.get("hot").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().as_bytes(), b"hot-key-value");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
