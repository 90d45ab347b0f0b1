//! Single-flight coordinator
//!
//! Collapses concurrent identical calls for the same key into exactly one
//! underlying computation; every caller whose call overlaps with that one
//! computation observes the same returned result. Callers that arrive
//! strictly after the computation has completed and been unregistered
//! trigger a fresh computation — this type coalesces concurrency, it does
//! not cache results (that's [`crate::lru::LruStore`]'s job).
//!
//! # Contract
//!
//! Concurrency-safe. The coordinator's own mutex is released *before* the
//! computation runs: the in-flight closure runs unlocked, and waiters park
//! on a per-call completion latch instead of the coordinator's mutex, so
//! concurrent calls for *different* keys never serialize on each other.
//!
//! ```text
//! do("x", f)                    do("x", f)  (arrives while the first is in flight)
//!     │                              │
//!     ▼                              ▼
//! no call for "x" yet          call for "x" exists
//!     │                              │
//!     ▼                              ▼
//! register Call, run f()       release coordinator lock, wait on Call's latch
//!     │                              │
//!     ▼                              │
//! store result, wake waiters ───────▶│
//!     │                              │
//!     ▼                              ▼
//! unregister Call               both return the same (value, error)
//! ```

use crate::error::CacheError;
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

enum CallState<T> {
    Pending,
    Done(Result<T, CacheError>),
}

struct Call<T> {
    state: Mutex<CallState<T>>,
    completed: Condvar,
}

impl<T: Clone> Call<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(CallState::Pending),
            completed: Condvar::new(),
        }
    }

    /// Blocks until the call completes, then returns a clone of its result.
    fn wait(&self) -> Result<T, CacheError> {
        let mut guard = self.state.lock();
        loop {
            match &*guard {
                CallState::Done(result) => return result.clone(),
                CallState::Pending => self.completed.wait(&mut guard),
            }
        }
    }

    /// Records the result and wakes every waiter. Called exactly once, on
    /// every exit path from the in-flight closure (including a panic),
    /// so no waiter can ever be left parked forever.
    fn finish(&self, result: Result<T, CacheError>) -> Result<T, CacheError> {
        let mut guard = self.state.lock();
        *guard = CallState::Done(result.clone());
        self.completed.notify_all();
        result
    }
}

/// Deduplicates concurrent calls keyed by a string.
pub struct SingleFlight<T: Clone + Send + 'static> {
    calls: Mutex<HashMap<String, Arc<Call<T>>>>,
}

impl<T: Clone + Send + 'static> SingleFlight<T> {
    /// Creates an empty coordinator.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` for `key`, or waits for and shares the result of an
    /// already-in-flight call for the same key.
    ///
    /// If `f` panics, the panic is caught, every waiter still observes a
    /// well-defined [`CacheError`] rather than deadlocking, and the panic
    /// is then resumed on this call's own thread (the originator) so the
    /// panic is not silently swallowed for the caller that triggered it.
    pub fn do_call(&self, key: &str, f: impl FnOnce() -> Result<T, CacheError>) -> Result<T, CacheError> {
        let mut calls = self.calls.lock();
        if let Some(existing) = calls.get(key).cloned() {
            drop(calls);
            return existing.wait();
        }
        let call = Arc::new(Call::new());
        calls.insert(key.to_string(), call.clone());
        drop(calls);

        let outcome = catch_unwind(AssertUnwindSafe(f));

        self.calls.lock().remove(key);

        match outcome {
            Ok(result) => call.finish(result),
            Err(panic) => {
                call.finish(Err(CacheError::loader(format!(
                    "single-flight closure panicked: {}",
                    panic_message(&panic)
                ))));
                std::panic::resume_unwind(panic)
            }
        }
    }
}

impl<T: Clone + Send + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("in_flight", &self.calls.lock().len())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
