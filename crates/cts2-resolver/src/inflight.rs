//! Key-scoped coalescing of concurrent computations.
//!
//! At most one computation runs per key. The first caller for a key becomes
//! the leader and computes; callers arriving while it runs become followers
//! and wait on the same slot. The slot is removed when the leader
//! completes, so a failed outcome is delivered to the callers that were
//! waiting for it and never to later ones.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{ResolverError, ResolverResult};

/// The outcome slot of one in-flight computation.
pub struct Slot<V> {
    outcome: Mutex<Option<ResolverResult<V>>>,
    ready: Condvar,
}

impl<V: Clone> Slot<V> {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    fn publish(&self, outcome: ResolverResult<V>) {
        let mut guard = self.outcome.lock();
        *guard = Some(outcome);
        self.ready.notify_all();
    }

    /// Blocks until the outcome is published.
    ///
    /// With a timeout the caller gives up with [`ResolverError::Timeout`];
    /// the computation itself is unaffected.
    pub fn wait(&self, timeout: Option<Duration>) -> ResolverResult<V> {
        let mut guard = self.outcome.lock();
        let deadline = timeout.map(|t| (t, Instant::now() + t));
        loop {
            if let Some(outcome) = guard.as_ref() {
                return outcome.clone();
            }
            match deadline {
                None => self.ready.wait(&mut guard),
                Some((timeout, deadline)) => {
                    if self.ready.wait_until(&mut guard, deadline).timed_out() && guard.is_none() {
                        log::warn!("stopped waiting for resolution after {:?}", timeout);
                        return Err(ResolverError::Timeout(timeout));
                    }
                }
            }
        }
    }

    /// Returns true once the outcome is published.
    pub fn is_ready(&self) -> bool {
        self.outcome.lock().is_some()
    }
}

/// The caller's part in a computation.
pub enum Join<V> {
    /// Computes the value and must call [`InFlight::complete`].
    Leader(Arc<Slot<V>>),
    /// Waits on the leader's slot.
    Follower(Arc<Slot<V>>),
}

/// Registry of in-flight computations.
pub struct InFlight<K, V> {
    slots: Mutex<HashMap<K, Arc<Slot<V>>>>,
}

impl<K, V> Default for InFlight<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InFlight<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Joins the computation for a key, starting one if none is running.
    pub fn join(&self, key: &K) -> Join<V> {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key) {
            log::trace!("{} is in flight; waiting", key);
            return Join::Follower(Arc::clone(slot));
        }
        let slot = Arc::new(Slot::new());
        slots.insert(key.clone(), Arc::clone(&slot));
        log::trace!("{} started", key);
        Join::Leader(slot)
    }

    /// Publishes the leader's outcome and releases the key.
    ///
    /// Successful values must already be stored where later callers look
    /// for them, since the key is free again once this returns.
    pub fn complete(&self, key: &K, slot: &Slot<V>, outcome: ResolverResult<V>) {
        self.slots.lock().remove(key);
        log::trace!("{} finished (ok: {})", key, outcome.is_ok());
        slot.publish(outcome);
    }

    /// Number of keys currently in flight.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
