//! LRU cache of resolved membership sets.
//!
//! Only successful resolutions are stored. Evicted entries are recomputed on
//! demand; the resolution history keeps the identity of every resolution
//! independently of this cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::digest::ResolutionKey;
use crate::result::ResolvedValueSet;

/// Thread-safe LRU cache keyed by [`ResolutionKey`].
///
/// # Example
///
/// ```ignore
/// let cache = ResolutionCache::new(1024);
/// cache.insert(key.clone(), Arc::new(resolved));
/// assert!(cache.get(&key).is_some());
/// ```
pub struct ResolutionCache {
    inner: Mutex<LruCache<ResolutionKey, Arc<ResolvedValueSet>>>,
}

impl ResolutionCache {
    /// Creates a cache holding up to `capacity` sets (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Gets a set, promoting it to most-recently-used.
    pub fn get(&self, key: &ResolutionKey) -> Option<Arc<ResolvedValueSet>> {
        self.inner.lock().get(key).cloned()
    }

    /// Stores a set, evicting the least recently used one when full.
    pub fn insert(&self, key: ResolutionKey, resolved: Arc<ResolvedValueSet>) {
        if let Some((evicted, _)) = self.inner.lock().push(key, resolved) {
            log::trace!("evicted resolution {}", evicted);
        }
    }

    /// Checks for a key without affecting LRU order.
    pub fn contains(&self, key: &ResolutionKey) -> bool {
        self.inner.lock().contains(key)
    }

    /// Removes one set.
    pub fn remove(&self, key: &ResolutionKey) -> Option<Arc<ResolvedValueSet>> {
        self.inner.lock().pop(key)
    }

    /// Returns the number of cached sets.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cache capacity.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cts2_model::{NameAndUri, ResolutionOf, ResolvedValueSetHeader};

    fn key(name: &str) -> ResolutionKey {
        ResolutionKey::new(name, "e32e022f", ["GO-2019"])
    }

    fn resolved(name: &str) -> Arc<ResolvedValueSet> {
        Arc::new(ResolvedValueSet {
            header: ResolvedValueSetHeader {
                resolution_of: ResolutionOf {
                    value_set: NameAndUri::named(name),
                    value_set_definition: NameAndUri::named("e32e022f"),
                },
                resolved_using_code_systems: Vec::new(),
            },
            resolved_value_set_uri: key(name).resolution_uri("http://vs"),
            members: Vec::new(),
            membership_digest: String::new(),
            ordinal: 1,
        })
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ResolutionCache::new(4);
        cache.insert(key("A"), resolved("A"));
        assert_eq!(cache.get(&key("A")), Some(resolved("A")));
        assert!(cache.get(&key("B")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = ResolutionCache::new(2);
        cache.insert(key("A"), resolved("A"));
        cache.insert(key("B"), resolved("B"));

        // Touch A so B is least recently used
        cache.get(&key("A"));
        cache.insert(key("C"), resolved("C"));

        assert!(cache.contains(&key("A")));
        assert!(!cache.contains(&key("B")));
        assert!(cache.contains(&key("C")));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let cache = ResolutionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert(key("A"), resolved("A"));
        cache.insert(key("B"), resolved("B"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = ResolutionCache::new(4);
        cache.insert(key("A"), resolved("A"));
        cache.insert(key("B"), resolved("B"));
        assert!(cache.remove(&key("A")).is_some());
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
