//! Revision-keyed query caches.
//!
//! Every entry remembers the [`Revision`] it was computed under and is only
//! returned while the index still reports that revision. Locks are held for
//! lookups and inserts only, never while computing, so concurrent misses for
//! the same key may both compute. The first published value wins and later
//! ones are discarded, which keeps result identity stable for callers.

use std::hash::Hash;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::Revision;

#[derive(Debug)]
struct Stamped<V> {
    revision: Revision,
    value: V,
}

#[derive(Debug)]
struct Entries<K, V> {
    map: FxHashMap<K, Stamped<V>>,
    /// Newest revision seen by an insert. Entries older than this are dead.
    latest: Revision,
}

/// Concurrent memo table for one kind of query.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    name: &'static str,
    entries: RwLock<Entries<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(Entries {
                map: FxHashMap::default(),
                latest: Revision::default(),
            }),
        }
    }

    /// Value for `key` at `revision`, computing it on a miss.
    pub fn get_or_compute<F>(&self, key: &K, revision: Revision, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key, revision) {
            return value;
        }

        tracing::debug!("[CACHE] {} miss at {:?}", self.name, revision);
        let value = compute();

        let mut entries = self.entries.write();
        if let Some(existing) = entries.map.get(key) {
            if existing.revision == revision {
                return existing.value.clone();
            }
        }
        if revision < entries.latest {
            tracing::debug!(
                "[CACHE] {} result for {:?} superseded by {:?}, not stored",
                self.name,
                revision,
                entries.latest
            );
            return value;
        }
        if entries.latest != revision {
            entries.map.retain(|_, stamped| stamped.revision == revision);
            entries.latest = revision;
        }
        entries.map.insert(
            key.clone(),
            Stamped {
                revision,
                value: value.clone(),
            },
        );
        value
    }

    /// Cached value for `key`, only if it was computed at `revision`.
    pub fn get(&self, key: &K, revision: Revision) -> Option<V> {
        let entries = self.entries.read();
        entries
            .map
            .get(key)
            .filter(|stamped| stamped.revision == revision)
            .map(|stamped| stamped.value.clone())
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.write().map.clear();
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single memoized value; a [`QueryCache`] with one implicit key.
#[derive(Debug)]
pub struct CachedValue<V> {
    inner: QueryCache<(), V>,
}

impl<V: Clone> CachedValue<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: QueryCache::new(name),
        }
    }

    pub fn get_or_compute<F>(&self, revision: Revision, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.inner.get_or_compute(&(), revision, compute)
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}
