//! TTL cache over Ingests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chainwave_model::{ChainBinding, EngineError};

use crate::ingest::Ingest;
use crate::store::{AccessScope, LibraryStore};

/// Source of monotonic time, injected so tests can expire entries
/// without sleeping.
pub trait TimeSource: Send + Sync {
    /// Current monotonic instant.
    fn now(&self) -> Instant;
}

/// Real monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A cached value with its creation time.
#[derive(Debug)]
struct CacheEntry<T> {
    value: T,
    created_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        now < self.created_at + ttl
    }
}

/// Concurrent TTL cache mapping deterministic keys to shared Ingests.
///
/// Reads and writes go through a `RwLock`ed map; inserts are
/// insert-if-absent per key, so the first writer wins within a TTL window
/// and every caller inside that window shares one `Arc<Ingest>`.
pub struct IngestCache {
    store: Arc<dyn LibraryStore>,
    ttl: Duration,
    time: Arc<dyn TimeSource>,
    entries: RwLock<HashMap<String, CacheEntry<Arc<Ingest>>>>,
}

impl IngestCache {
    /// Creates a cache over a library store.
    pub fn new(store: Arc<dyn LibraryStore>, ttl: Duration, time: Arc<dyn TimeSource>) -> Self {
        Self {
            store,
            ttl,
            time,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the live Ingest for a scope and binding set, materializing
    /// and caching a fresh one on miss or expiry.
    ///
    /// Expired entries are pruned lazily before the lookup; O(n) over the
    /// current entries, which stay bounded by the number of distinct
    /// scope+binding combinations in flight.
    pub fn ingest(
        &self,
        scope: &AccessScope,
        bindings: &[ChainBinding],
    ) -> Result<Arc<Ingest>, EngineError> {
        let now = self.time.now();
        self.prune(now);

        let key = Ingest::cache_key(scope, bindings);
        if let Some(live) = self.lookup(&key, now) {
            return Ok(live);
        }

        let content = self.store.load_library_entities(scope, bindings)?;
        let fresh = Arc::new(Ingest::from_content(scope, bindings, content));

        let mut entries = self.entries.write().expect("ingest cache lock poisoned");
        // Another worker may have built the same key while we loaded;
        // first writer wins so both callers share one instance.
        if let Some(existing) = entries.get(&key) {
            if existing.is_live(now, self.ttl) {
                return Ok(Arc::clone(&existing.value));
            }
        }
        entries.insert(
            key,
            CacheEntry {
                value: Arc::clone(&fresh),
                created_at: now,
            },
        );
        Ok(fresh)
    }

    /// Number of entries currently held (live or awaiting prune).
    pub fn len(&self) -> usize {
        self.entries.read().expect("ingest cache lock poisoned").len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str, now: Instant) -> Option<Arc<Ingest>> {
        let entries = self.entries.read().expect("ingest cache lock poisoned");
        entries
            .get(key)
            .filter(|entry| entry.is_live(now, self.ttl))
            .map(|entry| Arc::clone(&entry.value))
    }

    fn prune(&self, now: Instant) {
        let mut entries = self.entries.write().expect("ingest cache lock poisoned");
        entries.retain(|_, entry| entry.is_live(now, self.ttl));
    }
}
