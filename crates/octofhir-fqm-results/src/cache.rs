//! Short-lived cache for expensive upstream results
//!
//! Sits in front of the external calculation engine (keyed by a
//! measure's identity); the correlation/rendering pipelines never touch
//! it and rebuild every index per call from the supplied inputs.

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default entry lifetime (10 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Time-bounded cache with per-instance TTL
///
/// Expired entries are dropped lazily on read and eagerly via
/// [`TtlCache::purge_expired`]. Interior mutability keeps the cache
/// shareable across concurrent report requests.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create a cache with the given entry lifetime
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a live entry, dropping it when expired
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                log::debug!("cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry, restarting its lifetime
    pub fn insert(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().insert(key, entry);
    }

    /// Drop every expired entry
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.lock().retain(|_, entry| entry.expires_at > now);
    }

    /// Number of stored entries, live or not yet purged
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop all entries
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl<K: Eq + Hash, V: Clone> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
