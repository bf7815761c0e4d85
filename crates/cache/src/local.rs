//! In-process TTL cache backed by DashMap for lock-free concurrent access.
//! Sits in front of upstream fetches; owned and injected by the caller.

use dashmap::DashMap;
use regex::Regex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

struct CacheEntry<V> {
    value: V,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Key-value cache where every entry carries its own time-to-live.
pub struct TtlCache<V> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    /// Get a value, returns None if expired or missing.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = match self.store.get(key) {
            Some(entry) => entry,
            None => {
                metrics::counter!("cache.miss").increment(1);
                return None;
            }
        };
        if entry.is_expired(Instant::now()) {
            drop(entry);
            self.store.remove_if(key, |_, e| e.is_expired(Instant::now()));
            metrics::counter!("cache.miss").increment(1);
            return None;
        }
        metrics::counter!("cache.hit").increment(1);
        Some(entry.value.clone())
    }

    /// Insert or replace a value that expires after `ttl`.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        // Full cache: skip new keys until eviction frees room
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            self.evict_expired();
            if self.store.len() >= self.max_entries {
                debug!(key = %key, "Cache full, skipping insert");
                return;
            }
        }
        self.store.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
    }

    /// Remove every key matching `pattern`, where `*` matches any run of
    /// characters and everything else is literal. Returns the number removed.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let regex_src = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
        let matcher = match Regex::new(&regex_src) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern = pattern, error = %e, "Invalid cache invalidation pattern");
                return 0;
            }
        };
        let before = self.store.len();
        self.store.retain(|key, _| !matcher.is_match(key));
        let removed = before.saturating_sub(self.store.len());
        debug!(pattern = pattern, removed = removed, "Cache invalidated");
        removed
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    /// Remove expired entries. Call this periodically from a background task.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.store.len())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(10_000)
    }
}
