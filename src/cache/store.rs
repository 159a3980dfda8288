//! TTL-keyed in-memory store.
//!
//! Entries live in an LRU bounded by [`CacheConfig::max_entries`]. Reads take
//! the read lock and `peek`, so they never reorder or drop entries; only
//! `put`, `invalidate` and `clear` mutate.

use std::sync::RwLock;
use std::time::Duration;

use lru::LruCache;
use metrics::counter;
use tokio::time::Instant;
use tracing::debug;

use super::config::CacheConfig;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// A live entry returned by [`TtlStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit<V> {
    pub value: V,
    /// Time elapsed since the value was stored.
    pub age: Duration,
}

pub struct TtlStore<V> {
    entries: RwLock<LruCache<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlStore<V> {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.max_entries_non_zero())),
        }
    }

    /// Look up a live entry. Expired entries read as misses.
    pub fn get(&self, key: &str) -> Option<Hit<V>> {
        let now = Instant::now();
        let guard = rw_read(&self.entries, SOURCE, "get");
        let entry = guard.peek(key)?;
        if entry.is_expired(now) {
            return None;
        }
        Some(Hit {
            value: entry.value.clone(),
            age: now.saturating_duration_since(entry.stored_at),
        })
    }

    /// Store `value` under `key` for `ttl`. Last write wins.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut guard = rw_write(&self.entries, SOURCE, "put");

        if guard.len() == guard.cap().get() {
            let expired: Vec<String> = guard
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone())
                .collect();
            for stale in expired {
                guard.pop(&stale);
            }
        }

        let entry = CacheEntry {
            value,
            stored_at: now,
            expires_at: now + ttl,
        };
        let key = key.into();
        let evicted = guard.push(key.clone(), entry);
        if evicted.is_some_and(|(evicted_key, _)| evicted_key != key) {
            counter!("newsdesk_cache_evict_total").increment(1);
        }
    }

    /// Remove every entry whose key starts with `prefix`; returns how many went.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut guard = rw_write(&self.entries, SOURCE, "invalidate");
        let matching: Vec<String> = guard
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            guard.pop(key);
        }
        debug!(prefix, removed = matching.len(), "cache entries invalidated");
        matching.len()
    }

    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
