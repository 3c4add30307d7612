//! In-memory TTL cache for assembled reports, with content-hash keys.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Compute content-hash key from a normalized request identifier.
pub fn key_for(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache key for a report: coin identifier plus the audit link it was rendered with.
pub fn report_key(coin_id: &str, audit_link: &str) -> String {
    key_for(&format!("coin:{}:{}", coin_id, audit_link))
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    generation: u64,
}

type Entries<V> = Arc<Mutex<HashMap<String, Entry<V>>>>;

/// Key/value store whose entries expire `ttl` after insertion.
///
/// Expired entries are never returned. Inserting inside a tokio runtime also
/// schedules a task that deletes the entry once its TTL has elapsed, unless it
/// was overwritten in the meantime. Concurrent writers to one key simply
/// overwrite each other.
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Entries<V>,
    next_generation: AtomicU64,
}

fn lock<V>(entries: &Mutex<HashMap<String, Entry<V>>>) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V: Clone + Send + 'static> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Look up `key` as of `now`; an expired entry is dropped and reported as a miss.
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut map = lock(&self.entries);
        let expired = now.saturating_duration_since(map.get(key)?.inserted_at) >= self.ttl;
        if expired {
            map.remove(key);
            return None;
        }
        map.get(key).map(|e| e.value.clone())
    }

    /// Store `value` and schedule its deletion after the TTL.
    pub fn insert(&self, key: String, value: V) {
        let generation = self.insert_at(key.clone(), value, Instant::now());
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let entries = Arc::clone(&self.entries);
        let ttl = self.ttl;
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut map = lock(&entries);
            if map.get(&key).is_some_and(|e| e.generation == generation) {
                map.remove(&key);
                debug!(key = %key, "cache entry expired");
            }
        });
    }

    /// Store `value` as inserted at `now`. Returns the entry's generation.
    pub fn insert_at(&self, key: String, value: V, now: Instant) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).insert(
            key,
            Entry {
                value,
                inserted_at: now,
                generation,
            },
        );
        generation
    }

    /// Drop every entry older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut map = lock(&self.entries);
        let before = map.len();
        map.retain(|_, e| now.saturating_duration_since(e.inserted_at) < self.ttl);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_deterministic() {
        let k1 = report_key("bitcoin", "");
        let k2 = report_key("bitcoin", "");
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 64);
        assert_ne!(k1, report_key("bitcoin", "https://audit.example/btc"));
    }

    #[test]
    fn get_insert_roundtrip() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert_at("k".into(), 7u32, Instant::now());
        assert_eq!(cache.get("k"), Some(7));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn expired_entries_are_never_returned() {
        let cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("k".into(), "v".to_string(), t0);
        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(9)).as_deref(), Some("v"));
        assert!(cache.get_at("k", t0 + Duration::from_secs(10)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn overwrite_replaces_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        let now = Instant::now();
        let g1 = cache.insert_at("k".into(), 1u8, now);
        let g2 = cache.insert_at("k".into(), 2u8, now);
        assert_ne!(g1, g2);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn purge_drops_only_expired() {
        let cache = TtlCache::new(Duration::from_secs(30));
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(60);
        cache.insert_at("old".into(), 1u8, t0);
        cache.insert_at("new".into(), 2u8, later);
        assert_eq!(cache.purge_expired_at(later), 1);
        assert_eq!(cache.get_at("new", later), Some(2));
    }

    #[tokio::test]
    async fn scheduled_eviction_removes_entry() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert("k".into(), 1u8);
        assert_eq!(cache.len(), 1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.len(), 0);
    }
}
