use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::CacheConfig;
use crate::error::ServiceResult;
use crate::logging::{Logger, LoggerRegistry};

#[derive(Debug, Clone)]
struct CacheEntry {
    data: serde_json::Value,
    timestamp: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(data: serde_json::Value, ttl: Duration) -> Self {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            data,
            timestamp: now,
            expires_at,
        }
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Serialises loads of one key. `generation` moves whenever the key is
/// written or invalidated while a load is running.
#[derive(Default)]
struct LoadGate {
    lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub loads: u64,
    pub current_size: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// In-memory keyed store with per-entry expiry.
///
/// Expiry is lazy: `get` evicts an entry it finds expired under the same lock
/// as the read, so an expired value is never returned. `cleanup` purges
/// everything expired at once.
///
/// Lock order is `entries` before `in_flight`.
#[derive(Clone)]
pub struct CacheService {
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    in_flight: Arc<Mutex<HashMap<String, Arc<LoadGate>>>>,
    stats: Arc<Mutex<CacheStats>>,
    default_ttl: Duration,
    logger: Logger,
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("size", &self.entries.lock().len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl CacheService {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_default_ttl(config.default_ttl())
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
            default_ttl,
            logger: LoggerRegistry::default().logger("cache"),
        }
    }

    /// Routes cache diagnostics through `logger` and its registry threshold.
    pub fn with_logger(self, logger: Logger) -> Self {
        Self { logger, ..self }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let mut entries = self.entries.lock();

        let Some(entry) = entries.get(key) else {
            self.stats.lock().misses += 1;
            self.logger.debug_with("Cache miss", &key);
            return None;
        };

        if entry.is_expired_at(Utc::now()) {
            entries.remove(key);
            let mut stats = self.stats.lock();
            stats.misses += 1;
            stats.expirations += 1;
            self.logger.debug_with("Cache entry expired", &key);
            return None;
        }

        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => {
                self.stats.lock().hits += 1;
                self.logger.debug_with(
                    "Cache hit",
                    &serde_json::json!({
                        "key": key,
                        "ageMs": (Utc::now() - entry.timestamp).num_milliseconds(),
                    }),
                );
                Some(value)
            }
            Err(e) => {
                self.logger.warn_with(
                    "Failed to deserialize cached value",
                    &serde_json::json!({ "key": key, "error": e.to_string() }),
                );
                entries.remove(key);
                self.stats.lock().misses += 1;
                None
            }
        }
    }

    pub fn set<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(value)?;
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), CacheEntry::new(data, ttl));
        self.bump_generations(|candidate| candidate == key);
        drop(entries);

        self.logger.debug_with(
            "Cached value",
            &serde_json::json!({ "key": key, "ttlMs": ttl.as_millis() as u64 }),
        );
        Ok(())
    }

    pub fn set_default<T>(&self, key: &str, value: &T) -> Result<(), serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        self.set(key, value, self.default_ttl)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get::<serde_json::Value>(key).is_some()
    }

    /// Removes `key`. A load of the same key already running will not
    /// cache its result.
    pub fn delete(&self, key: &str) -> bool {
        let mut entries = self.entries.lock();
        let removed = entries.remove(key).is_some();
        self.bump_generations(|candidate| candidate == key);
        drop(entries);

        if removed {
            self.logger.debug_with("Removed cache entry", &key);
        }
        removed
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.bump_generations(|_| true);
        drop(entries);

        self.logger.debug("Cleared all cache entries");
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        self.bump_generations(|key| key.starts_with(prefix));
        drop(entries);

        self.logger.debug_with(
            "Invalidated cache entries",
            &serde_json::json!({ "prefix": prefix, "removed": removed }),
        );
        removed
    }

    /// Number of live (unexpired) entries.
    pub fn size(&self) -> usize {
        let now = Utc::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Purges all expired entries and returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.lock().expirations += removed as u64;
        }
        self.logger
            .debug_with("Cleaned up expired cache entries", &removed);
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.current_size = self.size();
        stats
    }

    /// Returns the cached value or runs `load` to fill it.
    ///
    /// Concurrent callers missing on the same key wait for a single load and
    /// then read its cached result. Failed loads are returned to the caller
    /// that ran them and are not cached. A load that overlaps a `set`,
    /// `delete`, `clear` or `invalidate_prefix` of its key returns its value
    /// without caching it.
    pub async fn get_or_load<T, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> ServiceResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ServiceResult<T>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let gate = Arc::clone(
            self.in_flight
                .lock()
                .entry(key.to_string())
                .or_default(),
        );

        let result = {
            let _guard = gate.lock.lock().await;

            if let Some(value) = self.get(key) {
                self.logger
                    .debug_with("Coalesced load served from cache", &key);
                Ok(value)
            } else {
                self.stats.lock().loads += 1;
                let generation = gate.generation.load(Ordering::SeqCst);
                let loaded = load().await;
                if let Ok(value) = &loaded {
                    self.store_loaded(key, value, ttl, &gate, generation);
                }
                loaded
            }
        };

        let mut in_flight = self.in_flight.lock();
        drop(gate);
        // Every clone is taken and dropped under this lock, so the map holds
        // the last reference once no caller is left.
        if in_flight
            .get(key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1)
        {
            in_flight.remove(key);
        }

        result
    }

    fn store_loaded<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        gate: &LoadGate,
        generation: u64,
    ) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                self.logger.warn_with(
                    "Failed to cache loaded value",
                    &serde_json::json!({ "key": key, "error": e.to_string() }),
                );
                return;
            }
        };

        let mut entries = self.entries.lock();
        if gate.generation.load(Ordering::SeqCst) != generation {
            drop(entries);
            self.logger
                .debug_with("Discarded load superseded by a write", &key);
            return;
        }
        entries.insert(key.to_string(), CacheEntry::new(data, ttl));
    }

    /// Caller holds the `entries` lock.
    fn bump_generations(&self, matches: impl Fn(&str) -> bool) {
        for (key, gate) in self.in_flight.lock().iter() {
            if matches(key) {
                gate.generation.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::logging::LogLevel;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_cache_basic_operations() {
        let cache = CacheService::default();

        cache.set_default("test_key", "test_value").unwrap();
        let value: Option<String> = cache.get("test_key");
        assert_eq!(value, Some("test_value".to_string()));

        let missing: Option<String> = cache.get("missing_key");
        assert_eq!(missing, None);

        assert!(cache.delete("test_key"));
        let removed: Option<String> = cache.get("test_key");
        assert_eq!(removed, None);
        assert!(!cache.delete("test_key"));
    }

    #[test]
    fn test_cache_ttl() {
        let cache = CacheService::default();

        cache.set("ttl_key", &"ttl_value", Duration::from_millis(50)).unwrap();
        assert_eq!(cache.get::<String>("ttl_key"), Some("ttl_value".to_string()));
        assert_eq!(cache.size(), 1);

        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.get::<String>("ttl_key"), None);
        assert!(!cache.has("ttl_key"));
        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let cache = CacheService::default();
        cache.set("k", &1u32, Duration::ZERO).unwrap();
        assert_eq!(cache.get::<u32>("k"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = CacheService::default();
        cache.set("k", &1u32, Duration::from_millis(10)).unwrap();
        cache.set("k", &2u32, Duration::from_secs(60)).unwrap();

        thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get::<u32>("k"), Some(2));
    }

    #[test]
    fn test_cleanup_purges_expired_only() {
        let cache = CacheService::default();
        cache.set("short", &"a", Duration::from_millis(10)).unwrap();
        cache.set("long", &"b", Duration::from_secs(60)).unwrap();

        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.cleanup(), 1);
        assert!(cache.has("long"));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_prefix_invalidation() {
        let cache = CacheService::default();

        cache.set_default("dashboard:metrics", &1).unwrap();
        cache.set_default("dashboard:trends:30", &2).unwrap();
        cache.set_default("brands", &3).unwrap();

        assert_eq!(cache.invalidate_prefix("dashboard:"), 2);
        assert!(!cache.has("dashboard:metrics"));
        assert!(cache.has("brands"));
    }

    #[test]
    fn test_cache_stats() {
        let cache = CacheService::default();

        cache.set_default("key1", "value1").unwrap();
        cache.set_default("key2", "value2").unwrap();

        let _: Option<String> = cache.get("key1");
        let _: Option<String> = cache.get("key1");
        let _: Option<String> = cache.get("missing");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_size, 2);
        assert!((stats.hit_rate() - 0.6666666666666666).abs() < 0.0001);
    }

    #[test]
    fn test_type_mismatch_evicts() {
        let cache = CacheService::default();
        cache.set_default("k", "not a number").unwrap();
        assert_eq!(cache.get::<u32>("k"), None);
        assert_eq!(cache.size(), 0);
    }

    #[tokio::test]
    async fn test_get_or_load_coalesces_concurrent_misses() {
        let cache = CacheService::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("shared", Duration::from_secs(60), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, ApiError>(42u32)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_load_does_not_cache_failures() {
        let cache = CacheService::default();

        let failed: ServiceResult<u32> = cache
            .get_or_load("k", Duration::from_secs(60), || async {
                Err(ApiError::network("offline"))
            })
            .await;
        assert!(failed.is_err());
        assert!(!cache.has("k"));

        let loaded = cache
            .get_or_load("k", Duration::from_secs(60), || async { Ok(7u32) })
            .await
            .unwrap();
        assert_eq!(loaded, 7);
        assert_eq!(cache.get::<u32>("k"), Some(7));
    }

    #[tokio::test]
    async fn test_in_flight_gates_released_after_failed_loads() {
        let cache = CacheService::default();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load("flaky", Duration::from_secs(60), || async {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Err::<u32, _>(ApiError::network("offline"))
                    })
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
        assert!(cache.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_delete_during_load_prevents_stale_refill() {
        let cache = CacheService::default();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load("brands", Duration::from_secs(60), || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, ApiError>(vec!["old".to_string()])
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.delete("brands");

        assert_eq!(reader.await.unwrap().unwrap(), vec!["old".to_string()]);
        assert!(!cache.has("brands"));

        let fresh = cache
            .get_or_load("brands", Duration::from_secs(60), || async {
                Ok::<_, ApiError>(vec!["new".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(fresh, vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_prefix_invalidation_during_load_prevents_stale_refill() {
        let cache = CacheService::default();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load("dashboard:metrics", Duration::from_secs(60), || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, ApiError>(1u32)
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.invalidate_prefix("dashboard:");

        assert_eq!(reader.await.unwrap().unwrap(), 1);
        assert!(!cache.has("dashboard:metrics"));
    }

    #[tokio::test]
    async fn test_set_during_load_wins() {
        let cache = CacheService::default();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_load("company", Duration::from_secs(60), || async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, ApiError>("loaded".to_string())
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.set_default("company", "seeded").unwrap();

        reader.await.unwrap().unwrap();
        assert_eq!(cache.get::<String>("company"), Some("seeded".to_string()));
    }

    #[test]
    fn test_with_logger_uses_registry_logger() {
        let registry = LoggerRegistry::new(LogLevel::Error);
        let cache = CacheService::default().with_logger(registry.logger("cache"));

        assert!(cache.logger().same_as(&registry.logger("cache")));
        assert!(!cache.logger().enabled(LogLevel::Debug));
    }
}
