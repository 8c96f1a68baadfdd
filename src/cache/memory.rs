//! In-process cache on top of `cached::TimedSizedCache`.
//!
//! The store enforces the configured lifespan and size; entries written with
//! a shorter TTL also carry their own deadline, checked on read.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};

use crate::cache::{AppCache, CacheError};
use crate::config::settings::MemoryCacheConfig;

struct Entry {
    expires_at: Instant,
    bytes: Vec<u8>,
}

pub struct MemoryCache {
    store: Mutex<TimedSizedCache<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryCache {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let default_ttl = Duration::from_secs(config.ttl_seconds.max(1));
        let store = TimedSizedCache::with_size_and_lifespan(config.max_size.max(1), default_ttl);
        Self {
            store: Mutex::new(store),
            default_ttl,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, TimedSizedCache<String, Entry>>, CacheError> {
        self.store
            .lock()
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

#[async_trait]
impl AppCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut store = self.lock()?;
        let expired = match store.cache_get(key) {
            Some(entry) if entry.expires_at > Instant::now() => return Ok(Some(entry.bytes.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.cache_remove(key);
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        let ttl = ttl_seconds
            .map(Duration::from_secs)
            .map_or(self.default_ttl, |t| t.min(self.default_ttl));
        let mut store = self.lock()?;
        store.cache_set(
            key.to_string(),
            Entry {
                expires_at: Instant::now() + ttl,
                bytes: value,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.lock()?.cache_remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.lock()?.cache_clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max_size: usize) -> MemoryCache {
        MemoryCache::new(&MemoryCacheConfig {
            max_size,
            ttl_seconds: 60,
        })
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let cache = cache(10);
        cache.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

        cache.remove("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = cache(10);
        cache.set("k", b"v".to_vec(), Some(0)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_size_limit_evicts() {
        let cache = cache(2);
        for key in ["a", "b", "c"] {
            cache.set(key, key.as_bytes().to_vec(), None).await.unwrap();
        }
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = cache(10);
        cache.set("a", vec![1], None).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.get("a").await.unwrap(), None);
    }
}
