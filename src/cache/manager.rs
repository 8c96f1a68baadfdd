//! Dispatches cache calls to the configured backend.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::redis::RedisCache;
use crate::cache::{AppCache, CacheError};
use crate::config::settings::{CacheBackend, CacheConfig};

static CACHE: OnceCell<CacheManager> = OnceCell::const_new();

/// Builds the process-wide manager on first call; later calls return it.
pub async fn init_cache(
    config: CacheConfig,
    namespace: &str,
) -> Result<&'static CacheManager, CacheError> {
    CACHE
        .get_or_try_init(|| async { CacheManager::new(config, namespace).await })
        .await
}

pub fn get_cache() -> Option<&'static CacheManager> {
    CACHE.get()
}

#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn AppCache>,
    config: CacheConfig,
}

impl CacheManager {
    pub async fn new(config: CacheConfig, namespace: &str) -> Result<Self, CacheError> {
        let backend: Arc<dyn AppCache> = if !config.enabled {
            Arc::new(NoOpCache)
        } else {
            match config.backend {
                CacheBackend::Memory => Arc::new(MemoryCache::new(&config.memory)),
                CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis, namespace).await?),
            }
        };

        info!(
            enabled = config.enabled,
            backend = ?config.backend,
            namespace,
            "Cache initialized"
        );

        Ok(Self { backend, config })
    }

    /// Manager over an arbitrary backend, used by tests.
    pub fn with_backend(backend: Arc<dyn AppCache>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    pub async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl_seconds).await
    }

    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.backend.remove(key).await
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.backend.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::MemoryCacheConfig;

    fn memory_config(enabled: bool) -> CacheConfig {
        CacheConfig {
            enabled,
            backend: CacheBackend::Memory,
            memory: MemoryCacheConfig {
                max_size: 16,
                ttl_seconds: 60,
            },
            ..CacheConfig::default()
        }
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let manager = CacheManager::new(memory_config(false), "test").await.unwrap();
        assert!(!manager.is_enabled());
        manager.set("k", vec![1], None).await.unwrap();
        assert_eq!(manager.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_backend_round_trip() {
        let manager = CacheManager::new(memory_config(true), "test").await.unwrap();
        manager.set("k", vec![1, 2], Some(30)).await.unwrap();
        assert_eq!(manager.get("k").await.unwrap(), Some(vec![1, 2]));
        manager.clear().await.unwrap();
        assert_eq!(manager.get("k").await.unwrap(), None);
    }
}
