use async_trait::async_trait;

use crate::cache::{AppCache, CacheError};

/// Selected when `cache.enabled = false`: every read misses, every write is dropped.
#[derive(Debug, Default)]
pub struct NoOpCache;

#[async_trait]
impl AppCache for NoOpCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _: &str, _: Vec<u8>, _: Option<u64>) -> Result<(), CacheError> {
        Ok(())
    }

    async fn remove(&self, _: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_are_never_visible() {
        let cache = NoOpCache;
        cache.set("analytics:user_overview", b"{}".to_vec(), Some(60)).await.unwrap();
        assert!(cache.get("analytics:user_overview").await.unwrap().is_none());
    }
}
