use async_trait::async_trait;

use crate::cache::CacheError;

/// Byte-oriented key/value store behind [`CacheManager`](crate::cache::CacheManager).
///
/// Values are opaque; `app_cached!` stores JSON. Keys arrive already
/// namespaced where the backend is shared between processes.
#[async_trait]
pub trait AppCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// `ttl_seconds` overrides the backend's configured TTL.
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError>;

    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Drops every entry this process can see (the namespace, for redis).
    async fn clear(&self) -> Result<(), CacheError>;
}
