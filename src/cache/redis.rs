//! Redis cache backed by a bb8 pool.

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::{AppCache, CacheError};
use crate::config::settings::RedisCacheConfig;

type RedisPool = Pool<Client>;

pub struct RedisCache {
    pool: RedisPool,
    key_prefix: String,
    default_ttl: u64,
}

impl RedisCache {
    pub async fn new(config: &RedisCacheConfig, namespace: &str) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(std::time::Duration::from_secs(config.connection_timeout))
            .build(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            key_prefix: format!("{}:{}", config.key_prefix, namespace),
            default_ttl: config.ttl_seconds,
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

fn op_err(e: RedisError) -> CacheError {
    CacheError::Operation(e.to_string())
}

#[async_trait]
impl AppCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn().await?;
        let conn: &mut MultiplexedConnection = &mut conn;
        conn.get(self.prefixed_key(key)).await.map_err(op_err)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl).max(1);
        let mut conn = self.conn().await?;
        let conn: &mut MultiplexedConnection = &mut conn;
        conn.set_ex::<_, _, ()>(self.prefixed_key(key), value, ttl)
            .await
            .map_err(op_err)
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let conn: &mut MultiplexedConnection = &mut conn;
        conn.del::<_, ()>(self.prefixed_key(key)).await.map_err(op_err)
    }

    /// Deletes every key under this cache's prefix, walking with SCAN.
    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let conn: &mut MultiplexedConnection = &mut conn;
        let pattern = format!("{}:*", self.key_prefix);

        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut *conn)
                .await
                .map_err(op_err)?;
            if !keys.is_empty() {
                conn.del::<_, ()>(keys).await.map_err(op_err)?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }
}
