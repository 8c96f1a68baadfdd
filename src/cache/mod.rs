//! Response cache for read-heavy reports.
//!
//! Two backends sit behind [`AppCache`]: an in-process memory store and
//! Redis. With `cache.enabled = false` every lookup misses.
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"  # or "redis"
//!
//! [cache.memory]
//! max_size = 1000
//! ttl_seconds = 300
//!
//! [cache.redis]
//! url = "redis://127.0.0.1:6379"
//! ttl_seconds = 300
//! pool_size = 4
//! connection_timeout = 5
//! key_prefix = "inkdesk"
//! ```
//!
//! Cached functions are declared with [`app_cached!`](crate::app_cached).

mod error;
#[macro_use]
mod macros;
mod manager;
mod memory;
mod noop;
mod redis;
mod traits;

pub use error::CacheError;
pub use manager::{CacheManager, get_cache, init_cache};
pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use traits::AppCache;

pub use crate::config::settings::{
    CacheBackend, CacheConfig, MemoryCacheConfig, RedisCacheConfig,
};
