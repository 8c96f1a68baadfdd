//! Read-through caching for async functions returning `Result`.

/// Wraps an async function with a JSON-encoded read-through cache.
///
/// ```ignore
/// app_cached! {
///     name = "user_overview",
///     ttl = ttl_seconds,
///     key = |active_days: &i64| active_days,
///     async fn cached_user_overview(cache: &CacheManager, ttl_seconds: u64, active_days: i64)
///         -> AppResult<UserOverview>
///     {
///         build_overview(active_days).await
///     }
/// }
/// ```
///
/// `ttl` may name any of the function's arguments. The key closure borrows
/// the listed arguments and its result is prefixed with `name`. Cache
/// failures never fail the call; they fall through to the body.
#[macro_export]
macro_rules! app_cached {
    (
        name = $cache_name:literal,
        $(ttl = $ttl:expr,)?
        key = |$($key_arg:ident : $key_ty:ty),* $(,)?| $key_expr:expr,
        $vis:vis async fn $fn_name:ident($cache_param:ident : &CacheManager $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret_ty:ty $body:block
    ) => {
        $vis async fn $fn_name(
            $cache_param: &$crate::cache::CacheManager,
            $($arg: $arg_ty),*
        ) -> $ret_ty {
            let cache_key = {
                $(let $key_arg: $key_ty = &$key_arg;)*
                format!("{}:{}", $cache_name, $key_expr)
            };

            if let Ok(Some(bytes)) = $cache_param.get(&cache_key).await
                && let Ok(value) = serde_json::from_slice(&bytes)
            {
                tracing::debug!(key = %cache_key, "Cache hit");
                return Ok(value);
            }

            let result: $ret_ty = async $body.await;

            if let Ok(value) = &result
                && let Ok(bytes) = serde_json::to_vec(value)
            {
                let ttl = $crate::app_cached!(@ttl $($ttl)?);
                if let Err(e) = $cache_param.set(&cache_key, bytes, ttl).await {
                    tracing::warn!(key = %cache_key, error = %e, "Cache write failed");
                }
            }

            result
        }
    };

    (@ttl) => { None };
    (@ttl $ttl:expr) => { Some($ttl) };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::cache::{CacheConfig, CacheManager, MemoryCache, MemoryCacheConfig};
    use crate::error::{AppError, AppResult};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    app_cached! {
        name = "double",
        ttl = ttl_seconds,
        key = |n: &i64| n,
        async fn cached_double(cache: &CacheManager, ttl_seconds: u64, n: i64) -> AppResult<i64> {
            CALLS.fetch_add(1, Ordering::SeqCst);
            if n < 0 {
                return Err(AppError::bad_request("negative"));
            }
            Ok(n * 2)
        }
    }

    fn manager() -> CacheManager {
        let config = CacheConfig {
            enabled: true,
            ..CacheConfig::default()
        };
        let backend = Arc::new(MemoryCache::new(&MemoryCacheConfig {
            max_size: 8,
            ttl_seconds: 60,
        }));
        CacheManager::with_backend(backend, config)
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache_and_errors_not_cached() {
        let cache = manager();
        let before = CALLS.load(Ordering::SeqCst);

        assert_eq!(cached_double(&cache, 60, 21).await.unwrap(), 42);
        assert_eq!(cached_double(&cache, 60, 21).await.unwrap(), 42);
        assert_eq!(CALLS.load(Ordering::SeqCst) - before, 1);

        assert!(cached_double(&cache, 60, -1).await.is_err());
        assert!(cached_double(&cache, 60, -1).await.is_err());
        assert_eq!(CALLS.load(Ordering::SeqCst) - before, 3);
    }
}
