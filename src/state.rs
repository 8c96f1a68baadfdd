//! Application state shared by every handler.

use std::sync::Arc;

use crate::cache::CacheManager;
use crate::config::Settings;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;
use crate::utils::jwt::TokenIssuer;

/// Cloning is cheap: services hold pooled handles and the settings are
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Direct pool access for health checks
    pub db_pool: AsyncDbPool,
    pub cache: CacheManager,
    /// Validates bearer tokens in the auth middleware
    pub tokens: TokenIssuer,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wires repositories and services over `pool`.
    pub fn new(pool: AsyncDbPool, cache: CacheManager, settings: Arc<Settings>) -> Self {
        let tokens = TokenIssuer::from_config(&settings.jwt);
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, tokens.clone(), cache.clone(), &settings);
        Self {
            services,
            db_pool: pool,
            cache,
            tokens,
            settings,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use diesel_async::AsyncPgConnection;
    use diesel_async::pooled_connection::AsyncDieselConnectionManager;
    use diesel_async::pooled_connection::bb8::Pool;

    use super::AppState;
    use crate::cache::{CacheConfig, CacheManager, NoOpCache};
    use crate::config::Settings;

    pub const TEST_JWT_SECRET: &str = "unit-test-secret-with-at-least-32-chars";

    /// State over a pool that never connects. Only paths that finish before
    /// touching the database can be exercised with it.
    pub fn offline_state() -> AppState {
        let mut settings = Settings::default();
        settings.jwt.secret = TEST_JWT_SECRET.to_string();
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(
            "postgres://nobody@127.0.0.1:1/none",
        );
        let pool = Pool::builder().build_unchecked(manager);
        let cache = CacheManager::with_backend(Arc::new(NoOpCache), CacheConfig::default());
        AppState::new(pool, cache, Arc::new(settings))
    }
}
