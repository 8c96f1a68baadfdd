//! Layered configuration: `config/default.toml`, then `config/{env}.toml`,
//! then `config/local.toml`, then `INKDESK_*` environment variables.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    AnalyticsConfig, BillingConfig, CacheBackend, CacheConfig, CreditsConfig, DatabaseConfig,
    InvitationConfig, JobDefinition, JobsConfig, JwtConfig, LoggerSettings, PublishConfig,
    ServerConfig, Settings,
};
