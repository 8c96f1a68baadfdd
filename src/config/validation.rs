//! Range and consistency checks run after loading.

use crate::config::error::ConfigError;
use crate::config::settings::{
    AnalyticsConfig, CacheBackend, CacheConfig, CreditsConfig, DatabaseConfig, InvitationConfig,
    JobsConfig, JwtConfig, LoggerSettings, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_ROTATION_STRATEGIES: &[&str] =
    &["size", "daily", "time", "combined", "size_or_daily", "never", "none"];

const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535.",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set database.url or INKDESK_DATABASE__URL.",
            ));
        }
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(ConfigError::validation(
                "database.url",
                "Expected a PostgreSQL URL: postgres://[user:password@]host[:port]/database",
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }
        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("JWT secret must be at least {} characters.", MIN_JWT_SECRET_LEN),
            ));
        }
        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive.",
            ));
        }
        if self.access_token_expiration >= self.refresh_token_expiration {
            return Err(ConfigError::validation(
                "jwt.refresh_token_expiration",
                "Refresh tokens must outlive access tokens.",
            ));
        }
        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Directive strings such as "inkdesk=debug,tower_http=info" are passed
        // to EnvFilter unchecked.
        let is_directive = self.level.contains('=') || self.level.contains(',');
        if !is_directive && !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one of logger.console or logger.file must be enabled.",
            ));
        }
        if self.file.enabled && self.file.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }
        if !VALID_LOG_FORMATS.contains(&self.file.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!("Valid formats are: {}", VALID_LOG_FORMATS.join(", ")),
            ));
        }
        let strategy = self.file.rotation.strategy.to_lowercase();
        if !VALID_ROTATION_STRATEGIES.contains(&strategy.as_str()) {
            return Err(ConfigError::validation(
                "logger.file.rotation.strategy",
                format!(
                    "Invalid rotation strategy '{}'. Valid strategies are: size, daily, combined, never",
                    self.file.rotation.strategy
                ),
            ));
        }
        Ok(())
    }
}

impl JobsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.job_timeout == 0 {
            return Err(ConfigError::validation(
                "jobs.job_timeout",
                "Job timeout must be greater than 0 seconds.",
            ));
        }
        if self.retry_backoff_multiplier < 1.0 {
            return Err(ConfigError::validation(
                "jobs.retry_backoff_multiplier",
                "Backoff multiplier must be at least 1.0.",
            ));
        }
        let mut names = std::collections::HashSet::new();
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(ConfigError::validation("jobs.tasks.name", "Job name cannot be empty."));
            }
            if !names.insert(task.name.as_str()) {
                return Err(ConfigError::validation(
                    "jobs.tasks.name",
                    format!("Duplicate job name '{}'.", task.name),
                ));
            }
            if task.cron.split_whitespace().count() < 6 {
                return Err(ConfigError::validation(
                    "jobs.tasks.cron",
                    format!(
                        "Job '{}' needs a six-field cron expression (sec min hour day month weekday).",
                        task.name
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        match self.backend {
            CacheBackend::Memory if self.memory.max_size == 0 => Err(ConfigError::validation(
                "cache.memory.max_size",
                "Memory cache size must be greater than 0.",
            )),
            CacheBackend::Redis if !self.redis.url.starts_with("redis") => {
                Err(ConfigError::validation(
                    "cache.redis.url",
                    "Expected a redis:// or rediss:// URL.",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl CreditsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial < 0 {
            return Err(ConfigError::validation(
                "credits.initial",
                "Initial credits cannot be negative.",
            ));
        }
        Ok(())
    }
}

impl InvitationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.commission_rate) {
            return Err(ConfigError::validation(
                "invitation.commission_rate",
                "Commission rate must be between 0 and 1.",
            ));
        }
        if self.reward_credits < 0 {
            return Err(ConfigError::validation(
                "invitation.reward_credits",
                "Reward credits cannot be negative.",
            ));
        }
        if self.code_max_attempts == 0 {
            return Err(ConfigError::validation(
                "invitation.code_max_attempts",
                "At least one attempt is required.",
            ));
        }
        Ok(())
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credit_unit_cost < 0.0 {
            return Err(ConfigError::validation(
                "analytics.credit_unit_cost",
                "Credit unit cost cannot be negative.",
            ));
        }
        if self.active_window_days <= 0 {
            return Err(ConfigError::validation(
                "analytics.active_window_days",
                "Active window must be at least one day.",
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Validates every section and returns the first error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        self.jobs.validate()?;
        self.cache.validate()?;
        self.credits.validate()?;
        self.invitation.validate()?;
        self.analytics.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::JobDefinition;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/inkdesk".to_string();
        settings.jwt.secret = "x".repeat(32);
        settings
    }

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert_eq!(field_of(settings.validate().unwrap_err()), "server.port");
    }

    #[test]
    fn test_database_url_required_and_postgres_only() {
        let mut settings = valid_settings();
        settings.database.url.clear();
        assert_eq!(field_of(settings.validate().unwrap_err()), "database.url");

        settings.database.url = "mysql://localhost/db".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "database.url");
    }

    #[test]
    fn test_min_connections_cannot_exceed_max() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        settings.database.max_connections = 5;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "database.min_connections"
        );
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut settings = valid_settings();
        settings.jwt.secret = "short".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "jwt.secret");
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut settings = valid_settings();
        settings.jwt.access_token_expiration = 200;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "jwt.refresh_token_expiration"
        );
    }

    #[test]
    fn test_logger_accepts_directives() {
        let mut settings = valid_settings();
        settings.logger.level = "inkdesk=debug,tower_http=warn".to_string();
        assert!(settings.validate().is_ok());

        settings.logger.level = "loud".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "logger.level");
    }

    #[test]
    fn test_commission_rate_bounds() {
        let mut settings = valid_settings();
        settings.invitation.commission_rate = 1.5;
        assert_eq!(
            field_of(settings.validate().unwrap_err()),
            "invitation.commission_rate"
        );
        settings.invitation.commission_rate = 1.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_negative_initial_credits_rejected() {
        let mut settings = valid_settings();
        settings.credits.initial = -1;
        assert_eq!(field_of(settings.validate().unwrap_err()), "credits.initial");
    }

    #[test]
    fn test_jobs_reject_duplicate_names_and_short_cron() {
        let job = |name: &str, cron: &str| JobDefinition {
            name: name.to_string(),
            task_type: "close_expired_trades".to_string(),
            cron: cron.to_string(),
            payload: serde_json::json!({}),
            enabled: true,
        };

        let mut settings = valid_settings();
        settings.jobs.tasks = vec![job("a", "0 * * * * *"), job("a", "0 * * * * *")];
        assert_eq!(field_of(settings.validate().unwrap_err()), "jobs.tasks.name");

        settings.jobs.tasks = vec![job("a", "* * * * *")];
        assert_eq!(field_of(settings.validate().unwrap_err()), "jobs.tasks.cron");
    }

    #[test]
    fn test_disabled_cache_is_not_checked() {
        let mut settings = valid_settings();
        settings.cache.backend = CacheBackend::Redis;
        settings.cache.redis.url = "nope".to_string();
        assert!(settings.validate().is_ok());

        settings.cache.enabled = true;
        assert_eq!(field_of(settings.validate().unwrap_err()), "cache.redis.url");
    }
}
