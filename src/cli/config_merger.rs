//! Applies command-line overrides on top of file and environment configuration.
//!
//! Precedence, highest first: command flags, `INKDESK_*` variables,
//! `--config` file or the layered `config/` directory.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Environment, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads the unvalidated base configuration selected by `--config` and `--env`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new();
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        if let Some(path) = &cli.config {
            loader = loader.with_file(path);
        }

        let environment = loader.environment();
        let base_config = loader.load_unvalidated()?;
        Ok(Self::new(base_config, environment))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the base configuration with CLI overrides applied, validated
    /// for the command about to run.
    ///
    /// `migrate` only needs the database and logger sections, so a missing
    /// JWT secret does not block it.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if let Some(level) = cli.log_level_override() {
            config.logger.level = level.to_string();
        }

        match &cli.command {
            Some(Commands::Serve { host, port, .. }) => {
                if let Some(host) = host {
                    config.server.host = host.clone();
                }
                if let Some(port) = port {
                    config.server.port = *port;
                }
                config.validate()?;
            }
            None => config.validate()?,
            Some(Commands::Migrate { .. }) => {
                config.database.validate()?;
                config.logger.validate()?;
            }
        }

        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn valid_base_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/inkdesk".to_string();
        config.jwt.secret = "x".repeat(32);
        config
    }

    fn merge(base: Settings, args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(base, Environment::Test).merge_cli_args(&cli)
    }

    #[test]
    fn test_verbose_and_quiet_flags() {
        let merged = merge(valid_base_config(), &["inkdesk", "--verbose"]).unwrap();
        assert_eq!(merged.logger.level, "debug");

        let merged = merge(valid_base_config(), &["inkdesk", "--quiet"]).unwrap();
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn test_serve_host_and_port() {
        let merged = merge(
            valid_base_config(),
            &["inkdesk", "serve", "--host", "0.0.0.0", "--port", "8080"],
        )
        .unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_serve_requires_jwt_secret() {
        let mut base = valid_base_config();
        base.jwt.secret.clear();
        let err = merge(base, &["inkdesk", "serve"]).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "jwt.secret"));
    }

    #[test]
    fn test_migrate_skips_jwt_validation() {
        let mut base = valid_base_config();
        base.jwt.secret.clear();
        assert!(merge(base, &["inkdesk", "migrate", "--dry-run"]).is_ok());
    }

    #[test]
    fn test_from_cli_reads_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[publish]
simulated_delay_ms = 10

[database]
url = "postgres://localhost/from_file"

[jwt]
secret = "{}"
"#,
            "s".repeat(40)
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["inkdesk", "--config", path, "--env", "test", "serve"]).unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.environment(), Environment::Test);
        assert_eq!(merger.config().publish.simulated_delay_ms, 10);

        let merged = merger.merge_cli_args(&cli).unwrap();
        assert_eq!(merged.database.url, "postgres://localhost/from_file");
    }
}
