//! Runtime logger configuration.
//!
//! These types are produced from `config::settings::LoggerSettings` and consumed
//! by [`crate::logger::init_logger`].

use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

use crate::logger::error::LoggerError;

const VALID_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Either a bare level (`info`) or a full `EnvFilter` directive
    /// (`inkdesk=debug,tower_http=info`).
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl LoggerConfig {
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self, LoggerError> {
        let config = Self {
            level,
            console,
            file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config(
                "at least one output (console or file) must be enabled",
            ));
        }
        if self.level.trim().is_empty() {
            return Err(LoggerError::config("log level cannot be empty"));
        }
        self.file.validate()
    }

    /// Parses `level` when it is a bare level name.
    ///
    /// Directive strings return `None`; they are handed to `EnvFilter` as-is.
    pub fn parse_level(&self) -> Option<Level> {
        let lower = self.level.to_lowercase();
        if VALID_LEVELS.contains(&lower.as_str()) {
            lower.parse().ok()
        } else {
            None
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
    pub rotation: RotationConfig,
}

impl FileConfig {
    pub fn new(
        enabled: bool,
        path: PathBuf,
        append: bool,
        format: LogFormat,
        rotation: RotationConfig,
    ) -> Result<Self, LoggerError> {
        let config = Self {
            enabled,
            path,
            append,
            format,
            rotation,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.enabled && self.path.as_os_str().is_empty() {
            return Err(LoggerError::config("file path is required when file output is enabled"));
        }
        self.rotation.validate()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/inkdesk.log"),
            append: true,
            format: LogFormat::default(),
            rotation: RotationConfig::default(),
        }
    }
}

/// Output format of the file layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Full,
    Compact,
    #[default]
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(LoggerError::format(format!(
                "invalid log format '{}', expected full, compact or json",
                other
            ))),
        }
    }
}

/// When the active log file is rolled over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    #[default]
    Size,
    Daily,
    /// Size or day change, whichever comes first
    SizeOrDaily,
    Never,
}

impl FromStr for RotationStrategy {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "size" => Ok(RotationStrategy::Size),
            "daily" | "time" => Ok(RotationStrategy::Daily),
            "combined" | "size_or_daily" => Ok(RotationStrategy::SizeOrDaily),
            "never" | "none" => Ok(RotationStrategy::Never),
            other => Err(LoggerError::rotation(format!(
                "invalid rotation strategy '{}', expected size, daily, combined or never",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    pub strategy: RotationStrategy,
    /// Bytes written before a size rotation
    pub max_size: u64,
    /// Rotated files kept next to the active one
    pub max_files: usize,
    pub compress: bool,
}

impl RotationConfig {
    pub fn new(
        strategy: RotationStrategy,
        max_size: u64,
        max_files: usize,
        compress: bool,
    ) -> Result<Self, LoggerError> {
        let config = Self {
            strategy,
            max_size,
            max_files,
            compress,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        let by_size = matches!(
            self.strategy,
            RotationStrategy::Size | RotationStrategy::SizeOrDaily
        );
        if by_size && self.max_size == 0 {
            return Err(LoggerError::rotation("max_size must be greater than 0"));
        }
        if self.strategy != RotationStrategy::Never && self.max_files == 0 {
            return Err(LoggerError::rotation("max_files must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Size,
            max_size: 10 * 1024 * 1024,
            max_files: 5,
            compress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LoggerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_no_outputs_is_rejected() {
        let config = LoggerConfig {
            console: ConsoleConfig::new(false, false),
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_level_only_for_bare_levels() {
        let mut config = LoggerConfig::default();
        config.level = "DEBUG".to_string();
        assert_eq!(config.parse_level(), Some(Level::DEBUG));

        config.level = "inkdesk=debug,tower_http=warn".to_string();
        assert_eq!(config.parse_level(), None);
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_rotation_strategy_aliases() {
        assert_eq!("time".parse::<RotationStrategy>().unwrap(), RotationStrategy::Daily);
        assert_eq!(
            "combined".parse::<RotationStrategy>().unwrap(),
            RotationStrategy::SizeOrDaily
        );
        assert!("weekly".parse::<RotationStrategy>().is_err());
    }

    #[test]
    fn test_rotation_zero_size_rejected_for_size_strategy() {
        assert!(RotationConfig::new(RotationStrategy::Size, 0, 3, false).is_err());
        assert!(RotationConfig::new(RotationStrategy::Daily, 0, 3, false).is_ok());
        assert!(RotationConfig::new(RotationStrategy::Never, 0, 0, false).is_ok());
    }

    #[test]
    fn test_enabled_file_requires_path() {
        let result = FileConfig::new(
            true,
            PathBuf::new(),
            true,
            LogFormat::Full,
            RotationConfig::default(),
        );
        assert!(result.is_err());
    }
}
