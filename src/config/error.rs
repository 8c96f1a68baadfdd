use thiserror::Error;

/// Failures while locating, parsing or checking settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file missing: {0}")]
    FileNotFound(String),

    #[error("invalid configuration syntax: {0}")]
    ParseError(String),

    #[error("invalid setting {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("bad environment variable: {0}")]
    EnvVarError(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound(path.into())
    }
}
