use thiserror::Error;

/// Raised while building the subscriber; never after logging has started.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid logger settings: {message}")]
    Config { message: String },

    #[error("invalid log rotation: {message}")]
    Rotation { message: String },

    #[error("unknown log format: {message}")]
    Format { message: String },
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn rotation(message: impl Into<String>) -> Self {
        Self::Rotation { message: message.into() }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format { message: message.into() }
    }
}
