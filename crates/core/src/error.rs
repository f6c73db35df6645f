//! Core error types for converge.
//!
//! All errors are explicit and typed. Configuration problems surface here
//! so they are caught before any polling starts.

use thiserror::Error;

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("TOML parse error: {reason}")]
    ConfigParseFailed { reason: String },

    #[error("unknown status '{value}'")]
    UnknownStatus { value: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a config parse error.
    pub fn config_parse_failed(reason: impl Into<String>) -> Self {
        Self::ConfigParseFailed {
            reason: reason.into(),
        }
    }

    /// Create an unknown status error.
    pub fn unknown_status(value: impl Into<String>) -> Self {
        Self::UnknownStatus {
            value: value.into(),
        }
    }

    /// Whether this error is a configuration problem (as opposed to I/O).
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. } | Self::ConfigParseFailed { .. } | Self::UnknownStatus { .. }
        )
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = Error::invalid_config("target RUNNING is also invalid");
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("RUNNING"));
        assert!(err.is_config());
    }

    #[test]
    fn test_io_is_not_config() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_config());
    }
}
