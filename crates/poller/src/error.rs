//! Error types for the poller crate.

use thiserror::Error;

/// Result type alias for poller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Poller error types.
///
/// "Resource not found" is deliberately absent: a refresher reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid predicate configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The refresh round trip did not complete.
    #[error("transport failure refreshing '{id}': {reason}")]
    Transport { id: String, reason: String },

    /// The refresher answered with a different resource.
    #[error("refresh of '{expected}' returned resource '{actual}'")]
    IdentityMismatch { expected: String, actual: String },

    /// Error from the core crate.
    #[error(transparent)]
    Core(#[from] converge_core::Error),
}

impl Error {
    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an identity mismatch error.
    pub fn identity_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether this is a configuration error, fatal at construction.
    pub const fn is_config(&self) -> bool {
        match self {
            Self::InvalidConfig { .. } => true,
            Self::Core(e) => e.is_config(),
            Self::Transport { .. } | Self::IdentityMismatch { .. } => false,
        }
    }

    /// Whether this error leaves the resource's state unknown.
    pub const fn is_inconclusive(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::IdentityMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transport("node-1", "connection reset");
        assert!(err.to_string().contains("node-1"));
        assert!(err.to_string().contains("connection reset"));
        assert!(err.is_inconclusive());
        assert!(!err.is_config());
    }

    #[test]
    fn test_core_config_error_is_config() {
        let err = Error::from(converge_core::Error::invalid_config("bad target"));
        assert!(err.is_config());
        assert!(err.to_string().contains("bad target"));
    }
}
