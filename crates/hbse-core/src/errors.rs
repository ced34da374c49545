//! Error types for HBSE.

use thiserror::Error;

/// Unified error type for all HBSE operations.
///
/// Provides structured, actionable error messages with context.
#[derive(Error, Debug)]
pub enum HbseError {
    /// Configuration errors (missing key, unparseable value, bad range)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input validation errors (edge lists, pivot ids, graph shape)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Coordinator state machine errors (unknown or corrupted phase value)
    #[error("Invalid coordinator state: {0}")]
    StateError(String),

    /// I/O errors (graph loading, result and stats writing)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic errors (fallback)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HbseError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        HbseError::ConfigError(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        HbseError::ValidationError(message.into())
    }

    /// Creates a state machine error.
    pub fn state(message: impl Into<String>) -> Self {
        HbseError::StateError(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        HbseError::Internal(message.into())
    }

    /// Checks whether this error is fatal to the whole run.
    ///
    /// Every error reachable from the coordinator is fatal: the run's
    /// product is the persisted result, so there is no degraded mode.
    /// The distinction exists for callers that embed the engine and want
    /// to report configuration problems separately from runtime failures.
    pub fn is_config(&self) -> bool {
        matches!(self, HbseError::ConfigError(_))
    }
}

/// Result type alias for HBSE operations.
pub type Result<T> = std::result::Result<T, HbseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let config_err = HbseError::config("vertex.count must be set");
        assert!(matches!(config_err, HbseError::ConfigError(_)));
        assert!(config_err.is_config());

        let state_err = HbseError::state("ordinal 42 out of range");
        assert!(matches!(state_err, HbseError::StateError(_)));
        assert!(!state_err.is_config());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: HbseError = io.into();
        assert!(matches!(err, HbseError::IoError(_)));
    }
}
