//! Unified error hierarchy for HealthIntel
//!
//! Insufficient data is never an error here: it is represented by empty
//! results or neutral scores. Errors only describe failing collaborators
//! (the record store, the text generator) and invalid caller input.

use thiserror::Error;

/// Top-level error type for all HealthIntel operations
#[derive(Debug, Error)]
pub enum HealthIntelError {
    /// Record store errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// External text generation errors
    #[error("Text generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Caller supplied an invalid value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Record store errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Underlying SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Failures of the external text-generation capability
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No generator configured
    #[error("No text generator configured")]
    NotConfigured,

    /// Request could not be delivered
    #[error("Request to {provider} failed: {reason}")]
    Transport { provider: String, reason: String },

    /// Provider answered with a non-success status
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// Response body was not usable
    #[error("Malformed response from {provider}: {reason}")]
    MalformedResponse { provider: String, reason: String },

    /// Call did not complete within the configured bound
    #[error("Text generation timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Result type alias for HealthIntel operations
pub type Result<T> = std::result::Result<T, HealthIntelError>;

impl From<rusqlite::Error> for HealthIntelError {
    fn from(err: rusqlite::Error) -> Self {
        HealthIntelError::Database(DatabaseError::Sqlite(err))
    }
}

impl HealthIntelError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HealthIntelError::Validation(_) => ErrorSeverity::Warning,
            HealthIntelError::Generation(_) => ErrorSeverity::Warning,
            HealthIntelError::Database(_) => ErrorSeverity::Error,
            HealthIntelError::Configuration(_) => ErrorSeverity::Error,
            HealthIntelError::Io(_) => ErrorSeverity::Error,
            HealthIntelError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            HealthIntelError::Database(DatabaseError::Sqlite(_)) => {
                "Unable to read health records. Please check the database path.".to_string()
            }
            HealthIntelError::Generation(GenerationError::NotConfigured) => {
                "AI insights are disabled. Enable the narrator in the configuration file."
                    .to_string()
            }
            HealthIntelError::Validation(reason) => format!("Invalid input: {}", reason),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = HealthIntelError::Generation(GenerationError::Timeout { seconds: 20 });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = HealthIntelError::Internal("test".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_sqlite_conversion() {
        let err: HealthIntelError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(
            err,
            HealthIntelError::Database(DatabaseError::Sqlite(_))
        ));
        assert!(err.user_message().contains("Unable to read"));
    }

    #[test]
    fn test_user_messages() {
        let err = HealthIntelError::Validation("period must be 7, 14, 30 or 60".to_string());
        assert!(err.user_message().starts_with("Invalid input"));

        let err = HealthIntelError::Generation(GenerationError::NotConfigured);
        assert!(err.user_message().contains("disabled"));
    }
}
