//! Error types module
//!
//! All failures that cross a component boundary are unified under `AppError`.
//! The variants follow the catalog taxonomy: validation failures are
//! user-correctable, not-found is terminal, an unavailable backend is
//! transient and a misconfigured one fails closed.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a flaky backend
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their response characteristics
pub trait ErrorMetadata {
    /// HTTP status code a front end should return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the whole operation can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// The upload was rejected by the validation gate.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage could not be reached or answered with a transient failure.
    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Storage is missing required configuration (e.g. no bucket).
    #[error("Storage misconfigured: {0}")]
    Misconfigured(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::ValidationFailed(_) => (
            400,
            "VALIDATION_FAILED",
            false,
            Some("Upload a JPEG or PNG image of at least 100x50 pixels with a 2:1 aspect ratio"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::BackendUnavailable(_) => (
            503,
            "STORAGE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        AppError::Misconfigured(_) => (
            500,
            "STORAGE_MISCONFIGURED",
            false,
            Some("Contact the service operator"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::ValidationFailed(_) => "ValidationFailed",
            AppError::NotFound(_) => "NotFound",
            AppError::BackendUnavailable(_) => "BackendUnavailable",
            AppError::Misconfigured(_) => "Misconfigured",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }

    /// Shorthand for the "Image not found" error returned by every live lookup.
    pub fn image_not_found() -> Self {
        AppError::NotFound("Image not found".to_string())
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::ValidationFailed(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::BackendUnavailable(_) => "Failed to access storage".to_string(),
            AppError::Misconfigured(_) => "Storage is not configured".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_validation_failed_surfaces_reason() {
        let err = AppError::ValidationFailed("Aspect ratio must be at least 2:1.".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_FAILED");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Aspect ratio must be at least 2:1.");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::image_not_found();
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Image not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_backend_errors_hide_details() {
        let unavailable = AppError::BackendUnavailable("connection reset by peer".to_string());
        assert!(unavailable.is_recoverable());
        assert!(unavailable.is_sensitive());
        assert_eq!(unavailable.client_message(), "Failed to access storage");

        let misconfigured = AppError::Misconfigured("Bucket name not configured".to_string());
        assert!(!misconfigured.is_recoverable());
        assert_eq!(misconfigured.log_level(), LogLevel::Error);
        assert_eq!(misconfigured.client_message(), "Storage is not configured");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let err = AppError::from(anyhow::anyhow!("disk offline").context("writing blob"));
        let details = err.detailed_message();
        assert!(details.starts_with("Internal error with source"));
        assert!(details.contains("writing blob"));
    }
}
