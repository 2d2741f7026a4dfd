//! Error types module
//!
//! All failures that can surface from an upload or record operation are
//! unified under [`AppError`]. Each variant describes its own HTTP
//! presentation through [`ErrorMetadata`]; internal detail carried in the
//! variant payload is for logs only and never reaches the client.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client mistakes worth noticing
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (never includes internal detail)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("Not authorized: {0}")]
    AuthorizationFailure(String),

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Classification failed: {0}")]
    ClassificationFailure(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Metadata persist failed: {0}")]
    MetadataPersistFailure(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidIdentifier(format!("UUID parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (u16, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::InvalidIdentifier(_) => (
            400,
            "INVALID_IDENTIFIER",
            false,
            Some("Check the record ID in the request path"),
            LogLevel::Debug,
        ),
        AppError::AuthenticationFailure(_) => (
            401,
            "AUTHENTICATION_FAILURE",
            false,
            Some("Provide a valid bearer token"),
            LogLevel::Debug,
        ),
        AppError::AuthorizationFailure(_) => (
            403,
            "AUTHORIZATION_FAILURE",
            false,
            None,
            LogLevel::Warn,
        ),
        AppError::MalformedUpload(_) => (
            400,
            "MALFORMED_UPLOAD",
            false,
            Some("Check the multipart body and file size"),
            LogLevel::Debug,
        ),
        AppError::UnsupportedMediaType(_) => (
            415,
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Upload a file with an accepted content type"),
            LogLevel::Debug,
        ),
        AppError::ClassificationFailure(_) => (
            500,
            "CLASSIFICATION_FAILURE",
            false,
            Some("Check that the file is a readable video"),
            LogLevel::Error,
        ),
        AppError::StorageFailure(_) => (
            502,
            "STORAGE_FAILURE",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::MetadataPersistFailure(_) => (
            500,
            "METADATA_PERSIST_FAILURE",
            true,
            Some("Retry the upload"),
            LogLevel::Error,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            LogLevel::Debug,
        ),
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for log fields
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidIdentifier(_) => "InvalidIdentifier",
            AppError::AuthenticationFailure(_) => "AuthenticationFailure",
            AppError::AuthorizationFailure(_) => "AuthorizationFailure",
            AppError::MalformedUpload(_) => "MalformedUpload",
            AppError::UnsupportedMediaType(_) => "UnsupportedMediaType",
            AppError::ClassificationFailure(_) => "ClassificationFailure",
            AppError::StorageFailure(_) => "StorageFailure",
            AppError::MetadataPersistFailure(_) => "MetadataPersistFailure",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Database(_) => "Database",
            AppError::Internal(_) => "Internal",
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

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidIdentifier(_) => "Invalid ID",
            AppError::AuthenticationFailure(_) => "Couldn't validate credentials",
            AppError::AuthorizationFailure(_) => "You are not the owner of this resource",
            AppError::MalformedUpload(_) => "Unable to parse upload",
            AppError::UnsupportedMediaType(_) => "Unsupported media type",
            AppError::ClassificationFailure(_) => "Couldn't inspect video",
            AppError::StorageFailure(_) => "Failed to store upload",
            AppError::MetadataPersistFailure(_) => "Failed to update record",
            AppError::NotFound(_) => "Resource not found",
            AppError::InvalidInput(_) => "Invalid request body",
            AppError::Database(_) => "Failed to access database",
            AppError::Internal(_) => "Internal server error",
        }
        .to_string()
    }
}
