//! Error types module
//!
//! This module provides the core error types used throughout the zipline
//! application. All errors are unified under the `AppError` enum which can
//! represent archive, mail, validation, and IO failures.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like delivery problems
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_ARCHIVE")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
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

/// A single failed delivery attempt, kept for the aggregate error report.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported file type: {file_name} ({mime_type})")]
    UnsupportedFileType {
        file_name: String,
        mime_type: String,
    },

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("No files uploaded")]
    NoFilesProvided,

    #[error("No recipients provided")]
    NoRecipients,

    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    #[error("Unsafe file name: {0}")]
    UnsafeFileName(String),

    #[error("Some emails failed: {}", format_delivery_failures(failures))]
    PartialDeliveryFailure { failures: Vec<DeliveryFailure> },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("IO failure: {0}")]
    Io(#[source] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Io(err)
    }
}

fn format_delivery_failures(failures: &[DeliveryFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.recipient, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// Reduces duplication in ErrorMetadata impl; client_message stays per-variant for dynamic content.
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
        AppError::UnsupportedFileType { .. } => (
            400,
            "UNSUPPORTED_FILE_TYPE",
            false,
            Some("Check the list of accepted file types and try a different file"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidArchive(_) => (
            400,
            "INVALID_ARCHIVE",
            false,
            Some("Verify the file is a valid zip archive"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoFilesProvided => (
            400,
            "NO_FILES_PROVIDED",
            false,
            Some("Attach at least one file to the request"),
            false,
            LogLevel::Debug,
        ),
        AppError::NoRecipients => (
            400,
            "NO_RECIPIENTS",
            false,
            Some("Provide at least one recipient address"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidEmailAddress(_) => (
            400,
            "INVALID_EMAIL_ADDRESS",
            false,
            Some("Check recipient addresses for typos"),
            false,
            LogLevel::Debug,
        ),
        AppError::UnsafeFileName(_) => (
            400,
            "UNSAFE_FILE_NAME",
            false,
            Some("Rename the file without path separators"),
            false,
            LogLevel::Warn,
        ),
        AppError::PartialDeliveryFailure { .. } => (
            500,
            "PARTIAL_DELIVERY_FAILURE",
            true,
            Some("Retry delivery for the failed recipients"),
            false,
            LogLevel::Error,
        ),
        AppError::MalformedRequest(_) => (
            400,
            "MALFORMED_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::Io(_) => (
            500,
            "IO_FAILURE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
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
            AppError::UnsupportedFileType { .. } => "UnsupportedFileType",
            AppError::InvalidArchive(_) => "InvalidArchive",
            AppError::NoFilesProvided => "NoFilesProvided",
            AppError::NoRecipients => "NoRecipients",
            AppError::InvalidEmailAddress(_) => "InvalidEmailAddress",
            AppError::UnsafeFileName(_) => "UnsafeFileName",
            AppError::PartialDeliveryFailure { .. } => "PartialDeliveryFailure",
            AppError::MalformedRequest(_) => "MalformedRequest",
            AppError::Io(_) => "Io",
            AppError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        // Add source error chain
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

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::UnsupportedFileType {
                file_name,
                mime_type,
            } => {
                format!("Unsupported file type: {} ({})", file_name, mime_type)
            }
            AppError::InvalidArchive(ref msg) => format!("Invalid archive: {}", msg),
            AppError::NoFilesProvided => "No files uploaded".to_string(),
            AppError::NoRecipients => "No recipients provided".to_string(),
            AppError::InvalidEmailAddress(ref addr) => {
                format!("Invalid email address: {}", addr)
            }
            AppError::UnsafeFileName(ref name) => format!("Unsafe file name: {}", name),
            AppError::PartialDeliveryFailure { failures } => {
                format!("Some emails failed: {}", format_delivery_failures(failures))
            }
            AppError::MalformedRequest(ref msg) => msg.clone(),
            AppError::Io(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
