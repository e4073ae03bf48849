//! Error types module
//!
//! Every failure either pipeline can produce is a variant of [`PipelineError`].
//! Errors self-describe how they should be presented through [`ErrorMetadata`]:
//! the CLI (or any other front end) turns them into a short notice without
//! matching on variants itself.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejections reported by a remote service
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error presentation
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Whether restarting the attempt from scratch may succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Short human-readable message for a notification
    fn client_message(&self) -> String;

    /// Whether the error was detected before any network call
    fn is_local(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    EmptyFile,

    #[error("Unsupported media type: {content_type} (expected {expected})")]
    UnsupportedMediaType {
        content_type: String,
        expected: String,
    },

    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Presigned URL request failed: {0}")]
    PresignRequestFailed(String),

    #[error("Presigned PUT failed: {0}")]
    UploadPutFailed(String),

    #[error("Upload rejected with status {status}: {message}")]
    UploadRejected { status: u16, message: String },

    #[error("Network error during upload: {0}")]
    UploadTransportError(String),

    #[error("Invalid upload response: {0}")]
    UploadResponseInvalid(String),

    #[error("CSV parsing error: {0}")]
    CsvParseError(String),

    #[error("Missing column(s): {}", .missing.join(", "))]
    CsvSchemaInvalid { missing: Vec<String> },

    #[error("No rows to submit")]
    NothingToSubmit,

    #[error("Bulk submission failed: {message}")]
    BulkSubmitFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Upload cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Render a byte ceiling the way users read it ("1MB", "50MB", "512KB").
pub fn format_limit(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;
    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB && bytes % KB == 0 {
        format!("{}KB", bytes / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, local, log_level).
fn pipeline_error_static_metadata(
    err: &PipelineError,
) -> (&'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        PipelineError::FileTooLarge { .. } => (
            "FILE_TOO_LARGE",
            false,
            Some("Choose a smaller file"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::EmptyFile => (
            "EMPTY_FILE",
            false,
            Some("Choose a non-empty file"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::UnsupportedMediaType { .. } => (
            "UNSUPPORTED_MEDIA_TYPE",
            false,
            Some("Choose a file of the accepted type"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::ConfigMissing(_) => (
            "CONFIG_MISSING",
            false,
            Some("Set the missing environment variable"),
            true,
            LogLevel::Error,
        ),
        PipelineError::PresignRequestFailed(_) => (
            "PRESIGN_REQUEST_FAILED",
            true,
            Some("Retry the upload"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::UploadPutFailed(_) => (
            "UPLOAD_PUT_FAILED",
            true,
            Some("Retry the upload; a new upload URL will be requested"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::UploadRejected { .. } => (
            "UPLOAD_REJECTED",
            false,
            Some("Check the file and upload preset"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::UploadTransportError(_) => (
            "UPLOAD_TRANSPORT_ERROR",
            true,
            Some("Check your connection and retry"),
            false,
            LogLevel::Error,
        ),
        PipelineError::UploadResponseInvalid(_) => (
            "UPLOAD_RESPONSE_INVALID",
            true,
            Some("Retry the upload"),
            false,
            LogLevel::Error,
        ),
        PipelineError::CsvParseError(_) => (
            "CSV_PARSE_ERROR",
            false,
            Some("Fix the CSV file and choose it again"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::CsvSchemaInvalid { .. } => (
            "CSV_SCHEMA_INVALID",
            false,
            Some("Add the missing columns; download the sample CSV for the format"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::NothingToSubmit => (
            "NOTHING_TO_SUBMIT",
            false,
            Some("Choose a CSV first"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::BulkSubmitFailed { .. } => (
            "BULK_SUBMIT_FAILED",
            true,
            Some("Retry the import"),
            false,
            LogLevel::Warn,
        ),
        PipelineError::UploadInProgress => (
            "UPLOAD_IN_PROGRESS",
            true,
            Some("Wait for the current upload to finish"),
            true,
            LogLevel::Debug,
        ),
        PipelineError::Cancelled => ("CANCELLED", true, None, false, LogLevel::Debug),
        PipelineError::Internal(_) => (
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            false,
            LogLevel::Error,
        ),
    }
}

impl PipelineError {
    /// Get the error type name for detailed error output
    pub fn error_type(&self) -> &str {
        match self {
            PipelineError::FileTooLarge { .. } => "FileTooLarge",
            PipelineError::EmptyFile => "EmptyFile",
            PipelineError::UnsupportedMediaType { .. } => "UnsupportedMediaType",
            PipelineError::ConfigMissing(_) => "ConfigMissing",
            PipelineError::PresignRequestFailed(_) => "PresignRequestFailed",
            PipelineError::UploadPutFailed(_) => "UploadPutFailed",
            PipelineError::UploadRejected { .. } => "UploadRejected",
            PipelineError::UploadTransportError(_) => "UploadTransportError",
            PipelineError::UploadResponseInvalid(_) => "UploadResponseInvalid",
            PipelineError::CsvParseError(_) => "CsvParseError",
            PipelineError::CsvSchemaInvalid { .. } => "CsvSchemaInvalid",
            PipelineError::NothingToSubmit => "NothingToSubmit",
            PipelineError::BulkSubmitFailed { .. } => "BulkSubmitFailed",
            PipelineError::UploadInProgress => "UploadInProgress",
            PipelineError::Cancelled => "Cancelled",
            PipelineError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for PipelineError {
    fn error_code(&self) -> &'static str {
        pipeline_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        pipeline_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        pipeline_error_static_metadata(self).2
    }

    fn is_local(&self) -> bool {
        pipeline_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        pipeline_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            PipelineError::FileTooLarge { max, .. } => {
                format!("File is too large (Max {}).", format_limit(*max))
            }
            PipelineError::EmptyFile => "File is empty.".to_string(),
            PipelineError::UnsupportedMediaType { expected, .. } => {
                format!("Unsupported file type, expected {}.", expected)
            }
            PipelineError::ConfigMissing(_) => "Upload configuration missing.".to_string(),
            PipelineError::PresignRequestFailed(_) => {
                "Could not prepare the upload. Please try again.".to_string()
            }
            PipelineError::UploadPutFailed(_) => "Upload failed".to_string(),
            PipelineError::UploadRejected { message, .. } => message.clone(),
            PipelineError::UploadTransportError(_) => "Network error during upload".to_string(),
            PipelineError::UploadResponseInvalid(_) => "Invalid upload response".to_string(),
            PipelineError::CsvParseError(ref msg) => msg.clone(),
            PipelineError::CsvSchemaInvalid { missing } => {
                format!("Missing column(s): {}", missing.join(", "))
            }
            PipelineError::NothingToSubmit => "Choose a CSV first".to_string(),
            PipelineError::BulkSubmitFailed { message, .. } => message.clone(),
            PipelineError::UploadInProgress => "An upload is already in progress".to_string(),
            PipelineError::Cancelled => "Upload cancelled".to_string(),
            PipelineError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Internal(format!("JSON error: {}", err))
    }
}

/// Result alias used throughout the pipelines
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_file_too_large() {
        let err = PipelineError::FileTooLarge {
            size: 60 * 1024 * 1024,
            max: 50 * 1024 * 1024,
        };
        assert_eq!(err.error_code(), "FILE_TOO_LARGE");
        assert!(!err.is_recoverable());
        assert!(err.is_local());
        assert_eq!(err.client_message(), "File is too large (Max 50MB).");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_schema_invalid_lists_columns() {
        let err = PipelineError::CsvSchemaInvalid {
            missing: vec!["phone_number".to_string(), "lead_status".to_string()],
        };
        assert_eq!(err.error_code(), "CSV_SCHEMA_INVALID");
        assert!(err.is_local());
        assert_eq!(
            err.client_message(),
            "Missing column(s): phone_number, lead_status"
        );
        assert_eq!(err.to_string(), "Missing column(s): phone_number, lead_status");
    }

    #[test]
    fn test_error_metadata_put_failed_is_recoverable() {
        let err = PipelineError::UploadPutFailed("status 403".to_string());
        assert!(err.is_recoverable());
        assert!(!err.is_local());
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert_eq!(err.error_type(), "UploadPutFailed");
    }

    #[test]
    fn test_rejection_surfaces_host_message() {
        let err = PipelineError::UploadRejected {
            status: 400,
            message: "Upload preset not found".to_string(),
        };
        assert_eq!(err.client_message(), "Upload preset not found");
    }

    #[test]
    fn test_format_limit() {
        assert_eq!(format_limit(1024 * 1024), "1MB");
        assert_eq!(format_limit(512 * 1024), "512KB");
        assert_eq!(format_limit(1000), "1000 bytes");
    }
}
