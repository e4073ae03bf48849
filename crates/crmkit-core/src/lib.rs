//! crmkit Core Library
//!
//! This crate provides the domain models, error types, configuration and
//! validation shared by the upload and CSV import pipelines.

pub mod config;
pub mod error;
pub mod hooks;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{HostedProfile, PipelineConfig};
pub use error::{format_limit, ErrorMetadata, LogLevel, PipelineError, PipelineResult};
pub use hooks::{log_error, NoOpNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use models::{
    Credential, CsvRow, MediaKind, PresignedTarget, UploadProgress, UploadRequest, UploadResult,
};
pub use validation::MediaPolicy;
