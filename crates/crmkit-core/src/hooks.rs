//! Hooks for surfacing outcomes to the user
//!
//! The pipelines never print or render anything themselves. They hand a
//! [`Notice`] to whatever [`Notifier`] the caller installed: a toast in a UI,
//! a line on stderr in the CLI, or nothing at all in tests.

use crate::error::{ErrorMetadata, LogLevel, PipelineError};

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A short human-readable notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Error notice carrying the error's client-facing message.
    pub fn from_error(title: impl Into<String>, err: &PipelineError) -> Self {
        Self::error(title, err.client_message())
    }
}

/// Receives notices from the pipelines
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Default notifier: every notice becomes a tracing event
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(title = %notice.title, "{}", notice.message)
            }
            NoticeLevel::Warning => {
                tracing::warn!(title = %notice.title, "{}", notice.message)
            }
            NoticeLevel::Error => {
                tracing::error!(title = %notice.title, "{}", notice.message)
            }
        }
    }
}

/// No-op implementation for callers that render outcomes themselves
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Log an error at the level its metadata asks for.
pub fn log_error(err: &PipelineError, operation: &'static str) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            error = %err,
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            local = err.is_local(),
            operation,
            "operation failed"
        ),
        LogLevel::Warn => tracing::warn!(
            error = %err,
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            local = err.is_local(),
            operation,
            "operation failed"
        ),
        LogLevel::Error => tracing::error!(
            error = %err,
            error_code = err.error_code(),
            recoverable = err.is_recoverable(),
            local = err.is_local(),
            operation,
            "operation failed"
        ),
    }
}
