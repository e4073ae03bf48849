//! Upload transport abstraction.
//!
//! Each destination (hosted media service, presigned object storage) is an
//! [`UploadStrategy`]. The pipeline picks one from a [`Destination`] and runs
//! it; a strategy only moves bytes and interprets the response.

use async_trait::async_trait;
use crmkit_core::{MediaKind, PipelineResult, UploadRequest, UploadResult};

use crate::progress::ProgressReporter;

/// Where an upload should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Hosted media service, with the profile of the given media class
    Hosted(MediaKind),
    /// Object storage via a presigned URL from the internal API
    ObjectStorage,
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Hosted(kind) => write!(f, "hosted-{}", kind),
            Destination::ObjectStorage => write!(f, "object-storage"),
        }
    }
}

#[async_trait]
pub trait UploadStrategy: Send + Sync {
    /// Human label used in notices, e.g. "Video".
    fn label(&self) -> &'static str;

    /// Local checks. Must run, and pass, before any network call.
    fn validate(&self, request: &UploadRequest) -> PipelineResult<()>;

    /// Transfer the file and return where it landed.
    async fn upload(
        &self,
        request: &UploadRequest,
        reporter: &ProgressReporter,
    ) -> PipelineResult<UploadResult>;
}
