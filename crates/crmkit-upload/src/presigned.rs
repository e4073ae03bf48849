//! Two-phase upload to object storage.
//!
//! Phase 1 asks the internal API for a short-lived write target. Phase 2 PUTs
//! the raw bytes to it. Only a 200 from the PUT counts as success; its body is
//! never read and the public URL comes from phase 1. Neither phase is retried.

use async_trait::async_trait;
use crmkit_api_client::{join_url, ApiClient, ApiError};
use crmkit_core::models::PresignedUrlRequest;
use crmkit_core::validation::check_size;
use crmkit_core::{
    Credential, PipelineError, PipelineResult, PresignedTarget, UploadRequest, UploadResult,
};
use reqwest::StatusCode;

use crate::progress::{progress_body, ProgressReporter};
use crate::strategy::UploadStrategy;

pub const PRESIGN_PATH: &str = "/api/uploads/r2/presigned-url";

pub struct PresignedUploader {
    client: ApiClient,
    api_url: String,
    max_size_bytes: u64,
    chunk_size: usize,
    credential: Option<Credential>,
}

impl PresignedUploader {
    pub fn new(
        client: ApiClient,
        api_url: impl Into<String>,
        max_size_bytes: u64,
        chunk_size: usize,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            max_size_bytes,
            chunk_size,
            credential,
        }
    }

    /// Phase 1: obtain a write target for `request`.
    pub async fn request_target(&self, request: &UploadRequest) -> PipelineResult<PresignedTarget> {
        let url = join_url(&self.api_url, PRESIGN_PATH);
        let body = PresignedUrlRequest {
            file_name: request.file_name.clone(),
            file_type: request.declared_mime_type.clone(),
        };

        self.client
            .post_json::<PresignedTarget, _>(&url, &body, self.credential.as_ref())
            .await
            .map_err(|e| {
                let message = e.server_message().unwrap_or_else(|| e.to_string());
                tracing::warn!(error = %e, file_name = %request.file_name, "Presign request failed");
                PipelineError::PresignRequestFailed(message)
            })
    }

    /// Phase 2: PUT the bytes to the target. Consumes the target.
    pub async fn put_object(
        &self,
        target: PresignedTarget,
        request: &UploadRequest,
        reporter: &ProgressReporter,
    ) -> PipelineResult<UploadResult> {
        let PresignedTarget {
            upload_url,
            public_url,
        } = target;

        let length = request.data.len() as u64;
        let body = progress_body(request.data.clone(), self.chunk_size, reporter.clone());

        let response = self
            .client
            .put_body(&upload_url, body, &request.declared_mime_type, length)
            .await
            .map_err(|e: ApiError| PipelineError::UploadPutFailed(e.to_string()))?;

        if response.status != StatusCode::OK {
            tracing::warn!(
                status = response.status.as_u16(),
                file_name = %request.file_name,
                "Object storage rejected PUT"
            );
            return Err(PipelineError::UploadPutFailed(format!(
                "Object storage answered {}",
                response.status.as_u16()
            )));
        }

        Ok(UploadResult {
            public_url,
            stored_format: None,
        })
    }
}

#[async_trait]
impl UploadStrategy for PresignedUploader {
    fn label(&self) -> &'static str {
        "File"
    }

    fn validate(&self, request: &UploadRequest) -> PipelineResult<()> {
        check_size(request, self.max_size_bytes)
    }

    async fn upload(
        &self,
        request: &UploadRequest,
        reporter: &ProgressReporter,
    ) -> PipelineResult<UploadResult> {
        tracing::info!(
            file_name = %request.file_name,
            size_bytes = request.size_bytes(),
            "Uploading to object storage"
        );

        let target = self.request_target(request).await?;
        tracing::debug!(public_url = %target.public_url, "Received presigned target");

        self.put_object(target, request, reporter).await
    }
}
