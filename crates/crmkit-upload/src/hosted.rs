//! Unsigned uploads to the hosted media service.
//!
//! One uploader serves both media classes; everything that differs between
//! images and videos (endpoint, preset, ceiling, expected encoding) lives in
//! the [`HostedProfile`] it is built from.

use std::sync::Arc;

use async_trait::async_trait;
use crmkit_api_client::{server_message, ApiClient, ApiError, RawResponse};
use crmkit_core::models::{HostedErrorResponse, HostedUploadResponse};
use crmkit_core::{
    HostedProfile, MediaKind, Notice, Notifier, PipelineError, PipelineResult, UploadRequest,
    UploadResult,
};
use reqwest::multipart::{Form, Part};

use crate::progress::{progress_body, ProgressReporter};
use crate::strategy::UploadStrategy;

const FILE_FIELD: &str = "file";
const PRESET_FIELD: &str = "upload_preset";
const DEFAULT_REJECTION: &str = "Upload failed";

pub struct HostedUploader {
    client: ApiClient,
    profile: HostedProfile,
    chunk_size: usize,
    notifier: Arc<dyn Notifier>,
}

impl HostedUploader {
    pub fn new(
        client: ApiClient,
        profile: HostedProfile,
        chunk_size: usize,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            profile,
            chunk_size,
            notifier,
        }
    }

    pub fn profile(&self) -> &HostedProfile {
        &self.profile
    }

    fn form(&self, request: &UploadRequest, reporter: &ProgressReporter) -> PipelineResult<Form> {
        let length = request.data.len() as u64;
        let body = progress_body(request.data.clone(), self.chunk_size, reporter.clone());

        let part = Part::stream_with_length(body, length)
            .file_name(request.file_name.clone())
            .mime_str(&request.declared_mime_type)
            .map_err(|e| {
                PipelineError::Internal(format!(
                    "Invalid content type {}: {}",
                    request.declared_mime_type, e
                ))
            })?;

        Ok(Form::new()
            .part(FILE_FIELD, part)
            .text(PRESET_FIELD, self.profile.preset.clone()))
    }

    fn warn_on_format_mismatch(&self, stored_format: Option<&str>) {
        let (Some(expected), Some(stored)) = (self.profile.expected_format.as_deref(), stored_format)
        else {
            return;
        };

        if !stored.eq_ignore_ascii_case(expected) {
            tracing::warn!(
                kind = %self.profile.kind,
                expected_format = expected,
                stored_format = stored,
                "Hosted upload stored in an unexpected format"
            );
            self.notifier.notify(Notice::warning(
                "Unexpected format",
                format!(
                    "File was stored as {}, expected {}. It may not play everywhere.",
                    stored, expected
                ),
            ));
        }
    }
}

/// Map a hosted-service response onto an outcome.
pub fn interpret_response(response: &RawResponse) -> PipelineResult<HostedUploadResponse> {
    if !response.is_success() {
        let message = serde_json::from_slice::<HostedErrorResponse>(&response.body)
            .map(|body| body.error.message)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| server_message(&response.text()))
            .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
        return Err(PipelineError::UploadRejected {
            status: response.status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| PipelineError::UploadResponseInvalid(e.to_string()))
}

fn transport_error(err: ApiError) -> PipelineError {
    match err {
        ApiError::Build(message) => PipelineError::Internal(message),
        other => PipelineError::UploadTransportError(other.to_string()),
    }
}

#[async_trait]
impl UploadStrategy for HostedUploader {
    fn label(&self) -> &'static str {
        match self.profile.kind {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }

    fn validate(&self, request: &UploadRequest) -> PipelineResult<()> {
        self.profile.policy.check(request)
    }

    async fn upload(
        &self,
        request: &UploadRequest,
        reporter: &ProgressReporter,
    ) -> PipelineResult<UploadResult> {
        tracing::info!(
            kind = %self.profile.kind,
            file_name = %request.file_name,
            size_bytes = request.size_bytes(),
            "Uploading to hosted media service"
        );

        let form = self.form(request, reporter)?;
        let response = self
            .client
            .post_multipart(&self.profile.endpoint, form)
            .await
            .map_err(transport_error)?;

        let hosted = interpret_response(&response)?;
        self.warn_on_format_mismatch(hosted.format.as_deref());

        Ok(UploadResult {
            public_url: hosted.secure_url,
            stored_format: hosted.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::StatusCode;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn rejection_carries_host_message() {
        let err = interpret_response(&response(
            400,
            r#"{"error":{"message":"Upload preset not found"}}"#,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            PipelineError::UploadRejected {
                status: 400,
                message: "Upload preset not found".to_string(),
            }
        );
    }

    #[test]
    fn rejection_falls_back_to_plain_message_body() {
        let err = interpret_response(&response(401, r#"{"message":"Invalid preset"}"#)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UploadRejected {
                status: 401,
                message: "Invalid preset".to_string(),
            }
        );
    }

    #[test]
    fn rejection_with_blank_host_message_uses_default() {
        let err = interpret_response(&response(400, r#"{"error":{"message":" "}}"#)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UploadRejected {
                status: 400,
                message: "Upload failed".to_string(),
            }
        );
    }

    #[test]
    fn rejection_without_message_uses_default() {
        let err = interpret_response(&response(502, "<html>bad gateway</html>")).unwrap_err();
        assert_eq!(
            err,
            PipelineError::UploadRejected {
                status: 502,
                message: "Upload failed".to_string(),
            }
        );
    }

    #[test]
    fn success_without_secure_url_is_invalid() {
        let err = interpret_response(&response(200, r#"{"format":"mp4"}"#)).unwrap_err();
        assert!(matches!(err, PipelineError::UploadResponseInvalid(_)));
    }

    #[test]
    fn success_reads_url_and_format() {
        let hosted = interpret_response(&response(
            200,
            r#"{"secure_url":"https://res.example.com/v/clip.mp4","format":"mp4","bytes":10}"#,
        ))
        .unwrap();
        assert_eq!(hosted.secure_url, "https://res.example.com/v/clip.mp4");
        assert_eq!(hosted.format.as_deref(), Some("mp4"));
    }
}
