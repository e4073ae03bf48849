//! Bulk submission of a validated batch.
//!
//! The whole batch goes out as one request, `{ <payload_key>: [rows] }`, and
//! comes back as one outcome. Per-row results are the server's business.

use std::sync::Arc;

use crmkit_api_client::{join_url, ApiClient, ApiError};
use crmkit_core::{
    log_error, Credential, Notice, Notifier, PipelineConfig, PipelineError, PipelineResult,
    TracingNotifier,
};

use crate::parser::CsvBatch;
use crate::profile::ImportProfile;

const DEFAULT_FAILURE: &str = "Upload failed";

/// What was accepted by the bulk endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitSummary {
    pub profile: &'static str,
    pub submitted: usize,
}

pub struct BulkSubmitter {
    client: ApiClient,
    api_url: String,
    notifier: Arc<dyn Notifier>,
}

impl BulkSubmitter {
    pub fn new(client: ApiClient, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Submitter for the configured API. Fails with `ConfigMissing` if no API URL is set.
    pub fn from_config(client: ApiClient, config: &PipelineConfig) -> PipelineResult<Self> {
        Ok(Self::new(client, config.api_url()?))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Request body for `batch` under `profile`.
    pub fn payload(profile: &ImportProfile, batch: &CsvBatch) -> PipelineResult<serde_json::Value> {
        let mut body = serde_json::Map::new();
        body.insert(
            profile.payload_key.to_string(),
            serde_json::to_value(batch.rows())?,
        );
        Ok(serde_json::Value::Object(body))
    }

    /// Send every row of `batch` to the profile's bulk endpoint.
    pub async fn submit(
        &self,
        profile: &ImportProfile,
        batch: &CsvBatch,
        credential: &Credential,
    ) -> PipelineResult<SubmitSummary> {
        let result = self.send(profile, batch, credential).await;

        match &result {
            Ok(summary) => self.notifier.notify(Notice::success(
                "Import success",
                format!("{} {}", summary.submitted, profile.success_noun),
            )),
            Err(err) => {
                log_error(err, "bulk_submit");
                self.notifier.notify(Notice::from_error("Upload failed", err));
            }
        }

        result
    }

    async fn send(
        &self,
        profile: &ImportProfile,
        batch: &CsvBatch,
        credential: &Credential,
    ) -> PipelineResult<SubmitSummary> {
        if batch.is_empty() {
            return Err(PipelineError::NothingToSubmit);
        }

        let url = join_url(&self.api_url, profile.endpoint);
        let body = Self::payload(profile, batch)?;

        tracing::info!(
            profile = profile.name,
            rows = batch.len(),
            "Submitting bulk import"
        );

        self.client
            .post_json_unit(&url, &body, Some(credential))
            .await
            .map_err(submit_error)?;

        Ok(SubmitSummary {
            profile: profile.name,
            submitted: batch.len(),
        })
    }
}

fn submit_error(err: ApiError) -> PipelineError {
    let status = err.status();
    let message = match &err {
        ApiError::Status { .. } => err
            .server_message()
            .unwrap_or_else(|| DEFAULT_FAILURE.to_string()),
        other => other.to_string(),
    };
    PipelineError::BulkSubmitFailed { status, message }
}
