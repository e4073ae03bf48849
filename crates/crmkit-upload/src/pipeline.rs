//! Upload pipeline
//!
//! Orchestrates one attempt: claim the uploading flag, resolve the
//! destination's configuration, run the local guard, then spawn the transfer
//! on the runtime. Local failures are returned directly and never touch the
//! network; remote outcomes arrive through the returned [`UploadTask`].

use std::sync::Arc;
use std::time::Instant;

use crmkit_api_client::ApiClient;
use crmkit_core::{
    log_error, Credential, Notice, Notifier, PipelineConfig, PipelineError, PipelineResult,
    TracingNotifier, UploadProgress, UploadRequest, UploadResult,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::hosted::HostedUploader;
use crate::presigned::PresignedUploader;
use crate::progress::ProgressReporter;
use crate::state::{UploadState, UploadingGuard};
use crate::strategy::{Destination, UploadStrategy};
use crate::task::{UploadEvent, UploadTask};

pub struct UploadPipeline {
    client: ApiClient,
    config: PipelineConfig,
    notifier: Arc<dyn Notifier>,
    state: UploadState,
}

impl UploadPipeline {
    pub fn new(client: ApiClient, config: PipelineConfig) -> Self {
        Self {
            client,
            config,
            notifier: Arc::new(TracingNotifier),
            state: UploadState::new(),
        }
    }

    /// Pipeline over the current environment.
    pub fn from_env() -> PipelineResult<Self> {
        let config = PipelineConfig::from_env();
        let client =
            ApiClient::from_config(&config).map_err(|e| PipelineError::Internal(e.to_string()))?;
        Ok(Self::new(client, config))
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolve the strategy for `destination`. Fails with `ConfigMissing`
    /// when the destination is not configured.
    pub fn select_strategy(
        &self,
        destination: Destination,
        credential: Option<&Credential>,
    ) -> PipelineResult<Arc<dyn UploadStrategy>> {
        match destination {
            Destination::Hosted(kind) => {
                let profile = self.config.hosted_profile(kind)?;
                Ok(Arc::new(HostedUploader::new(
                    self.client.clone(),
                    profile,
                    self.config.chunk_size_bytes,
                    self.notifier.clone(),
                )))
            }
            Destination::ObjectStorage => {
                let api_url = self.config.api_url()?;
                Ok(Arc::new(PresignedUploader::new(
                    self.client.clone(),
                    api_url,
                    self.config.max_object_size_bytes,
                    self.config.chunk_size_bytes,
                    credential.cloned(),
                )))
            }
        }
    }

    fn prepare(
        &self,
        destination: Destination,
        request: &UploadRequest,
        credential: Option<&Credential>,
    ) -> PipelineResult<(UploadingGuard, Arc<dyn UploadStrategy>)> {
        let guard = self.state.try_begin()?;
        let strategy = self.select_strategy(destination, credential)?;
        strategy.validate(request)?;
        Ok((guard, strategy))
    }

    /// Start an upload. Must be called from within a Tokio runtime.
    pub fn start(
        &self,
        destination: Destination,
        request: UploadRequest,
        credential: Option<&Credential>,
    ) -> PipelineResult<UploadTask> {
        let (guard, strategy) = match self.prepare(destination, &request, credential) {
            Ok(prepared) => prepared,
            Err(err) => {
                log_error(&err, "upload");
                self.notifier.notify(Notice::from_error("Upload failed", &err));
                return Err(err);
            }
        };

        let id = Uuid::new_v4();
        let (events, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let reporter = ProgressReporter::with_state(events.clone(), self.state.clone());

        tracing::info!(
            upload_id = %id,
            destination = %destination,
            file_name = %request.file_name,
            size_bytes = request.size_bytes(),
            "Upload started"
        );

        let attempt = Attempt {
            id,
            strategy,
            request,
            reporter,
            events,
            cancel: cancel.clone(),
            notifier: self.notifier.clone(),
            guard,
        };
        tokio::spawn(attempt.run());

        Ok(UploadTask::new(id, receiver, cancel))
    }

    /// Start an upload and wait for its outcome.
    pub async fn upload<F>(
        &self,
        destination: Destination,
        request: UploadRequest,
        credential: Option<&Credential>,
        on_progress: F,
    ) -> PipelineResult<UploadResult>
    where
        F: FnMut(UploadProgress),
    {
        self.start(destination, request, credential)?
            .finish(on_progress)
            .await
    }
}

struct Attempt {
    id: Uuid,
    strategy: Arc<dyn UploadStrategy>,
    request: UploadRequest,
    reporter: ProgressReporter,
    events: mpsc::UnboundedSender<UploadEvent>,
    cancel: CancellationToken,
    notifier: Arc<dyn Notifier>,
    guard: UploadingGuard,
}

impl Attempt {
    async fn run(self) {
        let Attempt {
            id,
            strategy,
            request,
            reporter,
            events,
            cancel,
            notifier,
            guard,
        } = self;
        let start = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            result = strategy.upload(&request, &reporter) => result,
        };

        if outcome.is_ok() {
            reporter.complete();
        }
        let last_percent = reporter.seal();
        // Flag goes down before the outcome is observable.
        drop(guard);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(result) => {
                tracing::info!(
                    upload_id = %id,
                    public_url = %result.public_url,
                    duration_ms = elapsed_ms,
                    "Upload completed"
                );
                notifier.notify(Notice::success(
                    "Upload complete",
                    format!("{} uploaded successfully", strategy.label()),
                ));
            }
            Err(err) => {
                tracing::debug!(
                    upload_id = %id,
                    last_percent,
                    duration_ms = elapsed_ms,
                    "Upload ended without success"
                );
                log_error(err, "upload");
                notifier.notify(Notice::from_error("Upload failed", err));
            }
        }

        let terminal = match outcome {
            Ok(result) => UploadEvent::Completed(result),
            Err(err) => UploadEvent::Failed(err),
        };
        let _ = events.send(terminal);
    }
}
