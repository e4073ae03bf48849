use chrono::{DateTime, Utc};
use crmkit_core::{PipelineError, PipelineResult, UploadProgress, UploadResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Something that happened during an upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress(UploadProgress),
    Completed(UploadResult),
    Failed(PipelineError),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadEvent::Progress(_))
    }
}

/// Handle to a running upload attempt.
///
/// Yields zero or more progress events followed by exactly one terminal
/// event. After the terminal event [`UploadTask::next_event`] returns `None`.
#[derive(Debug)]
pub struct UploadTask {
    id: Uuid,
    started_at: DateTime<Utc>,
    events: mpsc::UnboundedReceiver<UploadEvent>,
    cancel: CancellationToken,
    finished: bool,
}

impl UploadTask {
    pub(crate) fn new(
        id: Uuid,
        events: mpsc::UnboundedReceiver<UploadEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            started_at: Utc::now(),
            events,
            cancel,
            finished: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Ask the attempt to stop. It ends with [`PipelineError::Cancelled`]
    /// unless it already reached another outcome.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        if self.finished {
            return None;
        }

        match self.events.recv().await {
            Some(event) => {
                if event.is_terminal() {
                    self.finished = true;
                }
                Some(event)
            }
            None => {
                // Worker went away without reporting (it panicked).
                self.finished = true;
                Some(UploadEvent::Failed(PipelineError::Internal(
                    "upload task ended without an outcome".to_string(),
                )))
            }
        }
    }

    /// Drive the attempt to its outcome, handing each progress update to `on_progress`.
    pub async fn finish<F>(mut self, mut on_progress: F) -> PipelineResult<UploadResult>
    where
        F: FnMut(UploadProgress),
    {
        while let Some(event) = self.next_event().await {
            match event {
                UploadEvent::Progress(progress) => on_progress(progress),
                UploadEvent::Completed(result) => return Ok(result),
                UploadEvent::Failed(err) => return Err(err),
            }
        }

        Err(PipelineError::Internal(
            "upload task already finished".to_string(),
        ))
    }
}
