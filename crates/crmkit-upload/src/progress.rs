//! Progress reporting for upload bodies.
//!
//! Bodies are streamed in fixed-size chunks. Each time the transport pulls the
//! next chunk, the bytes handed over so far are converted into a percentage
//! and forwarded to the attempt's event channel. Percentages only ever
//! increase, and once the reporter is sealed nothing more is emitted.

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use crmkit_core::UploadProgress;
use tokio::sync::mpsc;

use crate::state::UploadState;
use crate::task::UploadEvent;

#[derive(Debug, Default)]
struct ReporterState {
    last_percent: u8,
    sealed: bool,
}

#[derive(Debug)]
struct ReporterInner {
    events: mpsc::UnboundedSender<UploadEvent>,
    state: Mutex<ReporterState>,
    shared: Option<UploadState>,
}

/// Forwards monotonic progress for one attempt.
#[derive(Clone, Debug)]
pub struct ProgressReporter {
    inner: Arc<ReporterInner>,
}

impl ProgressReporter {
    pub fn new(events: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self::build(events, None)
    }

    /// Reporter that also mirrors its percentage into a pipeline's [`UploadState`].
    pub fn with_state(events: mpsc::UnboundedSender<UploadEvent>, state: UploadState) -> Self {
        Self::build(events, Some(state))
    }

    fn build(events: mpsc::UnboundedSender<UploadEvent>, shared: Option<UploadState>) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                events,
                state: Mutex::new(ReporterState::default()),
                shared,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        match self.inner.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn report_bytes(&self, sent: u64, total: u64) {
        self.report(UploadProgress::from_bytes(sent, total));
    }

    /// Emit `progress` if it is strictly above the last emitted value.
    pub fn report(&self, progress: UploadProgress) {
        let mut state = self.lock();
        if state.sealed || progress.percent_complete <= state.last_percent {
            return;
        }
        state.last_percent = progress.percent_complete;

        if let Some(shared) = &self.inner.shared {
            shared.set_progress(progress.percent_complete);
        }
        // The receiver may be gone if the caller dropped the task handle.
        let _ = self.inner.events.send(UploadEvent::Progress(progress));
    }

    /// Emit 100 if it has not been emitted yet. Call only once the server accepted the upload.
    pub fn complete(&self) {
        self.report(UploadProgress {
            percent_complete: 100,
        });
    }

    /// Stop forwarding progress. Returns the last emitted percentage.
    pub fn seal(&self) -> u8 {
        let mut state = self.lock();
        state.sealed = true;
        state.last_percent
    }

}

fn split_chunks(data: Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(data.len() / chunk_size + 1);
    let mut rest = data;
    while !rest.is_empty() {
        let take = chunk_size.min(rest.len());
        chunks.push(rest.split_to(take));
    }
    chunks
}

/// Stream `data` in `chunk_size` pieces, reporting bytes already handed to the transport.
pub fn progress_stream(
    data: Bytes,
    chunk_size: usize,
    reporter: ProgressReporter,
) -> impl futures::Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let total = data.len() as u64;
    let chunks = split_chunks(data, chunk_size).into_iter();

    futures::stream::unfold(
        (chunks, 0u64, reporter),
        move |(mut chunks, sent, reporter)| async move {
            // Nothing is reported after the last chunk: 100 waits for the server.
            let chunk = chunks.next()?;
            reporter.report_bytes(sent, total);
            let sent = sent + chunk.len() as u64;
            Some((Ok::<Bytes, std::io::Error>(chunk), (chunks, sent, reporter)))
        },
    )
}

/// Request body that reports progress as it is consumed.
pub fn progress_body(data: Bytes, chunk_size: usize, reporter: ProgressReporter) -> reqwest::Body {
    reqwest::Body::wrap_stream(progress_stream(data, chunk_size, reporter))
}
