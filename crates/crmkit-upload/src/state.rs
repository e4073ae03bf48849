//! Observable upload state.
//!
//! One pipeline runs at most one upload at a time. The "uploading" flag is
//! owned by an [`UploadingGuard`]; dropping the guard clears it, so every exit
//! path of an attempt (success, rejection, transport failure, cancellation,
//! panic) leaves the flag false.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crmkit_core::{PipelineError, PipelineResult};

#[derive(Debug, Default)]
struct StateInner {
    uploading: AtomicBool,
    progress: AtomicU8,
}

/// Shared, cheaply cloneable view of a pipeline's upload state.
#[derive(Clone, Debug, Default)]
pub struct UploadState {
    inner: Arc<StateInner>,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an attempt is in flight.
    pub fn is_uploading(&self) -> bool {
        self.inner.uploading.load(Ordering::Acquire)
    }

    /// Last reported percentage of the current (or most recent) attempt.
    pub fn progress(&self) -> u8 {
        self.inner.progress.load(Ordering::Acquire)
    }

    /// Claim the flag for a new attempt.
    pub fn try_begin(&self) -> PipelineResult<UploadingGuard> {
        self.inner
            .uploading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::UploadInProgress)?;

        self.inner.progress.store(0, Ordering::Release);

        Ok(UploadingGuard {
            state: self.clone(),
        })
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        self.inner.progress.store(percent, Ordering::Release);
    }
}

/// Holds the uploading flag for the lifetime of one attempt.
#[derive(Debug)]
pub struct UploadingGuard {
    state: UploadState,
}

impl Drop for UploadingGuard {
    fn drop(&mut self) {
        self.state.inner.uploading.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_flag_on_drop() {
        let state = UploadState::new();
        {
            let _guard = state.try_begin().unwrap();
            assert!(state.is_uploading());
        }
        assert!(!state.is_uploading());
    }

    #[test]
    fn second_attempt_is_refused_while_busy() {
        let state = UploadState::new();
        let _guard = state.try_begin().unwrap();
        assert_eq!(
            state.try_begin().unwrap_err(),
            PipelineError::UploadInProgress
        );
    }

    #[test]
    fn new_attempt_resets_progress() {
        let state = UploadState::new();
        let guard = state.try_begin().unwrap();
        state.set_progress(80);
        drop(guard);
        assert_eq!(state.progress(), 80);

        let _guard = state.try_begin().unwrap();
        assert_eq!(state.progress(), 0);
    }

    #[test]
    fn guard_clears_flag_when_owner_panics() {
        let state = UploadState::new();
        let shared = state.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.try_begin().unwrap();
            panic!("transport blew up");
        })
        .join();

        assert!(result.is_err());
        assert!(!state.is_uploading());
    }
}
