//! crmkit media upload pipeline
//!
//! Guards a file locally, transfers it to either the hosted media service or
//! presigned object storage, and reports progress and a single terminal
//! outcome through an [`UploadTask`].

pub mod hosted;
pub mod pipeline;
pub mod presigned;
pub mod progress;
pub mod state;
pub mod strategy;
pub mod task;

pub use hosted::HostedUploader;
pub use pipeline::UploadPipeline;
pub use presigned::{PresignedUploader, PRESIGN_PATH};
pub use progress::{progress_body, ProgressReporter};
pub use state::{UploadState, UploadingGuard};
pub use strategy::{Destination, UploadStrategy};
pub use task::{UploadEvent, UploadTask};
