//! Domain models shared by the upload and import pipelines.

pub mod credential;
pub mod import;
pub mod media;
pub mod upload;

pub use credential::Credential;
pub use import::CsvRow;
pub use media::MediaKind;
pub use upload::{
    HostedErrorDetail, HostedErrorResponse, HostedUploadResponse, PresignedTarget,
    PresignedUrlRequest, UploadProgress, UploadRequest, UploadResult,
};
