use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A file picked for upload, held in memory together with what the caller declared about it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub declared_mime_type: String,
    pub declared_size_bytes: u64,
    pub data: Bytes,
}

impl UploadRequest {
    /// Build a request whose declared size is the length of `data`.
    pub fn new(
        file_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            file_name: file_name.into(),
            declared_mime_type: declared_mime_type.into(),
            declared_size_bytes: data.len() as u64,
            data,
        }
    }

    /// Size the guards check: the larger of the declared size and the bytes actually held.
    pub fn size_bytes(&self) -> u64 {
        self.declared_size_bytes.max(self.data.len() as u64)
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Stable, externally resolvable URL of the stored asset
    pub public_url: String,
    /// Encoding reported by the host, informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_format: Option<String>,
}

/// Upload progress in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct UploadProgress {
    pub percent_complete: u8,
}

impl UploadProgress {
    /// `floor(sent / total * 100)`, clamped to 100. An empty total counts as complete.
    pub fn from_bytes(sent: u64, total: u64) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((sent.min(total) as u128 * 100) / total as u128) as u8
        };
        Self {
            percent_complete: percent,
        }
    }
}

/// Request body for the presigned write target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRequest {
    pub file_name: String,
    pub file_type: String,
}

/// Short-lived write target issued by the internal API.
///
/// Deliberately not `Clone`: the PUT phase takes it by value, so a failed
/// attempt cannot hand the same target to a second PUT.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedTarget {
    pub upload_url: String,
    pub public_url: String,
}

/// Success body of the hosted upload endpoint. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
pub struct HostedUploadResponse {
    pub secure_url: String,
    #[serde(default)]
    pub format: Option<String>,
}

/// Error body of the hosted upload endpoint: `{ "error": { "message": "..." } }`.
#[derive(Debug, Deserialize)]
pub struct HostedErrorResponse {
    pub error: HostedErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct HostedErrorDetail {
    pub message: String,
}
