use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{MediaKind, UploadRequest};

/// Size and type policy for one media class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaPolicy {
    pub kind: MediaKind,
    pub max_size_bytes: u64,
    /// Explicit MIME allow-list; when empty any type under the kind's prefix is accepted
    pub allowed_content_types: Vec<String>,
}

impl MediaPolicy {
    pub fn new(kind: MediaKind, max_size_bytes: u64, allowed_content_types: Vec<String>) -> Self {
        Self {
            kind,
            max_size_bytes,
            allowed_content_types,
        }
    }

    /// Validate file size
    pub fn validate_size(&self, size: u64) -> PipelineResult<()> {
        if size == 0 {
            return Err(PipelineError::EmptyFile);
        }

        if size > self.max_size_bytes {
            return Err(PipelineError::FileTooLarge {
                size,
                max: self.max_size_bytes,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> PipelineResult<()> {
        let normalized = content_type.trim().to_lowercase();

        let accepted = if self.allowed_content_types.is_empty() {
            normalized.starts_with(self.kind.mime_prefix())
        } else {
            self.allowed_content_types.iter().any(|ct| ct == &normalized)
        };

        if !accepted {
            let expected = if self.allowed_content_types.is_empty() {
                format!("{}*", self.kind.mime_prefix())
            } else {
                self.allowed_content_types.join(", ")
            };
            return Err(PipelineError::UnsupportedMediaType {
                content_type: content_type.to_string(),
                expected,
            });
        }

        Ok(())
    }

    /// Run every check. Size goes first so an oversized file reports its limit
    /// even when its type is also wrong.
    pub fn check(&self, request: &UploadRequest) -> PipelineResult<()> {
        if request.data.is_empty() {
            return Err(PipelineError::EmptyFile);
        }
        self.validate_size(request.size_bytes())?;
        self.validate_content_type(&request.declared_mime_type)?;
        Ok(())
    }
}

/// Size guard for uploads that have no media class, e.g. presigned object storage.
pub fn check_size(request: &UploadRequest, max_size_bytes: u64) -> PipelineResult<()> {
    if request.data.is_empty() {
        return Err(PipelineError::EmptyFile);
    }
    let size = request.size_bytes();
    if size > max_size_bytes {
        return Err(PipelineError::FileTooLarge {
            size,
            max: max_size_bytes,
        });
    }
    Ok(())
}

/// Best-effort MIME type for a file name, used when the caller cannot declare one.
pub fn content_type_for_path(path: impl AsRef<Path>) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        // Documents
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_policy() -> MediaPolicy {
        MediaPolicy::new(MediaKind::Image, 1024 * 1024, vec![])
    }

    #[test]
    fn rejects_oversized_file_with_ceiling() {
        let request = UploadRequest::new("big.png", "image/png", vec![0u8; 1024 * 1024 + 1]);
        assert_eq!(
            image_policy().check(&request),
            Err(PipelineError::FileTooLarge {
                size: 1024 * 1024 + 1,
                max: 1024 * 1024,
            })
        );
    }

    #[test]
    fn accepts_file_at_exact_ceiling() {
        let request = UploadRequest::new("edge.png", "image/png", vec![0u8; 1024 * 1024]);
        assert!(image_policy().check(&request).is_ok());
    }

    #[test]
    fn size_is_checked_before_type() {
        let request = UploadRequest::new("big.mp4", "video/mp4", vec![0u8; 2 * 1024 * 1024]);
        assert!(matches!(
            image_policy().check(&request),
            Err(PipelineError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_wrong_mime_prefix() {
        let request = UploadRequest::new("clip.mp4", "video/mp4", vec![1u8; 10]);
        match image_policy().check(&request) {
            Err(PipelineError::UnsupportedMediaType { expected, .. }) => {
                assert_eq!(expected, "image/*")
            }
            other => panic!("expected UnsupportedMediaType, got {:?}", other),
        }
    }

    #[test]
    fn explicit_allow_list_wins_over_prefix() {
        let policy = MediaPolicy::new(
            MediaKind::Image,
            1024,
            vec!["image/png".to_string(), "image/webp".to_string()],
        );
        assert!(policy.validate_content_type("IMAGE/PNG").is_ok());
        assert!(policy.validate_content_type("image/gif").is_err());
    }

    #[test]
    fn empty_file_is_rejected() {
        let request = UploadRequest::new("empty.png", "image/png", Vec::new());
        assert_eq!(image_policy().check(&request), Err(PipelineError::EmptyFile));
        assert_eq!(check_size(&request, 10), Err(PipelineError::EmptyFile));
    }

    #[test]
    fn understated_size_does_not_bypass_ceiling() {
        let mut request = UploadRequest::new("big.png", "image/png", vec![0u8; 3 * 1024 * 1024]);
        request.declared_size_bytes = 10;

        let expected = Err(PipelineError::FileTooLarge {
            size: 3 * 1024 * 1024,
            max: 1024 * 1024,
        });
        assert_eq!(image_policy().check(&request), expected);
        assert_eq!(check_size(&request, 1024 * 1024), expected);
    }

    #[test]
    fn declared_size_without_bytes_is_empty() {
        let mut request = UploadRequest::new("ghost.png", "image/png", Vec::new());
        request.declared_size_bytes = 512;

        assert_eq!(image_policy().check(&request), Err(PipelineError::EmptyFile));
        assert_eq!(check_size(&request, 1024), Err(PipelineError::EmptyFile));
    }

    #[test]
    fn maps_common_extensions() {
        assert_eq!(content_type_for_path("banner.JPG"), "image/jpeg");
        assert_eq!(content_type_for_path("promo.mov"), "video/quicktime");
        assert_eq!(content_type_for_path("noext"), "application/octet-stream");
    }
}
