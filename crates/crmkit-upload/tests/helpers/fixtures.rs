use crmkit_core::UploadRequest;

/// ASCII payload so request bodies can be matched as text
pub fn payload(len: usize) -> Vec<u8> {
    b"crmkit-fixture-"
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

pub fn png_request(name: &str, len: usize) -> UploadRequest {
    UploadRequest::new(name, "image/png", payload(len))
}

pub fn mp4_request(name: &str, len: usize) -> UploadRequest {
    UploadRequest::new(name, "video/mp4", payload(len))
}
