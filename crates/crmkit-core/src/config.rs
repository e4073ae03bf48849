//! Configuration module
//!
//! Upload and import settings are read from the environment at call time.
//! Loading never fails because an optional value is absent; resolving a
//! profile that needs the value does, with [`PipelineError::ConfigMissing`],
//! before any network call is attempted.

use std::env;

use crate::error::{PipelineError, PipelineResult};
use crate::models::MediaKind;
use crate::validation::MediaPolicy;

// Common constants
const MAX_IMAGE_SIZE_MB: u64 = 1;
const MAX_VIDEO_SIZE_MB: u64 = 50;
const MAX_OBJECT_SIZE_MB: u64 = 50;
const UPLOAD_CHUNK_SIZE_KB: usize = 64;
const HTTP_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HOSTED_API_BASE: &str = "https://api.cloudinary.com";

pub const API_URL_VAR: &str = "CRMKIT_API_URL";
pub const CLOUD_NAME_VAR: &str = "CLOUDINARY_CLOUD_NAME";
pub const IMAGE_PRESET_VAR: &str = "CLOUDINARY_UPLOAD_PRESET";
pub const VIDEO_PRESET_VAR: &str = "CLOUDINARY_VIDEO_UPLOAD_PRESET";

/// Everything the hosted uploader needs for one media class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostedProfile {
    pub kind: MediaKind,
    /// Full upload endpoint, e.g. `https://api.cloudinary.com/v1_1/demo/video/upload`
    pub endpoint: String,
    /// Unsigned upload preset
    pub preset: String,
    pub policy: MediaPolicy,
    /// Encoding the preset's incoming transformation is expected to produce
    pub expected_format: Option<String>,
}

/// Pipeline configuration.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub api_url: Option<String>,
    pub cloud_name: Option<String>,
    pub image_upload_preset: Option<String>,
    pub video_upload_preset: Option<String>,
    pub hosted_api_base: String,
    pub max_image_size_bytes: u64,
    pub max_video_size_bytes: u64,
    /// Ceiling for presigned object-storage uploads
    pub max_object_size_bytes: u64,
    pub image_allowed_content_types: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    pub image_expected_format: Option<String>,
    pub video_expected_format: Option<String>,
    pub chunk_size_bytes: usize,
    pub http_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_list(value: Option<String>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a size in megabytes. Unparseable or overflowing values fall back to `default_mb`.
fn megabytes(value: Option<String>, default_mb: u64) -> u64 {
    value
        .and_then(|s| s.trim().parse::<u64>().ok())
        .and_then(|mb| mb.checked_mul(1024 * 1024))
        .unwrap_or(default_mb * 1024 * 1024)
}

impl PipelineConfig {
    /// Load from the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_url: get(API_URL_VAR)
                .or_else(|| get("API_URL"))
                .map(|url| url.trim_end_matches('/').to_string()),
            cloud_name: get(CLOUD_NAME_VAR),
            image_upload_preset: get(IMAGE_PRESET_VAR),
            video_upload_preset: get(VIDEO_PRESET_VAR),
            hosted_api_base: get("CLOUDINARY_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_HOSTED_API_BASE.to_string()),
            max_image_size_bytes: megabytes(get("MAX_IMAGE_SIZE_MB"), MAX_IMAGE_SIZE_MB),
            max_video_size_bytes: megabytes(get("MAX_VIDEO_SIZE_MB"), MAX_VIDEO_SIZE_MB),
            max_object_size_bytes: megabytes(get("MAX_OBJECT_SIZE_MB"), MAX_OBJECT_SIZE_MB),
            image_allowed_content_types: parse_list(get("IMAGE_ALLOWED_CONTENT_TYPES")),
            video_allowed_content_types: parse_list(get("VIDEO_ALLOWED_CONTENT_TYPES")),
            image_expected_format: get("IMAGE_EXPECTED_FORMAT").map(|s| s.to_lowercase()),
            video_expected_format: get("VIDEO_EXPECTED_FORMAT").map(|s| s.to_lowercase()),
            chunk_size_bytes: get("UPLOAD_CHUNK_SIZE_KB")
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|&kb| kb > 0)
                .and_then(|kb| kb.checked_mul(1024))
                .unwrap_or(UPLOAD_CHUNK_SIZE_KB * 1024),
            http_timeout_secs: get("HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_TIMEOUT_SECS),
        }
    }

    /// Base URL of the internal API.
    pub fn api_url(&self) -> PipelineResult<&str> {
        self.api_url
            .as_deref()
            .ok_or_else(|| PipelineError::ConfigMissing(API_URL_VAR.to_string()))
    }

    /// Size and type policy for a media class.
    pub fn media_policy(&self, kind: MediaKind) -> MediaPolicy {
        match kind {
            MediaKind::Image => MediaPolicy::new(
                kind,
                self.max_image_size_bytes,
                self.image_allowed_content_types.clone(),
            ),
            MediaKind::Video => MediaPolicy::new(
                kind,
                self.max_video_size_bytes,
                self.video_allowed_content_types.clone(),
            ),
        }
    }

    /// Resolve the hosted upload profile for a media class.
    pub fn hosted_profile(&self, kind: MediaKind) -> PipelineResult<HostedProfile> {
        let (preset, preset_var, expected_format) = match kind {
            MediaKind::Image => (
                self.image_upload_preset.as_ref(),
                IMAGE_PRESET_VAR,
                self.image_expected_format.clone(),
            ),
            MediaKind::Video => (
                self.video_upload_preset.as_ref(),
                VIDEO_PRESET_VAR,
                self.video_expected_format.clone(),
            ),
        };

        let (cloud_name, preset) = match (self.cloud_name.as_ref(), preset) {
            (Some(cloud_name), Some(preset)) => (cloud_name, preset),
            (None, Some(_)) => return Err(PipelineError::ConfigMissing(CLOUD_NAME_VAR.to_string())),
            (Some(_), None) => return Err(PipelineError::ConfigMissing(preset_var.to_string())),
            (None, None) => {
                return Err(PipelineError::ConfigMissing(format!(
                    "{}, {}",
                    CLOUD_NAME_VAR, preset_var
                )))
            }
        };

        Ok(HostedProfile {
            kind,
            endpoint: format!(
                "{}/v1_1/{}/{}",
                self.hosted_api_base,
                cloud_name,
                kind.upload_path()
            ),
            preset: preset.clone(),
            policy: self.media_policy(kind),
            expected_format,
        })
    }
}
