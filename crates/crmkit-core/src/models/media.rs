use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Media classes accepted by the hosted upload service.
///
/// Each class maps to its own upload endpoint, unsigned preset and size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// MIME prefix accepted when no explicit allow-list is configured.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/",
            MediaKind::Video => "video/",
        }
    }

    /// Path segment appended to `/v1_1/{cloud_name}` on the hosted service.
    pub fn upload_path(&self) -> &'static str {
        match self {
            MediaKind::Image => "upload",
            MediaKind::Video => "video/upload",
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" | "images" => Ok(MediaKind::Image),
            "video" | "videos" => Ok(MediaKind::Video),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plural_and_mixed_case() {
        assert_eq!("Images".parse::<MediaKind>().unwrap(), MediaKind::Image);
        assert_eq!("video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert!("audio".parse::<MediaKind>().is_err());
    }

    #[test]
    fn video_uses_dedicated_endpoint() {
        assert_eq!(MediaKind::Image.upload_path(), "upload");
        assert_eq!(MediaKind::Video.upload_path(), "video/upload");
        assert_eq!(MediaKind::Video.to_string(), "video");
    }
}
