use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Provider resource type of an uploaded asset.
///
/// `Auto` lets the provider detect the type; the provider always answers with
/// a concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Auto,
    Image,
    Video,
    Raw,
}

impl ResourceKind {
    /// Kind implied by a MIME type: `video/*` is a video, everything else an image.
    pub fn for_content_type(content_type: &str) -> Self {
        if content_type.to_lowercase().starts_with("video/") {
            ResourceKind::Video
        } else {
            ResourceKind::Image
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Auto => "auto",
            ResourceKind::Image => "image",
            ResourceKind::Video => "video",
            ResourceKind::Raw => "raw",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ResourceKind::Auto),
            "image" => Ok(ResourceKind::Image),
            "video" => Ok(ResourceKind::Video),
            "raw" => Ok(ResourceKind::Raw),
            _ => Err(anyhow::anyhow!("Invalid resource type: {}", s)),
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_content_type() {
        assert_eq!(ResourceKind::for_content_type("video/mp4"), ResourceKind::Video);
        assert_eq!(ResourceKind::for_content_type("image/png"), ResourceKind::Image);
        assert_eq!(ResourceKind::for_content_type("VIDEO/WEBM"), ResourceKind::Video);
    }

    #[test]
    fn kind_parse_and_display() {
        assert_eq!("Image".parse::<ResourceKind>().unwrap(), ResourceKind::Image);
        assert_eq!(ResourceKind::Raw.to_string(), "raw");
        assert!("pdf".parse::<ResourceKind>().is_err());
    }
}
