//! Media vocabulary shared by the generation pipeline and its collaborators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output aspect ratio requested from a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AspectRatio {
    /// 9:16, the default for short-form feeds.
    #[default]
    Vertical,
    Horizontal,
    Square,
    Portrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Vertical => "9:16",
            AspectRatio::Horizontal => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported aspect ratio: {0}")]
pub struct UnknownAspectRatio(pub String);

impl FromStr for AspectRatio {
    type Err = UnknownAspectRatio;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "9:16" => Ok(AspectRatio::Vertical),
            "16:9" => Ok(AspectRatio::Horizontal),
            "1:1" => Ok(AspectRatio::Square),
            "3:4" => Ok(AspectRatio::Portrait),
            other => Err(UnknownAspectRatio(other.to_string())),
        }
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.as_str().to_string()
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = UnknownAspectRatio;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The fixed set of top-level generation flows run every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationKind {
    TextToVideo,
    ImageToVideo,
    PortraitToVideo,
}

impl GenerationKind {
    pub const ALL: [GenerationKind; 3] = [
        GenerationKind::TextToVideo,
        GenerationKind::PortraitToVideo,
        GenerationKind::ImageToVideo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::TextToVideo => "text-to-video",
            GenerationKind::ImageToVideo => "image-to-video",
            GenerationKind::PortraitToVideo => "portrait-to-video",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_parses_provider_strings() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Vertical);
        assert_eq!(" 16:9 ".parse::<AspectRatio>().unwrap(), AspectRatio::Horizontal);
        assert!("4:5".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn aspect_ratio_serializes_as_ratio_string() {
        let v = serde_json::to_value(AspectRatio::Square).unwrap();
        assert_eq!(v, serde_json::json!("1:1"));
        assert!(serde_json::from_value::<AspectRatio>(serde_json::json!("2:1")).is_err());
    }

    #[test]
    fn generation_kind_uses_log_tags() {
        let v = serde_json::to_value(GenerationKind::PortraitToVideo).unwrap();
        assert_eq!(v, serde_json::json!("portrait-to-video"));
        assert_eq!(GenerationKind::TextToVideo.to_string(), "text-to-video");
    }
}
