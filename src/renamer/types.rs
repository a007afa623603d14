use serde::{Deserialize, Serialize};

/// Media type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Unknown,
    TvSeries,
    Movie,
    VarietyShow,
    Documentary,
    Anime,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::TvSeries => write!(f, "tv_series"),
            Self::Movie => write!(f, "movie"),
            Self::VarietyShow => write!(f, "variety_show"),
            Self::Documentary => write!(f, "documentary"),
            Self::Anime => write!(f, "anime"),
        }
    }
}

/// Video quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    #[default]
    Unknown,
    Sd,
    Hd,
    Fhd,
    Uhd,
}

impl QualityLevel {
    /// Resolution label used when rendering filenames; empty for unknown.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sd => "480p",
            Self::Hd => "720p",
            Self::Fhd => "1080p",
            Self::Uhd => "2160p",
            Self::Unknown => "",
        }
    }

    /// Map a quality token found in a filename to its tier.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "4k" | "2160p" | "uhd" => Self::Uhd,
            "1080p" | "fhd" => Self::Fhd,
            "720p" | "hd" => Self::Hd,
            "480p" | "sd" => Self::Sd,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Structured media record extracted from a filename.
///
/// Produced by [`crate::renamer::MediaAnalyzer::analyze`] and consumed by the
/// formatter. Unknown string fields are empty, unknown numeric fields are
/// `None`; `title` falls back to a sentinel rather than staying empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MediaInfo {
    /// Best-effort series/movie title
    pub title: String,
    /// The filename this record was extracted from
    pub original_filename: String,
    /// Derived media type
    pub media_type: MediaType,
    /// Release year
    pub year: Option<i32>,
    /// Broadcast month (variety shows with a date in the name)
    pub month: Option<u32>,
    /// Broadcast day (variety shows with a date in the name)
    pub day: Option<u32>,
    /// Season number (1-indexed)
    pub season: Option<u32>,
    /// Episode number (1-indexed)
    pub episode: Option<u32>,
    /// Title of the single episode, when the name carries one
    pub episode_title: String,
    /// Raw variety-show period number (the 8 in 第8期)
    pub base_episode: Option<u32>,
    /// Variety-show part marker (上/中/下) or special-version keyword
    pub part_suffix: String,
    /// Quality tier
    pub quality: QualityLevel,
    /// Source tag (WEB-DL, BluRay, HDTV, ...)
    pub source: String,
    /// Video codec (H264, x265, ...)
    pub codec: String,
    /// Audio tag (AAC, DTS, ...)
    pub audio: String,
    /// Language keyword group (chinese, english, ...)
    pub language: String,
    /// Subtitle tag (中字, 英字, ...)
    pub subtitle: String,
    /// Release group
    pub group: String,
    /// Lower-cased, dot-prefixed file extension
    pub extension: String,
}

impl MediaInfo {
    /// Create an empty record carrying only provenance.
    #[must_use]
    pub fn new(original_filename: impl Into<String>) -> Self {
        Self {
            original_filename: original_filename.into(),
            ..Default::default()
        }
    }

    /// A variety-show special version has a version keyword but no ordinary
    /// episode number.
    #[must_use]
    pub fn is_special_version(&self) -> bool {
        self.base_episode.is_none() && !self.part_suffix.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_from_token() {
        assert_eq!(QualityLevel::from_token("4K"), QualityLevel::Uhd);
        assert_eq!(QualityLevel::from_token("2160p"), QualityLevel::Uhd);
        assert_eq!(QualityLevel::from_token("1080p"), QualityLevel::Fhd);
        assert_eq!(QualityLevel::from_token("FHD"), QualityLevel::Fhd);
        assert_eq!(QualityLevel::from_token("720p"), QualityLevel::Hd);
        assert_eq!(QualityLevel::from_token("sd"), QualityLevel::Sd);
        assert_eq!(QualityLevel::from_token("8K"), QualityLevel::Unknown);
    }

    #[test]
    fn test_quality_label() {
        assert_eq!(QualityLevel::Uhd.label(), "2160p");
        assert_eq!(QualityLevel::Unknown.label(), "");
    }

    #[test]
    fn test_special_version_flag() {
        let mut info = MediaInfo::new("show.mp4");
        assert!(!info.is_special_version());

        info.part_suffix = "纯享版".to_string();
        assert!(info.is_special_version());

        info.base_episode = Some(8);
        assert!(!info.is_special_version());
    }

    #[test]
    fn test_media_type_serde_names() {
        let json = serde_json::to_string(&MediaType::VarietyShow).unwrap();
        assert_eq!(json, "\"variety_show\"");
    }
}
