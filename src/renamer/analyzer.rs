use super::cascade;
use super::context::RenameContext;
use super::patterns::{
    ANIME_KEYWORDS, DOCUMENTARY_KEYWORDS, LANGUAGE_GROUPS, PATTERNS, SUBTITLE_TAGS,
    VARIETY_KEYWORDS, is_video_extension,
};
use super::types::{MediaInfo, MediaType, QualityLevel};

/// Analyzer turning a raw filename (plus batch context) into a [`MediaInfo`]
/// record.
///
/// Irregular names are classified by the ordered cascade first; only names no
/// cascade rule claims go through token-by-token lexical extraction. The
/// result is always a complete record: unknown fields carry their sentinel
/// values.
pub struct MediaAnalyzer;

impl MediaAnalyzer {
    /// Analyze a filename with batch/directory context.
    #[must_use]
    pub fn analyze(filename: &str, context: &RenameContext) -> MediaInfo {
        let mut info = MediaInfo::new(filename);

        info.extension = extract_extension(filename);
        if !is_video_extension(&info.extension) {
            // Non-video input: bare record, no classification
            return info;
        }

        if let Some(fields) = cascade::classify_irregular(filename, context) {
            let forced_type = fields.media_type.is_some();
            fields.apply(&mut info);
            if !forced_type {
                info.media_type = Self::determine_media_type(&info);
            }
            return info;
        }

        let stem = file_stem(filename);
        let clean = Self::clean_name(stem);

        info.year = Self::extract_year(&clean);
        (info.season, info.episode) = Self::extract_season_episode(&clean);
        info.quality = Self::extract_quality(stem);
        info.source = Self::extract_source(stem);
        info.codec = Self::extract_codec(stem);
        info.audio = Self::extract_audio(stem);
        info.language = Self::extract_language(stem);
        info.subtitle = Self::extract_subtitle(stem);
        info.group = Self::extract_group(stem);
        info.title = Self::extract_title(&clean);
        info.media_type = Self::determine_media_type(&info);

        info
    }

    /// Delimiters become spaces, whitespace collapses, extension is gone.
    fn clean_name(stem: &str) -> String {
        let p = &*PATTERNS;
        let name = p.separators.replace_all(stem, " ");
        p.whitespace.replace_all(&name, " ").trim().to_string()
    }

    fn extract_year(clean: &str) -> Option<i32> {
        PATTERNS
            .year
            .captures(clean)
            .and_then(|caps| caps[1].parse().ok())
    }

    fn extract_season_episode(clean: &str) -> (Option<u32>, Option<u32>) {
        let p = &*PATTERNS;

        // SxxExx is the most specific form and wins outright
        if let Some(caps) = p.season_episode.captures(clean) {
            let season = caps[1].parse().ok();
            let episode = caps[2].parse().ok();
            return (season, episode);
        }

        let mut season = p
            .cjk_season
            .captures(clean)
            .and_then(|caps| caps[1].parse().ok());
        let mut episode = p
            .cjk_episode
            .captures(clean)
            .and_then(|caps| caps[1].parse().ok());

        if season.is_none() {
            season = p
                .word_season
                .captures(clean)
                .and_then(|caps| caps[1].parse().ok());
        }
        if episode.is_none() {
            episode = p
                .word_episode
                .captures(clean)
                .and_then(|caps| caps[1].parse().ok());
        }

        (season, episode)
    }

    fn extract_quality(stem: &str) -> QualityLevel {
        PATTERNS
            .quality
            .captures(stem)
            .map_or(QualityLevel::Unknown, |caps| {
                QualityLevel::from_token(&caps[1])
            })
    }

    fn extract_source(stem: &str) -> String {
        PATTERNS
            .source
            .captures(stem)
            .map_or_else(String::new, |caps| caps[1].to_string())
    }

    fn extract_codec(stem: &str) -> String {
        PATTERNS
            .codec
            .captures(stem)
            .map_or_else(String::new, |caps| caps[1].to_string())
    }

    fn extract_audio(stem: &str) -> String {
        PATTERNS
            .audio
            .captures(stem)
            .map_or_else(String::new, |caps| caps[1].to_string())
    }

    fn extract_language(stem: &str) -> String {
        for (language, keywords) in LANGUAGE_GROUPS {
            if keywords.iter().any(|k| stem.contains(k)) {
                return (*language).to_string();
            }
        }
        String::new()
    }

    fn extract_subtitle(stem: &str) -> String {
        SUBTITLE_TAGS
            .iter()
            .find(|tag| stem.contains(*tag))
            .map_or_else(String::new, |tag| (*tag).to_string())
    }

    /// Trailing bracketed token, unless it is really a technical tag.
    fn extract_group(stem: &str) -> String {
        let p = &*PATTERNS;
        if let Some(caps) = p.trailing_group.captures(stem) {
            let group = caps[1].trim();
            if !p.quality.is_match(group) && !p.codec.is_match(group) && !p.audio.is_match(group) {
                return group.to_string();
            }
        }
        String::new()
    }

    /// The cleaned name minus every extracted token is the title.
    fn extract_title(clean: &str) -> String {
        let p = &*PATTERNS;

        let mut title = p.year.replace_all(clean, "").to_string();
        title = p.season_episode.replace_all(&title, "").to_string();
        title = p.cjk_season.replace_all(&title, "").to_string();
        title = p.cjk_episode.replace_all(&title, "").to_string();
        title = p.word_season.replace_all(&title, "").to_string();
        title = p.word_episode.replace_all(&title, "").to_string();
        title = p.quality.replace_all(&title, "").to_string();
        title = p.source.replace_all(&title, "").to_string();
        title = p.codec.replace_all(&title, "").to_string();
        title = p.audio.replace_all(&title, "").to_string();

        title = p.dots.replace_all(&title, ".").to_string();
        let title = title.trim_matches('.');
        let title = p.whitespace.replace_all(title, " ").trim().to_string();

        if title.is_empty() {
            "Unknown".to_string()
        } else {
            title
        }
    }

    /// Derive the media type from the record's own fields.
    ///
    /// Season/episode presence means series-like, refined by title keywords;
    /// otherwise documentary keywords are checked before defaulting to movie.
    pub(crate) fn determine_media_type(info: &MediaInfo) -> MediaType {
        if info.season.is_some() || info.episode.is_some() {
            if VARIETY_KEYWORDS.iter().any(|k| info.title.contains(k)) {
                return MediaType::VarietyShow;
            }
            if ANIME_KEYWORDS.iter().any(|k| info.title.contains(k)) {
                return MediaType::Anime;
            }
            return MediaType::TvSeries;
        }

        if DOCUMENTARY_KEYWORDS.iter().any(|k| info.title.contains(k)) {
            return MediaType::Documentary;
        }

        MediaType::Movie
    }
}

/// Lower-cased, dot-prefixed extension; empty when the name has none.
fn extract_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            format!(".{}", ext.to_lowercase())
        }
        _ => String::new(),
    }
}

/// Filename without its final extension.
fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}
