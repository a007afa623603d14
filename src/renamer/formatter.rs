//! Template-driven filename synthesis with mandatory post-render cleanup.

use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::warn;

use super::types::{MediaInfo, MediaType};
use super::{RenameError, Result};

/// Built-in formatting styles, each a per-media-type template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatStyle {
    #[default]
    Standard,
    Simple,
    Chinese,
}

impl FromStr for FormatStyle {
    type Err = RenameError;

    /// Lenient style names: `tv_simple` and `simple` both select the simple
    /// table; `plex`/`emby` use the standard one.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.to_lowercase();
        let suffix = name.rsplit('_').next().unwrap_or(name.as_str());
        match suffix {
            "standard" | "plex" | "emby" => Ok(Self::Standard),
            "simple" => Ok(Self::Simple),
            "chinese" => Ok(Self::Chinese),
            _ => Err(RenameError::TemplateNotFound(s.to_string())),
        }
    }
}

/// The fixed template variable set; anything else fails the render.
pub const TEMPLATE_VARIABLES: &[&str] = &[
    "title",
    "season",
    "episode",
    "year",
    "quality",
    "source",
    "codec",
    "audio",
    "language",
    "subtitle",
    "group",
    "extension",
    "month",
    "day",
    "episode_title",
    "base_episode",
    "part_suffix",
];

fn builtin_template(style: FormatStyle, media_type: MediaType) -> &'static str {
    match style {
        FormatStyle::Standard => match media_type {
            MediaType::TvSeries => {
                "{title}.S{season:02d}E{episode:02d}.{quality}.{source}.{codec}.{extension}"
            }
            MediaType::VarietyShow => {
                "{title}.{year}{month:02d}{day:02d}.第{base_episode}期{part_suffix}.{quality}.{extension}"
            }
            MediaType::Documentary => "{title}.{year}.{quality}.{source}.{extension}",
            MediaType::Anime => "{title}.第{episode:02d}话.{quality}.{extension}",
            MediaType::Movie | MediaType::Unknown => {
                "{title}.{year}.{quality}.{source}.{codec}.{extension}"
            }
        },
        FormatStyle::Simple => match media_type {
            MediaType::TvSeries => "{title}.S{season:02d}E{episode:02d}.{extension}",
            MediaType::VarietyShow => "{title}.第{base_episode}期{part_suffix}.{extension}",
            MediaType::Documentary => "{title}.{extension}",
            MediaType::Anime => "{title}.第{episode:02d}话.{extension}",
            MediaType::Movie | MediaType::Unknown => "{title}.{year}.{extension}",
        },
        FormatStyle::Chinese => match media_type {
            MediaType::TvSeries => "{title} - S{season:02d}E{episode:02d} - 第 {episode} 集.{extension}",
            MediaType::VarietyShow => "{title} - 第{base_episode}期{part_suffix}.{extension}",
            MediaType::Documentary => "{title} - 纪录片.{extension}",
            MediaType::Anime => "{title} - 第{episode:02d}话.{extension}",
            MediaType::Movie | MediaType::Unknown => "{title} - {year}年.{extension}",
        },
    }
}

/// Template used when the record is a variety special version (no ordinary
/// episode number, only a version keyword).
fn special_variety_template(style: FormatStyle) -> &'static str {
    match style {
        FormatStyle::Simple => "{title}.{part_suffix}.{extension}",
        FormatStyle::Chinese => "{title} - {part_suffix}.{extension}",
        FormatStyle::Standard => "{title}.{year}{month:02d}{day:02d}.{part_suffix}.{quality}.{extension}",
    }
}

/// A template variable value: free text, or a number that supports
/// zero-padding.
enum Value {
    Text(String),
    Number(Option<i64>),
}

fn lookup(info: &MediaInfo, name: &str) -> Option<Value> {
    let value = match name {
        "title" => Value::Text(if info.title.is_empty() {
            "Unknown".to_string()
        } else {
            info.title.clone()
        }),
        "season" => Value::Number(Some(i64::from(info.season.unwrap_or(1)))),
        "episode" => Value::Number(Some(i64::from(info.episode.unwrap_or(1)))),
        "year" => Value::Number(info.year.map(i64::from)),
        "month" => Value::Number(info.month.map(i64::from)),
        "day" => Value::Number(info.day.map(i64::from)),
        "base_episode" => {
            if info.is_special_version() {
                // Special versions render without a period number
                Value::Text(String::new())
            } else {
                Value::Number(Some(i64::from(
                    info.base_episode.or(info.episode).unwrap_or(1),
                )))
            }
        }
        "quality" => Value::Text(info.quality.label().to_string()),
        "source" => Value::Text(info.source.clone()),
        "codec" => Value::Text(info.codec.clone()),
        "audio" => Value::Text(info.audio.clone()),
        "language" => Value::Text(info.language.clone()),
        "subtitle" => Value::Text(info.subtitle.clone()),
        "group" => Value::Text(info.group.clone()),
        "part_suffix" => Value::Text(info.part_suffix.clone()),
        "episode_title" => Value::Text(info.episode_title.clone()),
        "extension" => {
            let ext = info.extension.trim_start_matches('.');
            Value::Text(if ext.is_empty() {
                "mp4".to_string()
            } else {
                ext.to_string()
            })
        }
        _ => return None,
    };
    Some(value)
}

/// Substitute `{var}` / `{var:02d}` placeholders from a record.
///
/// Fails on unknown variables, malformed braces, and padding directives
/// applied to text or missing numerics; callers fall back or reject.
pub(crate) fn render(template: &str, info: &MediaInfo) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices();

    while let Some((start, c)) = chars.next() {
        if c != '{' {
            output.push(c);
            continue;
        }

        let rest = &template[start + 1..];
        let Some(end) = rest.find('}') else {
            return Err(RenameError::InvalidTemplate(
                "unmatched '{' in template".to_string(),
            ));
        };
        let placeholder = &rest[..end];

        let (name, spec) = match placeholder.split_once(':') {
            Some((name, spec)) => (name, spec),
            None => (placeholder, ""),
        };

        let Some(value) = lookup(info, name) else {
            return Err(RenameError::InvalidTemplate(format!(
                "unknown template variable: {name}"
            )));
        };

        output.push_str(&render_value(name, &value, spec)?);

        // Skip the consumed placeholder body and closing brace
        for _ in 0..placeholder.chars().count() + 1 {
            chars.next();
        }
    }

    Ok(output)
}

fn render_value(name: &str, value: &Value, spec: &str) -> Result<String> {
    let digits = spec.strip_suffix('d').unwrap_or(spec);
    if !digits.is_empty() && !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(RenameError::InvalidTemplate(format!(
            "bad format spec for {name}: {spec}"
        )));
    }
    let width: usize = if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(0)
    };
    let padded = !spec.is_empty();

    match value {
        Value::Text(text) => {
            if padded {
                return Err(RenameError::InvalidTemplate(format!(
                    "numeric format spec on text variable {name}"
                )));
            }
            Ok(text.clone())
        }
        Value::Number(Some(n)) => Ok(format!("{n:0width$}")),
        Value::Number(None) => {
            if padded {
                return Err(RenameError::InvalidTemplate(format!(
                    "missing value for padded variable {name}"
                )));
            }
            Ok(String::new())
        }
    }
}

static EMPTY_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\.").expect("Invalid empty_segment regex"));
static DOT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("Invalid dot_runs regex"));

/// Collapse dot runs and empty segments; idempotent.
#[must_use]
pub fn cleanup_name(name: &str) -> String {
    let mut cleaned = DOT_RUNS.replace_all(name, ".").to_string();
    while EMPTY_SEGMENT.is_match(&cleaned) {
        cleaned = EMPTY_SEGMENT.replace_all(&cleaned, ".").to_string();
    }
    cleaned.trim_matches('.').to_string()
}

/// Renders records into normalized filenames; never fails.
pub struct MediaFormatter;

impl MediaFormatter {
    /// Render through a built-in style table.
    #[must_use]
    pub fn format(info: &MediaInfo, style: FormatStyle) -> String {
        let template = if info.is_special_version() {
            special_variety_template(style)
        } else {
            builtin_template(style, info.media_type)
        };
        Self::render_or_fallback(info, template)
    }

    /// Render through an explicit template body.
    #[must_use]
    pub fn format_with(info: &MediaInfo, body: &str) -> String {
        if info.is_special_version() {
            // Special versions always use the dedicated shape
            return Self::render_or_fallback(info, special_variety_template(FormatStyle::Standard));
        }
        Self::render_or_fallback(info, body)
    }

    fn render_or_fallback(info: &MediaInfo, template: &str) -> String {
        match render(template, info) {
            Ok(name) => cleanup_name(&name),
            Err(err) => {
                warn!("Template render failed ({err}), using fallback name");
                cleanup_name(&Self::fallback(info))
            }
        }
    }

    /// Minimal deterministic name used when a template cannot render.
    fn fallback(info: &MediaInfo) -> String {
        let title = if info.title.is_empty() {
            "Unknown"
        } else {
            info.title.as_str()
        };
        let ext = info.extension.trim_start_matches('.');
        let ext = if ext.is_empty() { "mp4" } else { ext };

        if let (Some(season), Some(episode)) = (info.season, info.episode) {
            format!("{title}.S{season:02}E{episode:02}.{ext}")
        } else if let Some(year) = info.year {
            format!("{title}.{year}.{ext}")
        } else {
            format!("{title}.{ext}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renamer::types::QualityLevel;

    fn tv_record() -> MediaInfo {
        MediaInfo {
            title: "深情眼".to_string(),
            media_type: MediaType::TvSeries,
            season: Some(1),
            episode: Some(11),
            extension: ".mkv".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_simple_tv_format() {
        let name = MediaFormatter::format(&tv_record(), FormatStyle::Simple);
        assert_eq!(name, "深情眼.S01E11.mkv");
    }

    #[test]
    fn test_standard_tv_format_collapses_unknown_tags() {
        let name = MediaFormatter::format(&tv_record(), FormatStyle::Standard);
        assert_eq!(name, "深情眼.S01E11.mkv");
    }

    #[test]
    fn test_standard_tv_format_with_tags() {
        let mut info = tv_record();
        info.quality = QualityLevel::Fhd;
        info.source = "WEB-DL".to_string();
        info.codec = "H264".to_string();
        let name = MediaFormatter::format(&info, FormatStyle::Standard);
        assert_eq!(name, "深情眼.S01E11.1080p.WEB-DL.H264.mkv");
    }

    #[test]
    fn test_chinese_tv_format() {
        let name = MediaFormatter::format(&tv_record(), FormatStyle::Chinese);
        assert_eq!(name, "深情眼 - S01E11 - 第 11 集.mkv");
    }

    #[test]
    fn test_movie_format() {
        let info = MediaInfo {
            title: "流浪地球".to_string(),
            media_type: MediaType::Movie,
            year: Some(2019),
            extension: ".mkv".to_string(),
            ..Default::default()
        };
        assert_eq!(
            MediaFormatter::format(&info, FormatStyle::Simple),
            "流浪地球.2019.mkv"
        );
        assert_eq!(
            MediaFormatter::format(&info, FormatStyle::Chinese),
            "流浪地球 - 2019年.mkv"
        );
    }

    #[test]
    fn test_variety_format_with_date() {
        let info = MediaInfo {
            title: "星光大赏".to_string(),
            media_type: MediaType::VarietyShow,
            year: Some(2024),
            month: Some(2),
            day: Some(22),
            episode: Some(9),
            base_episode: Some(9),
            part_suffix: "上".to_string(),
            extension: ".mp4".to_string(),
            ..Default::default()
        };
        let name = MediaFormatter::format(&info, FormatStyle::Standard);
        assert_eq!(name, "星光大赏.20240222.第9期上.mp4");
    }

    #[test]
    fn test_special_version_routing() {
        let info = MediaInfo {
            title: "星光大赏".to_string(),
            media_type: MediaType::TvSeries,
            year: Some(2025),
            month: Some(3),
            day: Some(14),
            part_suffix: "纯享版".to_string(),
            extension: ".mp4".to_string(),
            ..Default::default()
        };
        // No base episode: the special shape replaces the generic one even
        // for an explicit body
        assert_eq!(
            MediaFormatter::format(&info, FormatStyle::Simple),
            "星光大赏.纯享版.mp4"
        );
        assert_eq!(
            MediaFormatter::format_with(&info, "{title}.S{season:02d}E{episode:02d}.{extension}"),
            "星光大赏.20250314.纯享版.mp4"
        );
    }

    #[test]
    fn test_unknown_variable_falls_back() {
        let name = MediaFormatter::format_with(&tv_record(), "{title}.{bogus}.{extension}");
        assert_eq!(name, "深情眼.S01E11.mkv");
    }

    #[test]
    fn test_padded_missing_numeric_falls_back() {
        let mut info = tv_record();
        info.season = None;
        info.episode = None;
        info.year = Some(2024);
        let name = MediaFormatter::format_with(&info, "{title}.{month:02d}.{extension}");
        assert_eq!(name, "深情眼.2024.mkv");
    }

    #[test]
    fn test_plain_missing_numeric_renders_empty() {
        let info = MediaInfo {
            title: "Movie".to_string(),
            media_type: MediaType::Movie,
            extension: ".mp4".to_string(),
            ..Default::default()
        };
        // {year} with no year renders empty and the dots collapse
        assert_eq!(MediaFormatter::format(&info, FormatStyle::Simple), "Movie.mp4");
    }

    #[test]
    fn test_cleanup_idempotent() {
        for raw in [
            "a...b..mp4",
            ".leading.and.trailing.",
            "x. . .y",
            "normal.name.mkv",
            "....",
        ] {
            let once = cleanup_name(raw);
            assert_eq!(cleanup_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_cleanup_collapses() {
        assert_eq!(cleanup_name("Show..S01E01...mkv"), "Show.S01E01.mkv");
        assert_eq!(cleanup_name(".Show.mkv."), "Show.mkv");
        assert_eq!(cleanup_name("a. .b"), "a.b");
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("tv_simple".parse::<FormatStyle>().unwrap(), FormatStyle::Simple);
        assert_eq!("chinese".parse::<FormatStyle>().unwrap(), FormatStyle::Chinese);
        assert_eq!("plex".parse::<FormatStyle>().unwrap(), FormatStyle::Standard);
        assert_eq!("movie_emby".parse::<FormatStyle>().unwrap(), FormatStyle::Standard);
        assert!("bogus".parse::<FormatStyle>().is_err());
    }

    #[test]
    fn test_fallback_shapes() {
        let mut info = MediaInfo::new("x.mp4");
        info.extension = ".mp4".to_string();
        assert_eq!(MediaFormatter::fallback(&info), "Unknown.mp4");

        info.title = "T".to_string();
        info.year = Some(2020);
        assert_eq!(MediaFormatter::fallback(&info), "T.2020.mp4");

        info.season = Some(1);
        info.episode = Some(2);
        assert_eq!(MediaFormatter::fallback(&info), "T.S01E02.mp4");
    }
}
