//! Ordered pattern battery for filenames that do not follow the canonical
//! `Title.SxxExx.tags.ext` convention.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;

use super::context::RenameContext;
use super::numerals::chinese_to_number;
use super::types::{MediaInfo, MediaType, QualityLevel};

/// Title sentinel for records where neither the filename nor the context
/// yields one.
pub const UNKNOWN_SERIES: &str = "Unknown Series";

/// Named irregular-filename rules. The declaration order here matches the
/// matching order in [`RULES`]; earlier rules are more specific and must win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrregularRule {
    /// 07.mp4
    PureNumber,
    /// prefix + episode + quality token, quality re-scanned from the match
    EpisodeQuality,
    /// Same shape with the quality token captured directly
    EpisodeQualityPrecise,
    /// show.24.02.22.第9期上.mp4
    VarietyDateEpisode,
    /// show.25.03.14纯享版.mp4
    VarietyDateSpecial,
    /// 第01集.mp4
    SimpleEpisode,
    /// 第三集.mp4
    ChineseNumber,
    /// EP01.mp4 / Episode1.mp4
    EnglishEpisode,
    /// 深情眼 - S01E11 - 第 11 集.mkv
    StandardWithChinese,
    /// 深情眼第1集.mp4
    MixedFormat,
    /// 深情眼01.mkv
    TitleNumber,
    /// 20231225.mp4
    DateOnly,
    /// 20231225_1400.mp4
    Timestamp,
    /// Alphanumeric catch-all; defers when the stem carries SxxExx
    OpaqueName,
}

/// Exactly the fields a cascade rule is permitted to set on a record.
///
/// `None` means "leave the analyzer default in place"; there is no
/// reflection-style update path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeFields {
    pub title: Option<String>,
    pub media_type: Option<MediaType>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub base_episode: Option<u32>,
    pub part_suffix: Option<String>,
    pub quality: Option<QualityLevel>,
}

impl CascadeFields {
    /// Merge the populated fields into a record.
    pub fn apply(self, info: &mut MediaInfo) {
        if let Some(title) = self.title {
            info.title = title;
        }
        if let Some(media_type) = self.media_type {
            info.media_type = media_type;
        }
        if let Some(year) = self.year {
            info.year = Some(year);
        }
        if let Some(month) = self.month {
            info.month = Some(month);
        }
        if let Some(day) = self.day {
            info.day = Some(day);
        }
        if let Some(season) = self.season {
            info.season = Some(season);
        }
        if let Some(episode) = self.episode {
            info.episode = Some(episode);
        }
        if let Some(base_episode) = self.base_episode {
            info.base_episode = Some(base_episode);
        }
        if let Some(part_suffix) = self.part_suffix {
            info.part_suffix = part_suffix;
        }
        if let Some(quality) = self.quality {
            info.quality = quality;
        }
    }
}

/// Video extension alternation shared by every rule pattern.
const EXT: &str = r"(?:mp4|mkv|avi|mov|wmv|flv|webm|m4v|ts|rmvb)";
const QUALITY_TOKENS: &str = "1080p|720p|480p|4K|2160p|UHD|HD|FHD|SD";

/// The irregular rule battery, tried strictly in order; the first match
/// wins. An explicit list, not a map: iteration order is load-bearing.
pub static RULES: LazyLock<Vec<(IrregularRule, Regex)>> = LazyLock::new(|| {
    let rule = |pattern: String| Regex::new(&pattern).expect("Invalid irregular rule regex");

    vec![
        (
            IrregularRule::PureNumber,
            rule(format!(r"(?i)^(\d{{1,3}})\.{EXT}$")),
        ),
        (
            IrregularRule::EpisodeQuality,
            rule(format!(
                r"(?i)^(.+?)[\s\-_+.]*(?:S(\d{{1,2}}))?E?(\d{{1,3}})[\s\-_+.]*(?:{QUALITY_TOKENS})[\s\-_+.]*.*?\.{EXT}$"
            )),
        ),
        (
            IrregularRule::EpisodeQualityPrecise,
            rule(format!(
                r"(?i)^(.+?)[\s\-_+.]*(?:S(\d{{1,2}}))?E?(\d{{1,3}})[\s\-_+.]*({QUALITY_TOKENS})[\s\-_+.]*.*?\.{EXT}$"
            )),
        ),
        (
            IrregularRule::VarietyDateEpisode,
            rule(format!(
                r"(?i)^[^第]*?(\d{{2,4}})[\s.\-_/]*(\d{{1,2}})[\s.\-_/]*(\d{{1,2}})[\s.\-_/]*第([一二三四五六七八九十百千万\d]{{1,10}})[期话]([上中下]?)[^.]*\.{EXT}$"
            )),
        ),
        (
            IrregularRule::VarietyDateSpecial,
            rule(format!(
                r"(?i)^[^纯花幕加完精未]*?(\d{{2,4}})[\s.\-_/]*(\d{{1,2}})[\s.\-_/]*(\d{{1,2}})[\s.\-_/]*(纯享版|花絮版|幕后版|加更版|完整版|精华版|未删减版)[^.]*\.{EXT}$"
            )),
        ),
        (
            IrregularRule::SimpleEpisode,
            rule(format!(r"(?i)^第?(\d{{1,3}})[集期话]?\.{EXT}$")),
        ),
        (
            IrregularRule::ChineseNumber,
            rule(format!(r"(?i)^第?([一二三四五六七八九十百]+)[集期话]?\.{EXT}$")),
        ),
        (
            IrregularRule::EnglishEpisode,
            rule(format!(r"(?i)^(?:Episode|EP|E)(\d{{1,3}})\.{EXT}$")),
        ),
        (
            IrregularRule::StandardWithChinese,
            rule(format!(
                r"(?i)^(.+?)\s*-\s*S(\d{{1,2}})E(\d{{1,3}})\s*-\s*第\s*(\d+)\s*[集期话]?\.{EXT}$"
            )),
        ),
        (
            IrregularRule::MixedFormat,
            rule(format!(r"(?i)^(.+?)第(\d{{1,3}})[集期话]\.{EXT}$")),
        ),
        (
            IrregularRule::TitleNumber,
            rule(format!(r"(?i)^([^\d]+)(\d{{1,3}})\.{EXT}$")),
        ),
        (
            IrregularRule::DateOnly,
            rule(format!(r"(?i)^(\d{{4}}[-_]?\d{{2}}[-_]?\d{{2}})\.{EXT}$")),
        ),
        (
            IrregularRule::Timestamp,
            rule(format!(
                r"(?i)^(\d{{4}}[-_]?\d{{2}}[-_]?\d{{2}}[-_]?\d{{4}})\.{EXT}$"
            )),
        ),
        (
            IrregularRule::OpaqueName,
            rule(format!(r"(?i)^([a-zA-Z0-9_\-]+)\.{EXT}$")),
        ),
    ]
});

struct Helpers {
    quality_token: Regex,
    episode_suffix: Regex,
    embedded_sxxexx: Regex,
    digit_run: Regex,
}

static HELPERS: LazyLock<Helpers> = LazyLock::new(|| Helpers {
    quality_token: Regex::new(&format!(r"(?i)({QUALITY_TOKENS})"))
        .expect("Invalid quality_token regex"),
    episode_suffix: Regex::new(r"(?i)[\s\-_+.]*(?:S\d{1,2})?E?\d{1,3}.*$")
        .expect("Invalid episode_suffix regex"),
    embedded_sxxexx: Regex::new(r"(?i)S\d{1,2}E\d{1,3}").expect("Invalid embedded_sxxexx regex"),
    digit_run: Regex::new(r"\d+").expect("Invalid digit_run regex"),
});

/// Try the irregular battery against a filename.
///
/// Returns `None` both when no rule matches and when the opaque catch-all
/// defers a name carrying an explicit SxxExx token to the standard pipeline.
#[must_use]
pub fn classify_irregular(filename: &str, context: &RenameContext) -> Option<CascadeFields> {
    for (rule, regex) in RULES.iter() {
        if let Some(caps) = regex.captures(filename) {
            return process_match(*rule, &caps, context);
        }
    }
    None
}

fn process_match(
    rule: IrregularRule,
    caps: &Captures<'_>,
    context: &RenameContext,
) -> Option<CascadeFields> {
    match rule {
        IrregularRule::PureNumber => Some(CascadeFields {
            episode: num(caps, 1),
            title: Some(context_title(context)),
            season: Some(context.season),
            ..Default::default()
        }),

        IrregularRule::EpisodeQuality | IrregularRule::EpisodeQualityPrecise => {
            let prefix = caps[1].trim();
            let quality_token = if rule == IrregularRule::EpisodeQualityPrecise {
                caps.get(4).map(|m| m.as_str().to_string())
            } else {
                // Coarse variant: re-scan the whole match for the tier token
                HELPERS
                    .quality_token
                    .find(caps.get(0).map_or("", |m| m.as_str()))
                    .map(|m| m.as_str().to_string())
            };

            let title = context.series_title.clone().unwrap_or_else(|| {
                let stripped = HELPERS.episode_suffix.replace(prefix, "");
                let cleaned = stripped
                    .replace(['_', '-', '+'], " ")
                    .trim()
                    .to_string();
                if cleaned.chars().count() < 2 {
                    UNKNOWN_SERIES.to_string()
                } else {
                    cleaned
                }
            });

            Some(CascadeFields {
                episode: num(caps, 3),
                title: Some(title),
                season: num(caps, 2).or(Some(context.season)),
                quality: quality_token
                    .map(|t| QualityLevel::from_token(&t))
                    .or(Some(QualityLevel::Unknown)),
                ..Default::default()
            })
        }

        IrregularRule::VarietyDateEpisode => {
            let episode_text = &caps[4];
            let base_episode = if episode_text.chars().all(|c| c.is_ascii_digit()) {
                episode_text.parse().unwrap_or(1)
            } else {
                chinese_to_number(episode_text)
            };

            Some(CascadeFields {
                episode: Some(base_episode),
                base_episode: Some(base_episode),
                part_suffix: Some(caps[5].to_string()),
                title: Some(context_title(context)),
                season: Some(context.season),
                media_type: Some(MediaType::TvSeries),
                year: parse_year(&caps[1]),
                month: num(caps, 2),
                day: num(caps, 3),
                ..Default::default()
            })
        }

        IrregularRule::VarietyDateSpecial => Some(CascadeFields {
            // No ordinary episode number; the keyword identifies the release
            part_suffix: Some(caps[4].to_string()),
            title: Some(context_title(context)),
            season: Some(context.season),
            media_type: Some(MediaType::TvSeries),
            year: parse_year(&caps[1]),
            month: num(caps, 2),
            day: num(caps, 3),
            ..Default::default()
        }),

        IrregularRule::SimpleEpisode | IrregularRule::EnglishEpisode => Some(CascadeFields {
            episode: num(caps, 1),
            title: Some(context_title(context)),
            season: Some(context.season),
            ..Default::default()
        }),

        IrregularRule::ChineseNumber => Some(CascadeFields {
            episode: Some(chinese_to_number(&caps[1])),
            title: Some(context_title(context)),
            season: Some(context.season),
            ..Default::default()
        }),

        IrregularRule::StandardWithChinese => {
            let season = num(caps, 2);
            let episode = num(caps, 3);
            let cjk_episode = num(caps, 4);

            // The numeric token is authoritative; the CJK restatement is
            // only cross-checked
            if episode != cjk_episode
                && let (Some(episode), Some(cjk)) = (episode, cjk_episode)
            {
                warn!(
                    "Episode number mismatch: S{:02}E{:02} vs 第{}集",
                    season.unwrap_or(0),
                    episode,
                    cjk
                );
            }

            Some(CascadeFields {
                title: Some(caps[1].trim().to_string()),
                season,
                episode,
                media_type: Some(MediaType::TvSeries),
                ..Default::default()
            })
        }

        IrregularRule::MixedFormat => {
            let title = caps[1].trim().trim_end_matches('.').to_string();
            Some(CascadeFields {
                episode: num(caps, 2),
                title: Some(if title.is_empty() {
                    context_title(context)
                } else {
                    title
                }),
                season: Some(context.season),
                ..Default::default()
            })
        }

        IrregularRule::TitleNumber => Some(CascadeFields {
            title: Some(caps[1].trim().to_string()),
            season: Some(context.season),
            episode: num(caps, 2),
            media_type: Some(MediaType::TvSeries),
            ..Default::default()
        }),

        IrregularRule::DateOnly | IrregularRule::Timestamp => {
            let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
            if digits.len() < 8 {
                return None;
            }

            let year = digits[..4].parse().ok();
            let month = digits[4..6].parse().ok();
            let day: Option<u32> = digits[6..8].parse().ok();

            Some(CascadeFields {
                title: Some(context_title(context)),
                year,
                month,
                day,
                // Day-of-month doubles as a cheap ordinal
                episode: day,
                ..Default::default()
            })
        }

        IrregularRule::OpaqueName => {
            let stem = &caps[1];
            if HELPERS.embedded_sxxexx.is_match(stem) {
                // Well-formed token inside an opaque name: let the standard
                // pipeline extract it
                return None;
            }

            let episode = HELPERS
                .digit_run
                .find_iter(stem)
                .last()
                .and_then(|m| m.as_str().parse().ok());

            Some(CascadeFields {
                episode,
                title: Some(context_title(context)),
                season: Some(context.season),
                ..Default::default()
            })
        }
    }
}

fn context_title(context: &RenameContext) -> String {
    context
        .series_title
        .clone()
        .unwrap_or_else(|| UNKNOWN_SERIES.to_string())
}

fn num(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

/// Two-digit years are anchored to the 2000s; longer forms parse verbatim.
fn parse_year(text: &str) -> Option<i32> {
    let value: i32 = text.parse().ok()?;
    if text.len() == 2 {
        Some(2000 + value)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(filename: &str) -> Option<CascadeFields> {
        classify_irregular(filename, &RenameContext::default())
    }

    #[test]
    fn test_pure_number() {
        let fields = classify("07.mp4").unwrap();
        assert_eq!(fields.episode, Some(7));
        assert_eq!(fields.season, Some(1));
        assert_eq!(fields.title.as_deref(), Some(UNKNOWN_SERIES));
    }

    #[test]
    fn test_pure_number_uses_context() {
        let context = RenameContext {
            series_title: Some("X".to_string()),
            season: 2,
            ..Default::default()
        };
        let fields = classify_irregular("01.mp4", &context).unwrap();
        assert_eq!(fields.title.as_deref(), Some("X"));
        assert_eq!(fields.season, Some(2));
        assert_eq!(fields.episode, Some(1));
    }

    #[test]
    fn test_episode_quality() {
        let fields = classify("萨达卡斯柯 E01 4k.mp4").unwrap();
        assert_eq!(fields.episode, Some(1));
        assert_eq!(fields.quality, Some(QualityLevel::Uhd));
        assert_eq!(fields.title.as_deref(), Some("萨达卡斯柯"));
    }

    #[test]
    fn test_episode_quality_plus_separators() {
        let fields = classify("show+02+1080p.mp4").unwrap();
        assert_eq!(fields.episode, Some(2));
        assert_eq!(fields.quality, Some(QualityLevel::Fhd));
        assert_eq!(fields.title.as_deref(), Some("show"));
    }

    #[test]
    fn test_episode_quality_keeps_explicit_season() {
        let fields = classify("series-S02E03-720p-final.mp4").unwrap();
        assert_eq!(fields.season, Some(2));
        assert_eq!(fields.episode, Some(3));
        assert_eq!(fields.quality, Some(QualityLevel::Hd));
    }

    #[test]
    fn test_variety_date_episode() {
        let fields = classify("show.24.02.22.第9期.mp4").unwrap();
        assert_eq!(fields.year, Some(2024));
        assert_eq!(fields.month, Some(2));
        assert_eq!(fields.day, Some(22));
        assert_eq!(fields.episode, Some(9));
        assert_eq!(fields.base_episode, Some(9));
        assert_eq!(fields.part_suffix.as_deref(), Some(""));
        assert_eq!(fields.media_type, Some(MediaType::TvSeries));
    }

    #[test]
    fn test_variety_date_episode_cjk_numeral_and_part() {
        let fields = classify("prefix-2025.03.14-第十期中.mp4").unwrap();
        assert_eq!(fields.year, Some(2025));
        assert_eq!(fields.episode, Some(10));
        assert_eq!(fields.part_suffix.as_deref(), Some("中"));
    }

    #[test]
    fn test_variety_date_special() {
        let fields = classify("show.25.03.14纯享版.mp4").unwrap();
        assert_eq!(fields.year, Some(2025));
        assert_eq!(fields.episode, None);
        assert_eq!(fields.base_episode, None);
        assert_eq!(fields.part_suffix.as_deref(), Some("纯享版"));
    }

    #[test]
    fn test_simple_episode() {
        let fields = classify("第01集.mp4").unwrap();
        assert_eq!(fields.episode, Some(1));
    }

    #[test]
    fn test_chinese_number_episode() {
        let fields = classify("第三集.mp4").unwrap();
        assert_eq!(fields.episode, Some(3));

        let fields = classify("二十三.mp4").unwrap();
        assert_eq!(fields.episode, Some(23));
    }

    #[test]
    fn test_english_episode() {
        assert_eq!(classify("EP01.mp4").unwrap().episode, Some(1));
        assert_eq!(classify("Episode12.mp4").unwrap().episode, Some(12));
        assert_eq!(classify("E7.mp4").unwrap().episode, Some(7));
    }

    #[test]
    fn test_standard_with_chinese() {
        let fields = classify("深情眼 - S01E11 - 第 11 集.mkv").unwrap();
        assert_eq!(fields.title.as_deref(), Some("深情眼"));
        assert_eq!(fields.season, Some(1));
        assert_eq!(fields.episode, Some(11));
        assert_eq!(fields.media_type, Some(MediaType::TvSeries));
    }

    #[test]
    fn test_standard_with_chinese_mismatch_keeps_numeric() {
        let fields = classify("深情眼 - S01E11 - 第 12 集.mkv").unwrap();
        assert_eq!(fields.episode, Some(11));
    }

    #[test]
    fn test_mixed_format() {
        let fields = classify("深情眼第1集.mp4").unwrap();
        assert_eq!(fields.title.as_deref(), Some("深情眼"));
        assert_eq!(fields.episode, Some(1));
        assert_eq!(fields.media_type, None);
    }

    #[test]
    fn test_title_number() {
        let fields = classify("深情眼01.mkv").unwrap();
        assert_eq!(fields.title.as_deref(), Some("深情眼"));
        assert_eq!(fields.episode, Some(1));
        assert_eq!(fields.media_type, Some(MediaType::TvSeries));
    }

    #[test]
    fn test_date_only() {
        let fields = classify("20231225.mp4").unwrap();
        assert_eq!(fields.year, Some(2023));
        assert_eq!(fields.month, Some(12));
        assert_eq!(fields.day, Some(25));
        assert_eq!(fields.episode, Some(25));
    }

    #[test]
    fn test_date_with_separators() {
        let fields = classify("2023-12-25.mp4").unwrap();
        assert_eq!(fields.year, Some(2023));
        assert_eq!(fields.episode, Some(25));
    }

    #[test]
    fn test_timestamp() {
        let fields = classify("20231225_1400.mp4").unwrap();
        assert_eq!(fields.year, Some(2023));
        assert_eq!(fields.day, Some(25));
        assert_eq!(fields.episode, Some(25));
    }

    #[test]
    fn test_date_beats_opaque() {
        // Both DateOnly and OpaqueName shapes match; the earlier rule wins
        let fields = classify("20231225.mp4").unwrap();
        assert_eq!(fields.year, Some(2023));
        assert_eq!(fields.title.as_deref(), Some(UNKNOWN_SERIES));
    }

    #[test]
    fn test_opaque_name_with_digits() {
        let fields = classify("abc123.mp4").unwrap();
        assert_eq!(fields.episode, Some(123));
    }

    #[test]
    fn test_opaque_name_without_digits() {
        let fields = classify("random-name.mp4").unwrap();
        assert_eq!(fields.episode, None);
    }

    #[test]
    fn test_opaque_name_defers_on_sxxexx() {
        assert!(classify("ShowS01E11.mkv").is_none());
    }

    #[test]
    fn test_standard_names_fall_through() {
        // Canonical names without quality tokens reach the standard pipeline
        assert!(classify("Breaking.Bad.S01E01.mkv").is_none());
        assert!(classify("深情眼.S01E11.mkv").is_none());
    }

    #[test]
    fn test_non_video_extension_never_matches() {
        assert!(classify("01.srt").is_none());
        assert!(classify("第三集.txt").is_none());
    }
}
