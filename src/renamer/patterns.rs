use regex::Regex;
use std::sync::LazyLock;

/// Extensions the engine treats as video; anything else short-circuits
/// classification.
pub const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".mkv", ".avi", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".ts", ".rmvb",
];

/// Source tags, most specific spellings first.
pub const SOURCE_TAGS: &[&str] = &[
    "WEB-DL", "WEBRip", "BluRay", "BDRip", "DVDRip", "HDTV", "PDTV", "CAM", "TS", "TC", "SCR",
    "R5", "DVDScr",
];

pub const CODEC_TAGS: &[&str] = &[
    "H264", "H.264", "x264", "H265", "H.265", "x265", "HEVC", "XviD", "DivX", "VP9", "AV1",
];

pub const AUDIO_TAGS: &[&str] = &[
    "DTS-HD", "DTS-X", "AAC", "AC3", "DTS", "TrueHD", "FLAC", "MP3", "Atmos", "5.1", "7.1", "2.0",
];

/// Language keyword groups; the group name becomes the record's language.
pub const LANGUAGE_GROUPS: &[(&str, &[&str])] = &[
    (
        "chinese",
        &["中文", "国语", "普通话", "粤语", "Chinese", "Mandarin", "Cantonese"],
    ),
    ("english", &["英语", "English", "ENG"]),
    ("japanese", &["日语", "Japanese", "JAP"]),
    ("korean", &["韩语", "Korean", "KOR"]),
];

pub const SUBTITLE_TAGS: &[&str] = &[
    "中字", "英字", "双字", "内嵌", "外挂", "SUB", "DUB", "简体", "繁体", "中英", "多语",
];

pub const VARIETY_KEYWORDS: &[&str] = &["综艺", "节目", "秀", "Show", "期"];
pub const ANIME_KEYWORDS: &[&str] = &["动漫", "动画", "Anime", "番"];
pub const DOCUMENTARY_KEYWORDS: &[&str] = &["纪录片", "Documentary", "记录", "探索"];

/// Pre-compiled regex patterns for the standard (non-irregular) path
pub struct Patterns {
    /// 4-digit year inside the fixed [1950, 2049] sanity window
    pub year: Regex,

    // Season/episode patterns (ordered by specificity)
    pub season_episode: Regex, // S01E01, s1e1
    pub cjk_season: Regex,     // 第2季
    pub cjk_episode: Regex,    // 第3集 / 第3期 / 第3话
    pub word_season: Regex,    // Season 2
    pub word_episode: Regex,   // Episode 3

    // Technical tag batteries
    pub quality: Regex,
    pub source: Regex,
    pub codec: Regex,
    pub audio: Regex,

    /// Trailing bracketed token, candidate release group
    pub trailing_group: Regex,

    // Cleanup patterns
    pub separators: Regex,
    pub whitespace: Regex,
    pub dots: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            year: Regex::new(r"\b(19[5-9]\d|20[0-4]\d)\b").expect("Invalid year regex"),

            season_episode: Regex::new(r"\b[Ss](\d{1,2})[Ee](\d{1,3})\b")
                .expect("Invalid season_episode regex"),
            cjk_season: Regex::new(r"第\s*(\d+)\s*季").expect("Invalid cjk_season regex"),
            cjk_episode: Regex::new(r"第\s*(\d+)\s*[集期话]").expect("Invalid cjk_episode regex"),
            word_season: Regex::new(r"(?i)\bSeason\s*(\d+)\b").expect("Invalid word_season regex"),
            word_episode: Regex::new(r"(?i)\bEpisode\s*(\d+)\b")
                .expect("Invalid word_episode regex"),

            quality: Regex::new(r"(?i)\b(2160p|1080p|720p|480p|4K|UHD|FHD|HD|SD)\b")
                .expect("Invalid quality regex"),
            source: Regex::new(
                r"(?i)\b(WEB[ ._-]?DL|WEBRip|BluRay|BDRip|DVDRip|HDTV|PDTV|CAM|TS|TC|SCR|R5|DVDScr)\b",
            )
            .expect("Invalid source regex"),
            codec: Regex::new(r"(?i)\b(H[ ._-]?264|x264|H[ ._-]?265|x265|HEVC|XviD|DivX|VP9|AV1)\b")
                .expect("Invalid codec regex"),
            audio: Regex::new(
                r"(?i)\b(DTS[ ._-]?HD|DTS[ ._-]?X|AAC|AC3|DTS|TrueHD|FLAC|MP3|Atmos|5\.1|7\.1|2\.0)\b",
            )
            .expect("Invalid audio regex"),

            trailing_group: Regex::new(r"[\[(]([^\[\]()]+)[\])]\s*$")
                .expect("Invalid trailing_group regex"),

            separators: Regex::new(r"[._\-\[\](){}]").expect("Invalid separators regex"),
            whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
            dots: Regex::new(r"\.{2,}").expect("Invalid dots regex"),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global singleton for patterns
pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

/// Check whether a lower-cased, dot-prefixed extension belongs to a video
/// file.
#[must_use]
pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extension_membership() {
        assert!(is_video_extension(".mp4"));
        assert!(is_video_extension(".rmvb"));
        assert!(!is_video_extension(".srt"));
        assert!(!is_video_extension("mp4"));
    }

    #[test]
    fn test_year_window() {
        assert!(PATTERNS.year.is_match("Movie 1950"));
        assert!(PATTERNS.year.is_match("Movie 2049"));
        assert!(!PATTERNS.year.is_match("Movie 1949"));
        assert!(!PATTERNS.year.is_match("Movie 2050"));
    }

    #[test]
    fn test_source_matches_hyphenated_tags() {
        assert!(PATTERNS.source.is_match("Show.S01E01.WEB-DL.mkv"));
        assert!(PATTERNS.source.is_match("Show S01E01 WEB DL"));
        assert!(PATTERNS.source.is_match("Movie.2020.BluRay.mkv"));
    }

    #[test]
    fn test_quality_tokens() {
        for (token, expected) in [
            ("2160p", "2160p"),
            ("4K", "4K"),
            ("1080p", "1080p"),
            ("720p", "720p"),
        ] {
            let caps = PATTERNS.quality.captures(token).unwrap();
            assert_eq!(&caps[1], expected);
        }
    }
}
