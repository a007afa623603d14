use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::patterns::VARIETY_KEYWORDS;
use super::types::MediaType;

/// Batch/directory-derived hints used to resolve per-file ambiguity.
///
/// One context is built per batch operation and consumed read-only by the
/// analyzer for every file in that batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameContext {
    /// Shared series title, when one could be derived
    pub series_title: Option<String>,
    /// Season for files that do not carry their own
    pub season: u32,
    /// Whether this context covers more than one file
    pub is_batch: bool,
    /// Number of files the context was derived from
    pub file_count: usize,
    /// Informational media-type hint; the analyzer decides per file
    pub media_type_hint: MediaType,
}

impl Default for RenameContext {
    fn default() -> Self {
        Self {
            series_title: None,
            season: 1,
            is_batch: false,
            file_count: 0,
            media_type_hint: MediaType::Unknown,
        }
    }
}

impl RenameContext {
    /// Context carrying only a caller-supplied title.
    #[must_use]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            series_title: Some(title.into()),
            ..Default::default()
        }
    }
}

struct ContextPatterns {
    dir_season: Regex,
    strip_season: Regex,
    strip_year: Regex,
    strip_quality: Regex,
    strip_episode_markers: Regex,
    separators: Regex,
    separator_runs: Regex,
    trailing_separators: Regex,
    whitespace: Regex,
    digits: Regex,
}

static CONTEXT_PATTERNS: LazyLock<ContextPatterns> = LazyLock::new(|| ContextPatterns {
    dir_season: Regex::new(r"(?i)第(\d+)季|Season\s*(\d+)|S(\d+)")
        .expect("Invalid dir_season regex"),
    strip_season: Regex::new(r"(?i)第\d+季|Season\s*\d+|S\d+").expect("Invalid strip_season regex"),
    strip_year: Regex::new(r"\b(19|20)\d{2}\b").expect("Invalid strip_year regex"),
    strip_quality: Regex::new(r"(?i)\b(480p|720p|1080p|2160p|4K|HD|FHD|UHD)\b")
        .expect("Invalid strip_quality regex"),
    strip_episode_markers: Regex::new(r"\d+|第\d+集|第\d+期|Episode\d+|EP\d+|E\d+")
        .expect("Invalid strip_episode_markers regex"),
    separators: Regex::new(r"[._\-\[\](){}]").expect("Invalid separators regex"),
    separator_runs: Regex::new(r"[._\-\s]+").expect("Invalid separator_runs regex"),
    trailing_separators: Regex::new(r"[._\-\s]+$").expect("Invalid trailing_separators regex"),
    whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
    digits: Regex::new(r"\d+").expect("Invalid digits regex"),
});

/// Derives a shared [`RenameContext`] from a batch of filenames and an
/// optional directory path.
pub struct ContextInferrer;

impl ContextInferrer {
    /// Infer title, season, and a media-type hint for a batch.
    #[must_use]
    pub fn infer(filenames: &[String], directory_path: &str) -> RenameContext {
        let mut context = RenameContext {
            is_batch: filenames.len() > 1,
            file_count: filenames.len(),
            ..Default::default()
        };

        if filenames.is_empty() {
            return context;
        }

        if !directory_path.is_empty() {
            let dir_name = last_path_segment(directory_path);
            context.series_title = Self::title_from_dirname(dir_name);
            context.season = Self::season_from_dirname(dir_name);
        }

        let sequential = Self::has_sequential_numbers(filenames);
        let has_episode_marker = Self::has_episode_markers(filenames);

        if context.series_title.is_none() {
            context.series_title = Self::common_title(filenames);
        }

        context.media_type_hint = if has_episode_marker || sequential {
            if Self::has_variety_keywords(filenames) {
                MediaType::VarietyShow
            } else {
                MediaType::TvSeries
            }
        } else {
            MediaType::Movie
        };

        // Consecutive numbering is the strongest series signal
        if sequential {
            context.media_type_hint = MediaType::TvSeries;
        }

        context
    }

    /// Strip season/year/quality tokens from a directory name and use the
    /// remainder as title.
    fn title_from_dirname(dirname: &str) -> Option<String> {
        let p = &*CONTEXT_PATTERNS;

        let mut clean = p.strip_season.replace_all(dirname, "").to_string();
        clean = p.strip_year.replace_all(&clean, "").to_string();
        clean = p.strip_quality.replace_all(&clean, "").to_string();
        clean = p.separators.replace_all(&clean, " ").to_string();
        clean = p.whitespace.replace_all(&clean, " ").trim().to_string();

        if clean.is_empty() { None } else { Some(clean) }
    }

    fn season_from_dirname(dirname: &str) -> u32 {
        if let Some(caps) = CONTEXT_PATTERNS.dir_season.captures(dirname) {
            for group in [caps.get(1), caps.get(2), caps.get(3)].into_iter().flatten() {
                if let Ok(season) = group.as_str().parse() {
                    return season;
                }
            }
        }
        1
    }

    /// All integers embedded in the batch, sorted, must be strictly
    /// consecutive.
    fn has_sequential_numbers(filenames: &[String]) -> bool {
        let mut numbers: Vec<i64> = Vec::new();
        for filename in filenames {
            let stem = file_stem(filename);
            for m in CONTEXT_PATTERNS.digits.find_iter(stem) {
                if let Ok(n) = m.as_str().parse() {
                    numbers.push(n);
                }
            }
        }

        if numbers.is_empty() {
            return false;
        }

        numbers.sort_unstable();
        numbers.windows(2).all(|w| w[1] == w[0] + 1)
    }

    fn has_episode_markers(filenames: &[String]) -> bool {
        const INDICATORS: &[&str] = &["第", "集", "期", "Episode", "EP", "E"];
        filenames
            .iter()
            .any(|f| INDICATORS.iter().any(|marker| f.contains(marker)))
    }

    fn has_variety_keywords(filenames: &[String]) -> bool {
        let joined = filenames.join(" ");
        VARIETY_KEYWORDS.iter().any(|k| joined.contains(k))
    }

    /// Longest common literal prefix (batch) or the marker-stripped stem
    /// (single file).
    fn common_title(filenames: &[String]) -> Option<String> {
        let p = &*CONTEXT_PATTERNS;

        if filenames.len() == 1 {
            let stem = file_stem(&filenames[0]);
            let title = p.strip_episode_markers.replace_all(stem, "").to_string();
            let title = p.separator_runs.replace_all(&title, " ").trim().to_string();
            return if title.is_empty() { None } else { Some(title) };
        }

        let mut prefix = filenames[0].clone();
        for filename in &filenames[1..] {
            let common: String = prefix
                .chars()
                .zip(filename.chars())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a)
                .collect();
            prefix = common;
        }

        let mut prefix = if prefix.contains('.') {
            file_stem(&prefix).to_string()
        } else {
            prefix
        };
        prefix = p.trailing_separators.replace(&prefix, "").trim().to_string();

        if prefix.chars().count() > 2 {
            Some(prefix)
        } else {
            None
        }
    }
}

/// Last segment of a slash-separated path, tolerant of trailing slashes.
fn last_path_segment(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}

/// Filename without its final extension.
fn file_stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_infer_title_and_season_from_directory() {
        let files = names(&["01.mp4", "02.mp4"]);
        let context = ContextInferrer::infer(&files, "/media/深情眼 第2季 1080p");

        assert_eq!(context.series_title.as_deref(), Some("深情眼"));
        assert_eq!(context.season, 2);
        assert!(context.is_batch);
        assert_eq!(context.file_count, 2);
    }

    #[test]
    fn test_infer_season_english_directory() {
        let files = names(&["e1.mp4"]);
        let context = ContextInferrer::infer(&files, "Breaking Bad Season 3");
        assert_eq!(context.season, 3);
    }

    #[test]
    fn test_sequential_numbers_imply_tv_series() {
        let files = names(&["1.mp4", "2.mp4", "3.mp4"]);
        let context = ContextInferrer::infer(&files, "");
        assert_eq!(context.media_type_hint, MediaType::TvSeries);
    }

    #[test]
    fn test_non_sequential_numbers() {
        let files = names(&["1.mp4", "5.mp4", "9.mp4"]);
        assert!(!ContextInferrer::has_sequential_numbers(&files));
    }

    #[test]
    fn test_common_prefix_title() {
        // The shared digit prefix is part of the literal common prefix
        let files = names(&["奔跑吧兄弟01.mp4", "奔跑吧兄弟02.mp4"]);
        let context = ContextInferrer::infer(&files, "");
        assert_eq!(context.series_title.as_deref(), Some("奔跑吧兄弟0"));
    }

    #[test]
    fn test_short_common_prefix_rejected() {
        let files = names(&["ab1.mp4", "ab2.mp4"]);
        assert_eq!(ContextInferrer::common_title(&files), None);
    }

    #[test]
    fn test_single_file_title() {
        let files = names(&["深情眼第3集.mp4"]);
        let context = ContextInferrer::infer(&files, "");
        assert_eq!(context.series_title.as_deref(), Some("深情眼"));
        assert!(!context.is_batch);
    }

    #[test]
    fn test_empty_batch() {
        let context = ContextInferrer::infer(&[], "");
        assert_eq!(context.series_title, None);
        assert_eq!(context.season, 1);
        assert_eq!(context.file_count, 0);
    }
}
