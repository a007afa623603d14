use serde::{Deserialize, Serialize};
use tracing::warn;

use super::analyzer::MediaAnalyzer;
use super::context::{ContextInferrer, RenameContext};
use super::formatter::{FormatStyle, MediaFormatter};
use super::patterns::is_video_extension;
use super::types::MediaInfo;

/// Per-file batch result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameStatus {
    Success,
    Failed,
}

/// One row of a batch rename result, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub original: String,
    pub renamed: String,
    pub status: RenameStatus,
    pub info: MediaInfo,
}

/// Preview row for the first few files of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub original: String,
    pub renamed: String,
}

/// Preview of a batch rename: the inferred context plus the first rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPreview {
    pub context: RenameContext,
    pub rows: Vec<PreviewRow>,
    pub total_files: usize,
    pub showing: usize,
}

/// Number of rows a preview renders.
pub const PREVIEW_LIMIT: usize = 5;

/// Drives context inference, analysis, and formatting over a list of
/// filenames.
///
/// Files are processed in the caller's order; the 1-based position doubles
/// as the episode number whenever extraction yields none, so every file in a
/// batch gets a distinct, stable number.
pub struct BatchRenamer;

impl BatchRenamer {
    /// Rename a batch with inferred context and optional caller overrides.
    #[must_use]
    pub fn rename_with_context(
        filenames: &[String],
        directory_path: &str,
        custom_title: Option<&str>,
        custom_season: Option<u32>,
        style: FormatStyle,
    ) -> Vec<RenameOutcome> {
        let context = Self::build_context(filenames, directory_path, custom_title, custom_season);

        filenames
            .iter()
            .enumerate()
            .map(|(index, filename)| Self::rename_one(filename, index, &context, style))
            .collect()
    }

    /// Preview the first [`PREVIEW_LIMIT`] rows of a batch rename.
    #[must_use]
    pub fn preview(
        filenames: &[String],
        directory_path: &str,
        custom_title: Option<&str>,
        custom_season: Option<u32>,
        style: FormatStyle,
    ) -> BatchPreview {
        let context = Self::build_context(filenames, directory_path, custom_title, custom_season);

        let rows = filenames
            .iter()
            .take(PREVIEW_LIMIT)
            .enumerate()
            .map(|(index, filename)| {
                let outcome = Self::rename_one(filename, index, &context, style);
                PreviewRow {
                    original: outcome.original,
                    renamed: outcome.renamed,
                }
            })
            .collect::<Vec<_>>();

        BatchPreview {
            showing: rows.len(),
            total_files: filenames.len(),
            rows,
            context,
        }
    }

    /// Preview with an explicit template body instead of a built-in style.
    #[must_use]
    pub fn preview_with_template(
        filenames: &[String],
        body: &str,
        directory_path: &str,
        custom_title: Option<&str>,
    ) -> BatchPreview {
        let context = Self::build_context(filenames, directory_path, custom_title, None);

        let rows = filenames
            .iter()
            .take(PREVIEW_LIMIT)
            .enumerate()
            .map(|(index, filename)| {
                let mut info = MediaAnalyzer::analyze(filename, &context);
                info.episode.get_or_insert(position(index));
                PreviewRow {
                    original: filename.clone(),
                    renamed: MediaFormatter::format_with(&info, body),
                }
            })
            .collect::<Vec<_>>();

        BatchPreview {
            showing: rows.len(),
            total_files: filenames.len(),
            rows,
            context,
        }
    }

    fn build_context(
        filenames: &[String],
        directory_path: &str,
        custom_title: Option<&str>,
        custom_season: Option<u32>,
    ) -> RenameContext {
        let mut context = ContextInferrer::infer(filenames, directory_path);
        if let Some(title) = custom_title {
            context.series_title = Some(title.to_string());
        }
        if let Some(season) = custom_season {
            context.season = season;
        }
        context
    }

    fn rename_one(
        filename: &str,
        index: usize,
        context: &RenameContext,
        style: FormatStyle,
    ) -> RenameOutcome {
        let mut info = MediaAnalyzer::analyze(filename, context);

        if !is_video_extension(&info.extension) {
            // One bad file never blocks its siblings
            warn!("Batch rename skipped non-video file: {filename}");
            return RenameOutcome {
                original: filename.to_string(),
                renamed: filename.to_string(),
                status: RenameStatus::Failed,
                info,
            };
        }

        // Positional fallback: the input ordering supplies the episode
        info.episode.get_or_insert(position(index));

        let renamed = MediaFormatter::format(&info, style);
        RenameOutcome {
            original: filename.to_string(),
            renamed,
            status: RenameStatus::Success,
            info,
        }
    }
}

fn position(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
