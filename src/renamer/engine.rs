use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::analyzer::MediaAnalyzer;
use super::batch::{BatchPreview, BatchRenamer, RenameOutcome, RenameStatus};
use super::context::RenameContext;
use super::formatter::{FormatStyle, MediaFormatter};
use super::rules::SaveRule;
use super::template::TemplateManager;
use super::types::{MediaInfo, MediaType};
use super::Result;

/// One completed rename, append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameHistoryEntry {
    pub original: String,
    pub renamed: String,
    pub media_type: MediaType,
    pub title: String,
}

/// Preview of a single rename with the record behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenamePreview {
    pub original: String,
    pub renamed: String,
    pub info: MediaInfo,
}

/// One naming suggestion for a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSuggestion {
    pub style: String,
    pub name: String,
    pub description: String,
}

/// Template names tried pairwise by the last resort of the duplicate check.
/// A pragmatic, non-exhaustive list inherited from operational use.
const COMMON_TEMPLATES: &[&str] = &["simple", "standard", "numbered", "chinese"];

/// Public entry point combining analysis, formatting, template management,
/// batch renaming, the rename history, and the duplicate/idempotence check.
///
/// Construct one per owning service and pass it explicitly; there is no
/// process-wide instance.
#[derive(Debug, Default)]
pub struct MediaRenamer {
    templates: TemplateManager,
    history: Vec<RenameHistoryEntry>,
}

impl MediaRenamer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a pre-loaded template catalog.
    #[must_use]
    pub fn with_templates(templates: TemplateManager) -> Self {
        Self {
            templates,
            history: Vec::new(),
        }
    }

    pub fn templates(&self) -> &TemplateManager {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateManager {
        &mut self.templates
    }

    /// Analyze a filename, with or without batch context.
    #[must_use]
    pub fn analyze(&self, filename: &str, context: Option<&RenameContext>) -> MediaInfo {
        match context {
            Some(context) => MediaAnalyzer::analyze(filename, context),
            None => MediaAnalyzer::analyze(filename, &RenameContext::default()),
        }
    }

    /// Rename a single file through a named template or built-in style and
    /// record the result in the history.
    ///
    /// # Errors
    ///
    /// Returns [`super::RenameError::TemplateNotFound`] when the name
    /// resolves to neither a catalog template nor a built-in style.
    pub fn rename_file(
        &mut self,
        filename: &str,
        template_name: &str,
        custom_title: Option<&str>,
    ) -> Result<String> {
        let info = self.analyze_with_title(filename, custom_title);
        let renamed = self.render_record(&info, template_name)?;

        self.history.push(RenameHistoryEntry {
            original: filename.to_string(),
            renamed: renamed.clone(),
            media_type: info.media_type,
            title: info.title,
        });

        Ok(renamed)
    }

    /// Batch rename with inferred context; successful rows enter the
    /// history.
    pub fn batch_rename(
        &mut self,
        filenames: &[String],
        directory_path: &str,
        custom_title: Option<&str>,
        custom_season: Option<u32>,
    ) -> Vec<RenameOutcome> {
        let results = BatchRenamer::rename_with_context(
            filenames,
            directory_path,
            custom_title,
            custom_season,
            FormatStyle::Simple,
        );

        for outcome in &results {
            if outcome.status == RenameStatus::Success {
                self.history.push(RenameHistoryEntry {
                    original: outcome.original.clone(),
                    renamed: outcome.renamed.clone(),
                    media_type: outcome.info.media_type,
                    title: outcome.info.title.clone(),
                });
            }
        }

        results
    }

    /// Preview a single rename without touching the history.
    pub fn preview_rename(
        &self,
        filename: &str,
        template_name: &str,
        custom_title: Option<&str>,
    ) -> Result<RenamePreview> {
        let info = self.analyze_with_title(filename, custom_title);
        let renamed = self.render_record(&info, template_name)?;
        Ok(RenamePreview {
            original: filename.to_string(),
            renamed,
            info,
        })
    }

    /// Preview the first rows of a batch rename.
    pub fn preview_batch(
        &self,
        filenames: &[String],
        directory_path: &str,
        custom_title: Option<&str>,
        custom_season: Option<u32>,
        template_name: &str,
    ) -> Result<BatchPreview> {
        if let Some(body) = self.templates.get(template_name) {
            return Ok(BatchRenamer::preview_with_template(
                filenames,
                body,
                directory_path,
                custom_title,
            ));
        }

        let style: FormatStyle = template_name.parse()?;
        Ok(BatchRenamer::preview(
            filenames,
            directory_path,
            custom_title,
            custom_season,
            style,
        ))
    }

    /// Format an already-analyzed record through a named template or
    /// built-in style.
    ///
    /// # Errors
    ///
    /// Returns [`super::RenameError::TemplateNotFound`] for unresolvable
    /// names.
    pub fn format_record(&self, info: &MediaInfo, template_name: &str) -> Result<String> {
        self.render_record(info, template_name)
    }

    /// Episode number extracted from a filename, if any.
    #[must_use]
    pub fn episode_of(&self, filename: &str) -> Option<u32> {
        self.analyze(filename, None).episode
    }

    /// Season number extracted from a filename, if any.
    #[must_use]
    pub fn season_of(&self, filename: &str) -> Option<u32> {
        self.analyze(filename, None).season
    }

    /// Whether any save rule matches the record extracted from a filename.
    ///
    /// An empty rule list saves nothing.
    #[must_use]
    pub fn should_save(&self, rules: &[SaveRule], filename: &str) -> bool {
        let info = self.analyze(filename, None);
        rules.iter().any(|rule| rule.matches(&info))
    }

    /// Duplicate/idempotence check: is this file already present, under any
    /// naming convention?
    ///
    /// Checks literal membership first, then the candidate renamed under the
    /// active template, then semantic record equality against every existing
    /// name, and finally pairwise renders under [`COMMON_TEMPLATES`].
    #[must_use]
    pub fn exists(
        &self,
        filename: &str,
        existing_names: &[String],
        ignore_extension: bool,
        template_name: &str,
    ) -> bool {
        if check_membership(filename, existing_names, ignore_extension) {
            return true;
        }

        match self.render_name(filename, template_name, None) {
            Ok(renamed) => {
                debug!("Duplicate check candidate rename: {renamed}");
                if check_membership(&renamed, existing_names, ignore_extension) {
                    return true;
                }
            }
            Err(err) => {
                warn!("Duplicate check could not rename {filename}: {err}");
                return false;
            }
        }

        // Opposite direction: would an existing file, analyzed, denote the
        // same logical episode?
        let target = self.analyze(filename, None);
        for existing in existing_names {
            let candidate = self.analyze(existing, None);
            if same_episode(&target, &candidate) {
                debug!("Duplicate check matched record of {existing}");
                return true;
            }
        }

        self.multi_template_match(&target, filename, existing_names, ignore_extension)
    }

    /// Last resort of the duplicate check: compare renders under a fixed
    /// template list.
    fn multi_template_match(
        &self,
        target: &MediaInfo,
        filename: &str,
        existing_names: &[String],
        ignore_extension: bool,
    ) -> bool {
        if target.episode.is_none() {
            return false;
        }

        for existing in existing_names {
            if self.analyze(existing, None).episode.is_none() {
                continue;
            }

            for template_name in COMMON_TEMPLATES {
                let (Ok(renamed_target), Ok(renamed_existing)) = (
                    self.render_name(filename, template_name, None),
                    self.render_name(existing, template_name, None),
                ) else {
                    continue;
                };

                if names_equal(&renamed_target, &renamed_existing, ignore_extension) {
                    debug!("Duplicate check matched via template {template_name}: {existing}");
                    return true;
                }
            }
        }

        false
    }

    /// Multiple naming suggestions for one file.
    #[must_use]
    pub fn suggest_names(&self, filename: &str, custom_title: Option<&str>) -> Vec<RenameSuggestion> {
        let info = self.analyze_with_title(filename, custom_title);
        let ext = info.extension.trim_start_matches('.');
        let ext = if ext.is_empty() { "mp4" } else { ext };

        let mut suggestions = vec![
            RenameSuggestion {
                style: "standard".to_string(),
                name: MediaFormatter::format(&info, FormatStyle::Standard),
                description: "Standard format with full technical info".to_string(),
            },
            RenameSuggestion {
                style: "simple".to_string(),
                name: MediaFormatter::format(&info, FormatStyle::Simple),
                description: "Simple format with the basics only".to_string(),
            },
        ];

        if info.media_type == MediaType::TvSeries
            && let (Some(season), Some(episode)) = (info.season, info.episode)
        {
            suggestions.push(RenameSuggestion {
                style: "plex".to_string(),
                name: format!("{} - S{season:02}E{episode:02}.{ext}", info.title),
                description: "Plex media server layout".to_string(),
            });
            suggestions.push(RenameSuggestion {
                style: "emby".to_string(),
                name: format!(
                    "{title}/Season {season:02}/{title} S{season:02}E{episode:02}.{ext}",
                    title = info.title
                ),
                description: "Emby media server layout".to_string(),
            });
        }

        if info.media_type == MediaType::Movie
            && let Some(year) = info.year
        {
            suggestions.push(RenameSuggestion {
                style: "imdb".to_string(),
                name: format!("{} ({year}).{ext}", info.title),
                description: "IMDb-style movie name".to_string(),
            });
        }

        suggestions
    }

    /// The rename history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[RenameHistoryEntry] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn analyze_with_title(&self, filename: &str, custom_title: Option<&str>) -> MediaInfo {
        let context = match custom_title {
            Some(title) => RenameContext::with_title(title),
            None => RenameContext::default(),
        };
        let mut info = MediaAnalyzer::analyze(filename, &context);
        if let Some(title) = custom_title {
            // The caller's title wins even over one found in the filename
            info.title = title.to_string();
        }
        info
    }

    /// Resolve a template name (user template, preset, or built-in style)
    /// and format the record through it.
    fn render_record(&self, info: &MediaInfo, template_name: &str) -> Result<String> {
        if let Some(body) = self.templates.get(template_name) {
            return Ok(MediaFormatter::format_with(info, body));
        }
        let style: FormatStyle = template_name.parse()?;
        Ok(MediaFormatter::format(info, style))
    }

    fn render_name(
        &self,
        filename: &str,
        template_name: &str,
        custom_title: Option<&str>,
    ) -> Result<String> {
        let info = self.analyze_with_title(filename, custom_title);
        self.render_record(&info, template_name)
    }
}

fn check_membership(filename: &str, existing_names: &[String], ignore_extension: bool) -> bool {
    existing_names
        .iter()
        .any(|existing| names_equal(filename, existing, ignore_extension))
}

fn names_equal(a: &str, b: &str, ignore_extension: bool) -> bool {
    if ignore_extension {
        stem(a).to_lowercase() == stem(b).to_lowercase()
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

fn stem(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// Conservative record equality: same title (when both known), same type,
/// same season (when both known), and the same episode number.
fn same_episode(a: &MediaInfo, b: &MediaInfo) -> bool {
    if !a.title.is_empty()
        && !b.title.is_empty()
        && a.title.to_lowercase() != b.title.to_lowercase()
    {
        return false;
    }
    if a.media_type != b.media_type {
        return false;
    }
    if let (Some(sa), Some(sb)) = (a.season, b.season)
        && sa != sb
    {
        return false;
    }
    match (a.episode, b.episode) {
        (Some(ea), Some(eb)) => ea == eb,
        _ => false,
    }
}
