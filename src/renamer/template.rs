use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::formatter::render;
use super::types::{MediaInfo, MediaType, QualityLevel};
use super::Result;

/// Characters that may not appear in a rendered filename.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];
/// Filesystem filename length ceiling.
const MAX_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Preset,
    Custom,
}

/// A named template in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub body: String,
    pub description: String,
    pub kind: TemplateKind,
}

/// Built-in presets. Read-only; user templates may shadow them by name.
pub const PRESET_TEMPLATES: &[(&str, &str)] = &[
    // TV
    ("tv_plex", "{title} - S{season:02d}E{episode:02d}.{extension}"),
    (
        "tv_emby",
        "{title}/Season {season:02d}/{title} S{season:02d}E{episode:02d}.{extension}",
    ),
    ("tv_simple", "{title}.S{season:02d}E{episode:02d}.{extension}"),
    (
        "tv_detailed",
        "{title}.S{season:02d}E{episode:02d}.{year}.{quality}.{source}.{extension}",
    ),
    ("tv_chinese", "{title}.第{season}季第{episode}集.{extension}"),
    // Movies
    ("movie_imdb", "{title} ({year}).{extension}"),
    (
        "movie_detailed",
        "{title}.{year}.{quality}.{source}.{codec}.{extension}",
    ),
    ("movie_simple", "{title}.{year}.{extension}"),
    ("movie_chinese", "{title}.{year}年.{extension}"),
    // Variety shows
    (
        "variety_date",
        "{title}.{year}{month:02d}{day:02d}.第{episode}期.{extension}",
    ),
    ("variety_simple", "{title}.第{episode}期.{extension}"),
    (
        "variety_detailed",
        "{title}.{year}.第{episode}期.{quality}.{extension}",
    ),
    // Anime
    ("anime_simple", "{title}.第{episode:02d}话.{extension}"),
    ("anime_detailed", "{title}.第{episode:02d}话.{quality}.{extension}"),
    // Documentaries
    ("doc_simple", "{title}.{extension}"),
    ("doc_detailed", "{title}.{year}.{quality}.{source}.{extension}"),
    // Special shapes
    ("numbered", "{title}.{episode:03d}.{extension}"),
    ("date_format", "{title}.{year}-{month:02d}-{day:02d}.{extension}"),
    (
        "group_format",
        "[{group}]{title}.S{season:02d}E{episode:02d}.{extension}",
    ),
];

/// Catalog of named templates: read-only presets plus validated user
/// templates.
///
/// Persistence is external; [`TemplateManager::export`] and
/// [`TemplateManager::import`] move the user half of the catalog across the
/// boundary unchanged.
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
    custom: BTreeMap<String, TemplateEntry>,
}

impl TemplateManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a template body; user templates shadow presets.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(entry) = self.custom.get(name) {
            return Some(&entry.body);
        }
        PRESET_TEMPLATES
            .iter()
            .find(|(preset, _)| *preset == name)
            .map(|(_, body)| *body)
    }

    /// Add a user template after a synthetic-record dry run.
    pub fn add(&mut self, name: &str, body: &str, description: &str) -> bool {
        if !Self::validate(body) {
            warn!("Rejected invalid template {name:?}: {body:?}");
            return false;
        }

        self.custom.insert(
            name.to_string(),
            TemplateEntry {
                body: body.to_string(),
                description: description.to_string(),
                kind: TemplateKind::Custom,
            },
        );
        info!("Added custom template {name:?}");
        true
    }

    /// Remove a user template. Presets cannot be removed.
    pub fn remove(&mut self, name: &str) -> bool {
        if self.custom.remove(name).is_some() {
            info!("Removed custom template {name:?}");
            true
        } else {
            warn!("Template {name:?} does not exist");
            false
        }
    }

    /// The full catalog, presets first, shadowed presets overridden.
    #[must_use]
    pub fn all(&self) -> BTreeMap<String, TemplateEntry> {
        let mut catalog = BTreeMap::new();
        for (name, body) in PRESET_TEMPLATES {
            catalog.insert(
                (*name).to_string(),
                TemplateEntry {
                    body: (*body).to_string(),
                    description: format!("Preset template: {name}"),
                    kind: TemplateKind::Preset,
                },
            );
        }
        for (name, entry) in &self.custom {
            catalog.insert(name.clone(), entry.clone());
        }
        catalog
    }

    /// Dry-run a template body against a synthetic record.
    ///
    /// Rejects templates that fail to render, exceed the filename length
    /// limit, or produce characters invalid on common filesystems.
    #[must_use]
    pub fn validate(body: &str) -> bool {
        let rendered = match render(body, &Self::synthetic_record()) {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!("Template validation failed: {err}");
                return false;
            }
        };

        if rendered.chars().count() > MAX_NAME_LENGTH {
            warn!("Template produces an over-long filename");
            return false;
        }
        if rendered.contains(ILLEGAL_CHARS) {
            warn!("Template produces illegal filename characters");
            return false;
        }
        true
    }

    /// Render a template body against the synthetic record for display.
    pub fn preview(body: &str) -> Result<String> {
        render(body, &Self::synthetic_record())
    }

    /// User templates only, for the external persistence layer.
    #[must_use]
    pub fn export(&self) -> BTreeMap<String, TemplateEntry> {
        self.custom.clone()
    }

    /// Replace the user templates with a persisted catalog.
    pub fn import(&mut self, catalog: BTreeMap<String, TemplateEntry>) {
        self.custom = catalog
            .into_iter()
            .map(|(name, mut entry)| {
                entry.kind = TemplateKind::Custom;
                (name, entry)
            })
            .collect();
    }

    /// Fixed record used by validation and preview dry runs.
    fn synthetic_record() -> MediaInfo {
        MediaInfo {
            title: "Test Title".to_string(),
            original_filename: "Test.Title.S01E01.mp4".to_string(),
            media_type: MediaType::TvSeries,
            year: Some(2023),
            month: Some(12),
            day: Some(25),
            season: Some(1),
            episode: Some(1),
            episode_title: "Test Episode".to_string(),
            base_episode: Some(5),
            part_suffix: String::new(),
            quality: QualityLevel::Fhd,
            source: "WEB-DL".to_string(),
            codec: "H264".to_string(),
            audio: "AAC".to_string(),
            language: "chinese".to_string(),
            subtitle: "中字".to_string(),
            group: "TestGroup".to_string(),
            extension: ".mp4".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve() {
        let manager = TemplateManager::new();
        assert_eq!(
            manager.get("tv_simple"),
            Some("{title}.S{season:02d}E{episode:02d}.{extension}")
        );
        assert_eq!(manager.get("numbered"), Some("{title}.{episode:03d}.{extension}"));
        assert_eq!(manager.get("missing"), None);
    }

    #[test]
    fn test_all_presets_validate() {
        for (name, body) in PRESET_TEMPLATES {
            assert!(TemplateManager::validate(body), "preset {name} failed validation");
        }
    }

    #[test]
    fn test_add_and_remove_custom() {
        let mut manager = TemplateManager::new();
        assert!(manager.add("mine", "{title}.{episode:02d}.{extension}", "two-digit"));
        assert_eq!(manager.get("mine"), Some("{title}.{episode:02d}.{extension}"));

        assert!(manager.remove("mine"));
        assert_eq!(manager.get("mine"), None);
        assert!(!manager.remove("mine"));
    }

    #[test]
    fn test_custom_shadows_preset() {
        let mut manager = TemplateManager::new();
        assert!(manager.add("tv_simple", "{title}.{extension}", "flat"));
        assert_eq!(manager.get("tv_simple"), Some("{title}.{extension}"));
    }

    #[test]
    fn test_presets_cannot_be_removed() {
        let mut manager = TemplateManager::new();
        assert!(!manager.remove("tv_simple"));
        assert!(manager.get("tv_simple").is_some());
    }

    #[test]
    fn test_validation_rejects_unknown_variable() {
        assert!(!TemplateManager::validate("{title}.{bogus}.{extension}"));
    }

    #[test]
    fn test_validation_rejects_illegal_characters() {
        assert!(!TemplateManager::validate("{title}: {episode}.{extension}"));
        assert!(!TemplateManager::validate("{title}?.{extension}"));
    }

    #[test]
    fn test_validation_rejects_overlong_result() {
        let long_literal = "x".repeat(300);
        assert!(!TemplateManager::validate(&format!("{long_literal}.{{extension}}")));
    }

    #[test]
    fn test_invalid_template_not_added() {
        let mut manager = TemplateManager::new();
        assert!(!manager.add("bad", "{nonexistent}", ""));
        assert_eq!(manager.get("bad"), None);
    }

    #[test]
    fn test_preview() {
        let preview = TemplateManager::preview("{title}.S{season:02d}E{episode:02d}.{extension}");
        assert_eq!(preview.unwrap(), "Test Title.S01E01.mp4");
        assert!(TemplateManager::preview("{bogus}").is_err());
    }

    #[test]
    fn test_catalog_round_trips_through_persistence() {
        let mut manager = TemplateManager::new();
        manager.add("mine", "{title}.{episode:02d}.{extension}", "two-digit");

        let exported = manager.export();
        let json = serde_json::to_string(&exported).unwrap();
        let reloaded: BTreeMap<String, TemplateEntry> = serde_json::from_str(&json).unwrap();

        let mut restored = TemplateManager::new();
        restored.import(reloaded);
        assert_eq!(restored.export(), manager.export());
        assert_eq!(restored.get("mine"), manager.get("mine"));
    }
}
