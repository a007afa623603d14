mod analyzer;
mod batch;
mod cascade;
mod context;
mod engine;
mod formatter;
mod numerals;
mod patterns;
mod rules;
mod template;
mod types;

pub use analyzer::MediaAnalyzer;
pub use batch::{
    BatchPreview, BatchRenamer, PREVIEW_LIMIT, PreviewRow, RenameOutcome, RenameStatus,
};
pub use cascade::{CascadeFields, IrregularRule, UNKNOWN_SERIES, classify_irregular};
pub use context::{ContextInferrer, RenameContext};
pub use engine::{MediaRenamer, RenameHistoryEntry, RenamePreview, RenameSuggestion};
pub use formatter::{FormatStyle, MediaFormatter, TEMPLATE_VARIABLES, cleanup_name};
pub use numerals::chinese_to_number;
pub use patterns::{VIDEO_EXTENSIONS, is_video_extension};
pub use rules::{RuleField, RuleOp, SaveRule, SaveRuleSpec};
pub use template::{PRESET_TEMPLATES, TemplateEntry, TemplateKind, TemplateManager};
pub use types::{MediaInfo, MediaType, QualityLevel};

/// Renamer result type
pub type Result<T> = std::result::Result<T, RenameError>;

/// Renamer error types
#[derive(Debug, thiserror::Error)]
pub enum RenameError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
