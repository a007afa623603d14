//! Filename classification and renaming engine for media libraries.
//!
//! Turns loosely-structured media filenames (TV episodes, movies, variety
//! shows, anime) into structured records through an ordered pattern cascade,
//! backfills missing attributes from batch/directory context, and renders
//! the records back into standardized names through named templates.

pub mod renamer;

pub use renamer::{
    MediaAnalyzer, MediaInfo, MediaRenamer, MediaType, QualityLevel, RenameContext, RenameError,
    Result,
};
