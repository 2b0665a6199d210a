//! The combiner's error taxonomy (spec §7).
//!
//! Most of these are locally recovered by the component that raises them
//! (logged as a warning and skipped); only [`CombinerError::MultipleBasePacks`]
//! and [`CombinerError::SourceMissing`] are meant to abort a run.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CombinerError>;

#[derive(Debug, thiserror::Error)]
pub enum CombinerError {
    #[error("neither an archive file nor a directory was provided: {0}")]
    SourceMissing(PathBuf),

    #[error("failed to extract {source_path}: {reason}")]
    ExtractionFailed { source_path: PathBuf, reason: String },

    #[error("{path}: not valid UTF-8")]
    MalformedEncoding { path: PathBuf },

    #[error("{path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error(
        "{count} packs are flagged as base ({names}); exactly one base pack is allowed"
    )]
    MultipleBasePacks { count: usize, names: String },

    #[error("{kind} reference {name:?} not found in {resolver_path}")]
    MissingReference {
        resolver_path: PathBuf,
        kind: &'static str,
        name: String,
    },

    #[error("spawn entry in {path} names unknown entity {name:?}")]
    UnresolvedSpawnTarget { path: PathBuf, name: String },

    #[error("language key {key:?} in {path} could not be tied to any known entity")]
    LangNameUnmatched { path: PathBuf, key: String },

    #[error("destination {path} already exists on export")]
    MoveCollision { path: PathBuf },

    #[error("could not delete {path}: {reason}")]
    DeletePermission { path: PathBuf, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CombinerError {
    /// Whether this error is, per spec §7, locally recovered (never fatal) —
    /// i.e. safe to log and continue rather than abort the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CombinerError::SourceMissing(_) | CombinerError::MultipleBasePacks { .. }
        )
    }
}
