//! Error types for quill modules using thiserror.

use thiserror::Error;

/// Errors from repository adapter operations.
///
/// Every variant means the request cannot proceed: the path is not a
/// repository, or the repository is in a state git2 cannot read. These
/// propagate unchanged to the caller with no retry.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Failed to open repository at '{path}': {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to read repository status: {0}")]
    StatusFailed(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to resolve HEAD: {0}")]
    HeadFailed(#[source] git2::Error),

    #[error("Failed to read index: {0}")]
    IndexFailed(#[source] git2::Error),
}

/// Errors from the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Non-fatal: nothing to analyze. Surfaced as an informational result,
    /// never as a process failure.
    #[error("No changes to analyze (working tree is clean)")]
    NoChanges,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Errors from staging and commit creation.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    SignatureFailed(#[source] git2::Error),
}

/// Errors from per-project configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: String, message: String },
}
