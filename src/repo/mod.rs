//! Repository adapter over git2.
//!
//! Thin wrappers around `git2::Repository` exposing the primitives the
//! analysis pipeline consumes: status collection, branch and upstream
//! lookups, conflict presence, and staging/commit. Handles are opened
//! per request and never cached.

pub mod commit;
pub mod head;
pub mod status;

pub use commit::{create_commit, stage_all};
pub use head::{ahead_behind, current_branch, has_unresolved_conflicts};
pub use status::{ChangeKind, StatusEntry, collect_status};

use std::path::Path;

use git2::Repository;

use crate::error::RepoError;

/// Open the repository at `path`.
///
/// Fails with [`RepoError::OpenFailed`] when the path is not a git
/// repository or the repository is unreadable.
pub fn open_repository(path: &Path) -> Result<Repository, RepoError> {
    Repository::open(path).map_err(|e| RepoError::OpenFailed {
        path: path.display().to_string(),
        source: e,
    })
}
