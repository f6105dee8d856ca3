//! Staging and commit creation.

use git2::{IndexAddOption, Oid, Repository};

use crate::error::CommitError;

/// Stage all changes, like `git add -A`.
///
/// `add_all` picks up new and modified files; `update_all` records
/// deletions of tracked files.
pub fn stage_all(repo: &Repository) -> Result<(), CommitError> {
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(CommitError::StagingFailed)?;
    index
        .update_all(["*"].iter(), None)
        .map_err(CommitError::StagingFailed)?;
    index.write().map_err(CommitError::StagingFailed)?;
    Ok(())
}

/// Create a commit on HEAD from the index as-is.
///
/// Works on an unborn branch (first commit) by committing with no parent.
pub fn create_commit(repo: &Repository, message: &str) -> Result<Oid, CommitError> {
    let mut index = repo.index().map_err(CommitError::StagingFailed)?;
    let tree_id = index.write_tree().map_err(CommitError::CommitFailed)?;
    let tree = repo.find_tree(tree_id).map_err(CommitError::CommitFailed)?;

    let sig = repo.signature().map_err(CommitError::SignatureFailed)?;

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(CommitError::CommitFailed)
}
