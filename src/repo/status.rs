//! Cheap status collection: path, change kind, and staged flag only.
//!
//! This is the tree-comparison primitive behind both lite-mode extraction
//! and the status summarizer. It never reads file content.

use std::fmt;

use git2::{Repository, StatusOptions};
use serde::Serialize;

use crate::error::RepoError;

/// Kind of change recorded for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Untracked,
}

impl ChangeKind {
    /// Single-letter marker used in status listings.
    pub fn letter(&self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Modified => 'M',
            ChangeKind::Deleted => 'D',
            ChangeKind::Renamed => 'R',
            ChangeKind::Copied => 'C',
            ChangeKind::Untracked => '?',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Modified => write!(f, "modified"),
            ChangeKind::Deleted => write!(f, "deleted"),
            ChangeKind::Renamed => write!(f, "renamed"),
            ChangeKind::Copied => write!(f, "copied"),
            ChangeKind::Untracked => write!(f, "untracked"),
        }
    }
}

/// One status entry. A path that is both staged and further modified in
/// the working tree produces two entries.
#[derive(Debug, Clone, Serialize)]
pub struct StatusEntry {
    pub path: String,
    pub kind: ChangeKind,
    pub staged: bool,
    /// Prior path for renamed entries.
    pub old_path: Option<String>,
}

/// Collect the status of every changed path, sorted by path.
///
/// Staged entries sort before unstaged entries for the same path.
/// Conflicted paths are excluded; conflict presence is reported
/// separately by [`super::has_unresolved_conflicts`].
pub fn collect_status(repo: &Repository) -> Result<Vec<StatusEntry>, RepoError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .renames_head_to_index(true);

    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(RepoError::StatusFailed)?;

    let mut entries = Vec::new();

    for entry in statuses.iter() {
        let Some(path) = entry.path() else { continue };
        let status = entry.status();

        if status.is_conflicted() {
            continue;
        }

        // Index side (staged)
        let index_kind = if status.is_index_new() {
            Some(ChangeKind::Added)
        } else if status.is_index_modified() || status.is_index_typechange() {
            Some(ChangeKind::Modified)
        } else if status.is_index_deleted() {
            Some(ChangeKind::Deleted)
        } else if status.is_index_renamed() {
            Some(ChangeKind::Renamed)
        } else {
            None
        };

        if let Some(kind) = index_kind {
            let old_path = if kind == ChangeKind::Renamed {
                entry
                    .head_to_index()
                    .and_then(|d| d.old_file().path())
                    .map(|p| p.to_string_lossy().to_string())
            } else {
                None
            };
            entries.push(StatusEntry {
                path: path.to_string(),
                kind,
                staged: true,
                old_path,
            });
        }

        // Working tree side (unstaged)
        let wt_kind = if status.is_wt_new() {
            Some(ChangeKind::Untracked)
        } else if status.is_wt_modified() || status.is_wt_typechange() {
            Some(ChangeKind::Modified)
        } else if status.is_wt_deleted() {
            Some(ChangeKind::Deleted)
        } else if status.is_wt_renamed() {
            Some(ChangeKind::Renamed)
        } else {
            None
        };

        if let Some(kind) = wt_kind {
            entries.push(StatusEntry {
                path: path.to_string(),
                kind,
                staged: false,
                old_path: None,
            });
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path).then(b.staged.cmp(&a.staged)));

    Ok(entries)
}
