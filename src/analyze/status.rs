//! Lightweight repository health snapshot.

use git2::Repository;
use serde::Serialize;
use tracing::debug;

use crate::error::RepoError;
use crate::repo::status::{ChangeKind, collect_status};
use crate::repo::{ahead_behind, current_branch, has_unresolved_conflicts};

/// Fast status summary for polling; cheap to produce, safe to retry.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    /// Current branch short name; `None` when HEAD is detached.
    pub branch: Option<String>,
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
    /// Commits ahead of upstream; `None` without an upstream.
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
    pub has_conflicts: bool,
    /// True iff something is staged and no conflict is pending.
    pub ready_to_commit: bool,
}

/// Build a [`StatusSnapshot`] from cheap primitives only: status counts,
/// branch name, upstream comparison, and the index conflict flag. No file
/// content is read and no diff is materialized.
pub fn optimized_status(repo: &Repository) -> Result<StatusSnapshot, RepoError> {
    let entries = collect_status(repo)?;

    let staged = entries.iter().filter(|e| e.staged).count();
    let untracked = entries
        .iter()
        .filter(|e| e.kind == ChangeKind::Untracked)
        .count();
    let unstaged = entries.len() - staged - untracked;

    let branch = current_branch(repo)?;
    let upstream = ahead_behind(repo)?;
    let has_conflicts = has_unresolved_conflicts(repo)?;

    let snapshot = StatusSnapshot {
        branch,
        staged,
        unstaged,
        untracked,
        ahead: upstream.map(|(a, _)| a),
        behind: upstream.map(|(_, b)| b),
        has_conflicts,
        ready_to_commit: staged > 0 && !has_conflicts,
    };

    debug!(
        "status: {} staged, {} unstaged, {} untracked, ready={}",
        snapshot.staged, snapshot.unstaged, snapshot.untracked, snapshot.ready_to_commit
    );

    Ok(snapshot)
}
