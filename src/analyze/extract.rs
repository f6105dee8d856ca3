//! Change extraction from the working tree and index.
//!
//! Both analysis modes produce the same [`FileChange`] shape so the
//! classifier has one interface regardless of mode; lite mode simply
//! leaves `hunks` empty.

use std::cell::RefCell;

use git2::{Delta, Diff, DiffOptions, ErrorCode, Repository, Tree};
use serde::Serialize;
use tracing::debug;

use crate::error::{AnalyzeError, RepoError};
use crate::repo::status::{ChangeKind, collect_status};

/// Default number of context lines around each diff hunk.
pub const DEFAULT_CONTEXT_LINES: u32 = 3;

/// Maximum content lines sampled per hunk side. Counts keep accumulating
/// past the cap; only the stored lines are bounded.
const MAX_SAMPLED_LINES: usize = 64;

/// How much diff detail to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Staged and unstaged diffs with hunk content.
    Full { context_lines: u32 },
    /// Path, kind, and staged flag only; no diff is ever built.
    Lite,
}

impl Default for AnalysisMode {
    fn default() -> Self {
        AnalysisMode::Full {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// One contiguous block of added/removed lines within a file diff.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Hunk {
    pub added: usize,
    pub removed: usize,
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
}

/// One modified path, normalized across modes.
#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
    pub staged: bool,
    /// Prior path for renamed or copied files.
    pub old_path: Option<String>,
    /// Empty in lite mode and for binary files.
    pub hunks: Vec<Hunk>,
    pub is_binary: bool,
}

/// Extract the ordered change set for the given mode.
///
/// A path staged and then modified again appears once; the staged entry
/// wins. Fails with [`AnalyzeError::NoChanges`] when nothing changed.
pub fn extract_changes(
    repo: &Repository,
    mode: AnalysisMode,
) -> Result<Vec<FileChange>, AnalyzeError> {
    let mut changes = match mode {
        AnalysisMode::Lite => collect_lite(repo)?,
        AnalysisMode::Full { context_lines } => collect_full(repo, context_lines)?,
    };

    // Staged entries were gathered first; the stable sort keeps them ahead
    // of unstaged entries for the same path, and dedup keeps the first.
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes.dedup_by(|a, b| a.path == b.path);

    if changes.is_empty() {
        return Err(AnalyzeError::NoChanges);
    }

    debug!("extracted {} changed files ({:?})", changes.len(), mode);

    Ok(changes)
}

/// Lite mode: the status primitive only.
fn collect_lite(repo: &Repository) -> Result<Vec<FileChange>, RepoError> {
    let entries = collect_status(repo)?;
    Ok(entries
        .into_iter()
        .map(|e| FileChange {
            path: e.path,
            kind: e.kind,
            staged: e.staged,
            old_path: e.old_path,
            hunks: Vec::new(),
            is_binary: false,
        })
        .collect())
}

/// Full mode: staged diff (with rename detection) plus unstaged diff
/// including untracked files.
fn collect_full(repo: &Repository, context_lines: u32) -> Result<Vec<FileChange>, RepoError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut staged_opts = DiffOptions::new();
    staged_opts.context_lines(context_lines);
    let mut staged_diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
        .map_err(RepoError::DiffFailed)?;
    staged_diff
        .find_similar(None)
        .map_err(RepoError::DiffFailed)?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts
        .context_lines(context_lines)
        .include_untracked(true)
        .recurse_untracked_dirs(true);
    let unstaged_diff = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(RepoError::DiffFailed)?;

    let mut changes = Vec::new();
    collect_from_diff(&staged_diff, true, &mut changes)?;
    collect_from_diff(&unstaged_diff, false, &mut changes)?;

    Ok(changes)
}

/// Resolve the HEAD tree, distinguishing empty-repo conditions from real
/// failures. `Ok(None)` means an unborn branch; the diff is then taken
/// against an empty tree.
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, RepoError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(RepoError::HeadFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(RepoError::HeadFailed)?;
    Ok(Some(tree))
}

/// Walk a diff and build one [`FileChange`] per delta, with hunks and
/// sampled line content.
fn collect_from_diff(
    diff: &Diff<'_>,
    staged: bool,
    out: &mut Vec<FileChange>,
) -> Result<(), RepoError> {
    let files = RefCell::new(Vec::<FileChange>::new());

    let mut file_cb = |delta: git2::DiffDelta<'_>, _progress: f32| {
        let kind = match delta.status() {
            Delta::Added => ChangeKind::Added,
            Delta::Untracked => ChangeKind::Untracked,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Renamed => ChangeKind::Renamed,
            Delta::Copied => ChangeKind::Copied,
            _ => ChangeKind::Modified,
        };

        let new_path = delta
            .new_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());
        let old_path = delta
            .old_file()
            .path()
            .map(|p| p.to_string_lossy().to_string());

        let (path, old_path) = match kind {
            ChangeKind::Renamed | ChangeKind::Copied => {
                let path = new_path.or_else(|| old_path.clone()).unwrap_or_default();
                (path, old_path)
            }
            _ => (new_path.or(old_path).unwrap_or_default(), None),
        };

        if !path.is_empty() {
            files.borrow_mut().push(FileChange {
                path,
                kind,
                staged,
                old_path,
                hunks: Vec::new(),
                is_binary: delta.old_file().is_binary() || delta.new_file().is_binary(),
            });
        }
        true
    };

    let mut binary_cb = |_delta: git2::DiffDelta<'_>, _binary: git2::DiffBinary<'_>| {
        if let Some(last) = files.borrow_mut().last_mut() {
            last.is_binary = true;
            last.hunks.clear();
        }
        true
    };

    let mut hunk_cb = |_delta: git2::DiffDelta<'_>, _hunk: git2::DiffHunk<'_>| {
        if let Some(last) = files.borrow_mut().last_mut() {
            last.hunks.push(Hunk::default());
        }
        true
    };

    let mut line_cb = |_delta: git2::DiffDelta<'_>,
                       _hunk: Option<git2::DiffHunk<'_>>,
                       line: git2::DiffLine<'_>| {
        let mut files = files.borrow_mut();
        let Some(change) = files.last_mut() else {
            return true;
        };
        let Some(hunk) = change.hunks.last_mut() else {
            return true;
        };

        let content = std::str::from_utf8(line.content())
            .unwrap_or("")
            .trim_end()
            .to_string();

        match line.origin() {
            '+' => {
                hunk.added += 1;
                if hunk.added_lines.len() < MAX_SAMPLED_LINES {
                    hunk.added_lines.push(content);
                }
            }
            '-' => {
                hunk.removed += 1;
                if hunk.removed_lines.len() < MAX_SAMPLED_LINES {
                    hunk.removed_lines.push(content);
                }
            }
            _ => {}
        }
        true
    };

    diff.foreach(
        &mut file_cb,
        Some(&mut binary_cb),
        Some(&mut hunk_cb),
        Some(&mut line_cb),
    )
    .map_err(RepoError::DiffFailed)?;

    out.extend(files.into_inner());
    Ok(())
}
