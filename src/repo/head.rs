//! Branch, upstream, and merge-state lookups.

use git2::{BranchType, ErrorCode, Repository};

use crate::error::RepoError;

/// Short name of the current branch.
///
/// Returns `None` when HEAD is detached. On an unborn branch (fresh repo,
/// no commits) the symbolic target of HEAD still names the branch, so the
/// name is reported.
pub fn current_branch(repo: &Repository) -> Result<Option<String>, RepoError> {
    let head = match repo.head() {
        Ok(h) => h,
        Err(e) if e.code() == ErrorCode::UnbornBranch => {
            let head_ref = repo
                .find_reference("HEAD")
                .map_err(RepoError::HeadFailed)?;
            return Ok(head_ref
                .symbolic_target()
                .and_then(|t| t.strip_prefix("refs/heads/"))
                .map(str::to_string));
        }
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(RepoError::HeadFailed(e)),
    };

    if !head.is_branch() {
        return Ok(None);
    }

    Ok(head.shorthand().map(str::to_string))
}

/// Commits ahead of and behind the upstream of the current branch.
///
/// Returns `None` when HEAD is not on a branch or the branch has no
/// upstream configured.
pub fn ahead_behind(repo: &Repository) -> Result<Option<(usize, usize)>, RepoError> {
    let head = match repo.head() {
        Ok(h) if h.is_branch() => h,
        Ok(_) => return Ok(None),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(RepoError::HeadFailed(e)),
    };

    let Some(local_oid) = head.target() else {
        return Ok(None);
    };
    let Some(name) = head.shorthand() else {
        return Ok(None);
    };

    let Ok(branch) = repo.find_branch(name, BranchType::Local) else {
        return Ok(None);
    };
    let Ok(upstream) = branch.upstream() else {
        return Ok(None);
    };
    let Some(upstream_oid) = upstream.get().target() else {
        return Ok(None);
    };

    let (ahead, behind) = repo
        .graph_ahead_behind(local_oid, upstream_oid)
        .map_err(RepoError::HeadFailed)?;

    Ok(Some((ahead, behind)))
}

/// Presence check on the index merge state. Never scans file content.
pub fn has_unresolved_conflicts(repo: &Repository) -> Result<bool, RepoError> {
    Ok(repo.index().map_err(RepoError::IndexFailed)?.has_conflicts())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_with_commit(dir: &std::path::Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = git2::Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[]).unwrap();
        }
        repo
    }

    #[test]
    fn test_current_branch_on_fresh_repo_reports_unborn_name() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        // No commits yet: HEAD is unborn but still names the default branch
        let branch = current_branch(&repo).unwrap();
        assert!(branch.is_some());
    }

    #[test]
    fn test_current_branch_after_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        let branch = current_branch(&repo).unwrap().unwrap();
        assert!(branch == "master" || branch == "main");
    }

    #[test]
    fn test_current_branch_detached_head_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        let oid = repo.head().unwrap().target().unwrap();
        repo.set_head_detached(oid).unwrap();

        assert_eq!(current_branch(&repo).unwrap(), None);
    }

    #[test]
    fn test_ahead_behind_without_upstream_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        assert_eq!(ahead_behind(&repo).unwrap(), None);
    }

    #[test]
    fn test_no_conflicts_on_clean_repo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        assert!(!has_unresolved_conflicts(&repo).unwrap());
    }
}
