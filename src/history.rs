//! Per-branch orchestration for the standalone history tools.
//!
//! The filter engines in [`crate::filter`] only touch the currently
//! checked-out branch; these helpers supply the branch iteration the
//! `rewrite-history` and `rm-dir` binaries need.

use std::path::Path;

use crate::error::Result;
use crate::repository::GitOperations;

/// Rewrite history so every file appears under `dir/`.
///
/// With `all_branches` set, every remote branch is checked out and rewritten
/// in turn; otherwise only the currently checked-out branch is touched.
pub fn move_into_dir(
    ops: &dyn GitOperations,
    dir: &str,
    repo: &Path,
    all_branches: bool,
) -> Result<()> {
    if all_branches {
        for branch in ops.list_remote_branches(repo)? {
            println!("rewriting history for branch {}", branch);
            ops.checkout_branch(&branch, repo)?;
            ops.move_history(dir, repo)?;
        }
        return Ok(());
    }

    let current = ops.current_branch(repo)?;
    println!("rewriting history for branch {}", current);
    ops.move_history(dir, repo)
}

/// Remove each directory from the history of every local branch.
///
/// Each (directory, branch) pair runs its own filter script; re-running on a
/// directory already absent from history is a no-op that still succeeds.
pub fn remove_dirs(ops: &dyn GitOperations, dirs: &[String], repo: &Path) -> Result<()> {
    for dir in dirs {
        let dir = dir.trim();

        for branch in ops.list_branches(repo)? {
            ops.checkout_branch(&branch, repo)?;
            println!("removing {:?} on branch {:?}", dir, branch);
            ops.remove_directory(dir, repo)?;
        }
    }

    Ok(())
}
