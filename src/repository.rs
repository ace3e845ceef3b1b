//! Trait seam over version-control operations.
//!
//! The pipelines never call the `git` and `filter` modules directly; they go
//! through [`GitOperations`], so tests can inject mock implementations and
//! exercise scheduling, cancellation, and merge ordering without running a
//! single subprocess. [`DefaultGitOperations`] is the production
//! implementation, delegating to the real wrappers.

use std::path::Path;

use crate::error::Result;
use crate::{filter, git};

/// Version-control operations used by the pipelines - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Clone `url` into `dest` with full history.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// List remote-tracking branches (prefix stripped, HEAD excluded).
    fn list_remote_branches(&self, repo: &Path) -> Result<Vec<String>>;

    /// List local branches.
    fn list_branches(&self, repo: &Path) -> Result<Vec<String>>;

    /// Check out an existing branch.
    fn checkout_branch(&self, branch: &str, repo: &Path) -> Result<()>;

    /// Create and check out an orphan branch with an empty root commit.
    fn checkout_orphan(&self, branch: &str, repo: &Path) -> Result<()>;

    /// Report the currently checked-out branch.
    fn current_branch(&self, repo: &Path) -> Result<String>;

    /// Rewrite the checked-out branch so all files move under `prefix/`.
    fn move_history(&self, prefix: &str, repo: &Path) -> Result<()>;

    /// Strip `dir` from the checked-out branch's history.
    fn remove_directory(&self, dir: &str, repo: &Path) -> Result<()>;

    /// Register a remote.
    fn add_remote(&self, name: &str, url: &str, repo: &Path) -> Result<()>;

    /// Fetch a remote without touching existing local refs.
    fn fetch_remote(&self, name: &str, repo: &Path) -> Result<()>;

    /// Remove a remote.
    fn remove_remote(&self, name: &str, repo: &Path) -> Result<()>;

    /// Merge `source` into the checked-out branch, allowing unrelated
    /// histories.
    fn merge_unrelated(&self, source: &str, message: &str, repo: &Path) -> Result<()>;

    /// Import a remote's tags under `refs/tags/<name>/*`.
    fn import_tags(&self, name: &str, repo: &Path) -> Result<()>;

    /// Snapshot (branch, tip commit) pairs for every local branch.
    fn branch_tips(&self, repo: &Path) -> Result<Vec<(String, String)>>;
}

/// Production implementation backed by the system `git` binary.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        git::clone_repo(url, dest)
    }

    fn list_remote_branches(&self, repo: &Path) -> Result<Vec<String>> {
        git::list_remote_branches(repo)
    }

    fn list_branches(&self, repo: &Path) -> Result<Vec<String>> {
        git::list_branches(repo)
    }

    fn checkout_branch(&self, branch: &str, repo: &Path) -> Result<()> {
        git::checkout_branch(branch, repo)
    }

    fn checkout_orphan(&self, branch: &str, repo: &Path) -> Result<()> {
        git::checkout_orphan(branch, repo)
    }

    fn current_branch(&self, repo: &Path) -> Result<String> {
        git::current_branch(repo)
    }

    fn move_history(&self, prefix: &str, repo: &Path) -> Result<()> {
        filter::move_history(prefix, repo)
    }

    fn remove_directory(&self, dir: &str, repo: &Path) -> Result<()> {
        filter::remove_directory(dir, repo)
    }

    fn add_remote(&self, name: &str, url: &str, repo: &Path) -> Result<()> {
        git::add_remote(name, url, repo)
    }

    fn fetch_remote(&self, name: &str, repo: &Path) -> Result<()> {
        git::fetch_remote(name, repo)
    }

    fn remove_remote(&self, name: &str, repo: &Path) -> Result<()> {
        git::remove_remote(name, repo)
    }

    fn merge_unrelated(&self, source: &str, message: &str, repo: &Path) -> Result<()> {
        git::merge_unrelated(source, message, repo)
    }

    fn import_tags(&self, name: &str, repo: &Path) -> Result<()> {
        git::import_tags(name, repo)
    }

    fn branch_tips(&self, repo: &Path) -> Result<Vec<(String, String)>> {
        git::branch_tips(repo)
    }
}
