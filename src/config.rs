//! Run configuration for the merge tool.
//!
//! All knobs are collected into a single immutable struct constructed once at
//! startup and passed by reference into the pipeline entry points. Nothing in
//! the library reads global state.

use std::path::PathBuf;

/// Number of concurrent clone/rewrite workers.
pub const WORKERS: usize = 4;

/// Depth of the bounded work queue feeding the workers. The manifest reader
/// blocks when this many specs are waiting.
pub const QUEUE_DEPTH: usize = 4;

/// Configuration for one `repo-merge` run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Name of the monorepo directory to create (also its root-commit label).
    pub monorepo_name: String,
    /// Path to the manifest file listing the repositories to merge.
    pub manifest_path: PathBuf,
    /// Directory the monorepo and temporary clones are created under.
    pub working_dir: PathBuf,
    /// Worker pool size for the clone/rewrite phase.
    pub workers: usize,
    /// Bounded work queue capacity.
    pub queue_depth: usize,
}

impl MergeConfig {
    pub fn new(monorepo_name: String, manifest_path: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            monorepo_name,
            manifest_path,
            working_dir,
            workers: WORKERS,
            queue_depth: QUEUE_DEPTH,
        }
    }

    /// Absolute path of the monorepo directory.
    pub fn monorepo_path(&self) -> PathBuf {
        self.working_dir.join(&self.monorepo_name)
    }
}
