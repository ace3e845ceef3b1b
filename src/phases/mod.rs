//! The two phases of a monorepo merge.
//!
//! 1. Prepare (`prepare`) - clone every source repository in parallel and
//!    rewrite each one's history under its destination subdirectory.
//! 2. Merge (`merge`) - fold the prepared repositories, their branches, and
//!    their tags into the destination repository, one at a time.
//!
//! The prepare phase is the only concurrent part of the system; the merge
//! phase mutates a single shared working tree and is strictly sequential.

use std::path::PathBuf;

pub mod merge;
pub mod prepare;

/// A prepared source repository, produced by the prepare phase and consumed
/// exactly once by the merge phase.
///
/// The item owns the lifetime of its clone directory: `remote_path` exists
/// and is non-empty until the merge phase finishes with the item, after
/// which the directory is deleted.
#[derive(Debug, Clone)]
pub struct MergeItem {
    /// Absolute path to the locally cloned, rewritten repository.
    pub remote_path: PathBuf,
    /// Repository name, used as the remote name and path-prefix identity.
    pub name: String,
    /// Branches discovered on the source repository, in discovery order.
    pub branches: Vec<String>,
}
