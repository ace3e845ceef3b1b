//! # Monorepo Tools
//!
//! Library behind three small CLI tools for assembling a monorepo out of
//! independent git repositories:
//!
//! - `repo-merge` clones every repository named in a manifest, rewrites each
//!   one's history so its files live under a subdirectory, and merges the
//!   rewritten histories, branches, and tags into one destination
//!   repository.
//! - `rewrite-history` rewrites a single repository in place so it appears
//!   to have always lived under a given directory.
//! - `rm-dir` strips directories from a repository's history after the fact.
//!
//! ## Execution Flow
//!
//! The merge tool runs two phases:
//!
//! 1. **Prepare** ([`phases::prepare`]): a fixed pool of workers clones the
//!    manifest's repositories in parallel and rewrites each branch's history
//!    under the destination subdirectory, producing one [`phases::MergeItem`]
//!    per repository. The first error cancels the run.
//! 2. **Merge** ([`phases::merge`]): single-threaded, folds each prepared
//!    item into the destination repository - remote add, fetch, per-branch
//!    unrelated-history merge (orphan branches created on demand), namespaced
//!    tag import - then reconciles branches the items did not share and
//!    removes all temporary state.
//!
//! The version-control engine itself is out of scope: everything is driven
//! through the system `git` binary via [`repository::GitOperations`], which
//! tests replace with mocks.
//!
//! History rewriting is destructive and in place. There is no rollback; take
//! a backup before pointing these tools at anything you care about.

pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod git;
pub mod history;
pub mod manifest;
pub mod output;
pub mod phases;
pub mod repository;
