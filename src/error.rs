//! # Error Handling
//!
//! Centralized error handling for the monorepo tools. A single `thiserror`
//! enum covers every anticipated failure mode so that errors carry enough
//! context (repository name, branch, command, captured stderr) to identify
//! the failing step from the top-level CLI output alone.
//!
//! Subprocess failures always capture the underlying git diagnostic output
//! into the `stderr` field rather than discarding it.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for monorepo operations
#[derive(Error, Debug)]
pub enum Error {
    /// A manifest line did not have the minimum two whitespace-separated
    /// fields (`<remote-url> <name> [local-folder]`).
    #[error("malformed manifest line {lineno}: {line:?}")]
    Manifest { lineno: usize, line: String },

    /// An error occurred while cloning a source repository.
    #[error("could not clone {url:?}: {message}")]
    Clone { url: String, message: String },

    /// A git subprocess exited non-zero. Carries the command, the directory
    /// it ran in, and whatever git printed to stderr.
    #[error("git {command} failed in {dir:?}: {stderr}")]
    GitCommand {
        command: String,
        dir: PathBuf,
        stderr: String,
    },

    /// History rewriting failed for a repository.
    #[error("could not rewrite history for {name:?}: {message}")]
    Rewrite { name: String, message: String },

    /// A branch merge into the destination repository failed. The field is
    /// `source_branch` rather than `source`, which `thiserror` reserves for
    /// the error-chain accessor.
    #[error("could not merge {source_branch:?} into {dest:?}: {message}")]
    Merge {
        source_branch: String,
        dest: String,
        message: String,
    },

    /// Creating, fetching, or removing a temporary remote failed.
    #[error("remote {name:?}: {message}")]
    Remote { name: String, message: String },

    /// A directory removal from history failed.
    #[error("failed to remove {dir:?} from git history: {message}")]
    RemoveDir { dir: String, message: String },

    /// The concurrent pipeline could not be set up or torn down.
    #[error("pipeline error: {message}")]
    Pipeline { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
