//! Thin wrappers around the system `git` command.
//!
//! Every function here is a single subprocess invocation returning a typed
//! result. Using the system git means credential helpers, ssh-agent, and
//! `~/.gitconfig` all work as the user expects; when the conventional
//! `~/.ssh/id_rsa` key exists, clones additionally pin `GIT_SSH_COMMAND` to
//! it so non-interactive runs authenticate the way the original tooling did.
//!
//! All subprocess stderr is captured and surfaced in errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a git subcommand in `dir`, failing with captured stderr on a non-zero
/// exit.
fn run_git(args: &[&str], dir: &Path) -> Result<Output> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            dir: dir.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

/// Build the `GIT_SSH_COMMAND` value for a private key path.
fn ssh_command_for(key: &Path) -> String {
    format!("ssh -i {} -o IdentitiesOnly=yes", key.display())
}

/// Resolve the conventional private-key location, if present.
fn ssh_command() -> Option<String> {
    let key = dirs::home_dir()?.join(".ssh").join("id_rsa");
    key.exists().then(|| ssh_command_for(&key))
}

/// Clone `url` into `dest` with full history.
///
/// Fails if `dest` already exists: concurrent workers must never share a
/// clone directory, so a pre-existing one means a manifest name collision or
/// a leftover from an aborted run.
pub fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        return Err(Error::Clone {
            url: url.to_string(),
            message: format!("destination {} already exists", dest.display()),
        });
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone").arg(url).arg(dest);
    if let Some(ssh) = ssh_command() {
        cmd.env("GIT_SSH_COMMAND", ssh);
    }

    let output = cmd.output()?;
    if !output.status.success() {
        return Err(Error::Clone {
            url: url.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Initialize a new repository directory under `wd` with an empty root
/// commit. The empty commit anchors later unrelated-history merges.
pub fn init_repo(name: &str, wd: &Path) -> Result<PathBuf> {
    let path = wd.join(name);
    fs::create_dir(&path)?;

    // -b pins the primary branch regardless of the host's init.defaultBranch
    run_git(&["init", "-b", "master"], &path)?;
    run_git(
        &[
            "commit",
            "--allow-empty",
            "-m",
            &format!("Root commit for {}", name),
        ],
        &path,
    )?;

    Ok(path)
}

/// List remote-tracking branches of the repository at `path`, with the
/// remote prefix stripped and the symbolic HEAD pointer excluded.
pub fn list_remote_branches(path: &Path) -> Result<Vec<String>> {
    let output = run_git(&["branch", "-r"], path)?;
    Ok(parse_remote_branches(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

/// List local branches of the repository at `path`.
pub fn list_branches(path: &Path) -> Result<Vec<String>> {
    let output = run_git(&["branch", "-v"], path)?;
    Ok(parse_local_branches(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

/// Check out an existing branch. Fails if the branch does not exist.
pub fn checkout_branch(branch: &str, path: &Path) -> Result<()> {
    run_git(&["checkout", branch], path)?;
    Ok(())
}

/// Create and check out an orphan branch with an empty root commit.
///
/// The new branch shares no history with any existing branch, so source
/// branches the destination has never seen still get an anchor to merge
/// into.
pub fn checkout_orphan(branch: &str, path: &Path) -> Result<()> {
    run_git(&["checkout", "--orphan", branch], path)?;
    run_git(&["rm", "-rf", "--ignore-unmatch", "."], path)?;
    run_git(
        &[
            "commit",
            "--allow-empty",
            "-m",
            &format!("Root commit for {} branch", branch),
        ],
        path,
    )?;
    Ok(())
}

/// Report the currently checked-out branch name.
pub fn current_branch(path: &Path) -> Result<String> {
    let output = run_git(&["rev-parse", "--abbrev-ref", "HEAD"], path)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Register a local clone path as a remote of the repository at `repo`.
pub fn add_remote(name: &str, url: &str, repo: &Path) -> Result<()> {
    run_git(&["remote", "add", name, url], repo).map_err(|e| Error::Remote {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Fetch a remote. Does not touch existing local refs.
pub fn fetch_remote(name: &str, repo: &Path) -> Result<()> {
    run_git(&["fetch", name], repo).map_err(|e| Error::Remote {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Remove a remote.
pub fn remove_remote(name: &str, repo: &Path) -> Result<()> {
    run_git(&["remote", "rm", name], repo).map_err(|e| Error::Remote {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Merge `source` into the currently checked-out branch, explicitly allowing
/// unrelated histories, with a provenance message.
pub fn merge_unrelated(source: &str, message: &str, repo: &Path) -> Result<()> {
    run_git(
        &["merge", source, "--allow-unrelated-histories", "-m", message],
        repo,
    )?;
    Ok(())
}

/// Import a remote's tags under `refs/tags/<name>/*` without overwriting
/// destination tags.
pub fn import_tags(name: &str, repo: &Path) -> Result<()> {
    let refspec = format!("refs/tags/*:refs/tags/{}/*", name);
    run_git(&["fetch", name, &refspec, "--no-tags"], repo).map_err(|e| Error::Remote {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Snapshot (branch, tip commit id) pairs for every local branch.
pub fn branch_tips(repo: &Path) -> Result<Vec<(String, String)>> {
    let output = run_git(
        &[
            "for-each-ref",
            "--format=%(refname:short) %(objectname)",
            "refs/heads",
        ],
        repo,
    )?;
    Ok(parse_branch_tips(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_remote_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let branch = line.trim().replace("origin/", "");
            if branch.starts_with("HEAD") || branch.is_empty() {
                None
            } else {
                Some(branch)
            }
        })
        .collect()
}

fn parse_local_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            // `git branch -v` marks the current branch with a leading `*`
            let branch = line.split_whitespace().next()?;
            if branch == "*" || branch.contains("HEAD") {
                // the branch name follows the marker
                line.split_whitespace()
                    .nth(1)
                    .filter(|b| !b.contains("HEAD"))
                    .map(|b| b.to_string())
            } else {
                Some(branch.to_string())
            }
        })
        .collect()
}

fn parse_branch_tips(stdout: &str) -> Vec<(String, String)> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            Some((parts.next()?.to_string(), parts.next()?.to_string()))
        })
        .collect()
}
