//! Filter-script generation and execution.
//!
//! Both history engines work the same way: render a single-use bash script
//! that drives `git filter-branch` over the currently checked-out branch,
//! run it inside the repository, and delete it afterwards. The script lives
//! in a [`tempfile::NamedTempFile`], so it is removed exactly once whether
//! the rewrite succeeds or fails.
//!
//! The rewrite is destructive and in place; there is no rollback. Callers
//! that want every branch rewritten must iterate branches themselves, which
//! is why the scripts pass `-f`: the second branch's rewrite must tolerate
//! the `refs/original/` backup left by the first.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Render the filter script that moves every tracked file under `prefix/`.
///
/// The sed expression rewrites `git ls-files -s` output, so characters that
/// are meaningful inside it (`.` as a pattern metacharacter, `-` as the
/// expression delimiter) are escaped before substitution.
fn move_script(prefix: &str) -> String {
    format!(
        "#!/usr/bin/env bash\n\
         export FILTER_BRANCH_SQUELCH_WARNING=1\n\
         git filter-branch -f --index-filter 'git ls-files -s | sed \"s-\t\\\"*-&{}/-\" | GIT_INDEX_FILE=$GIT_INDEX_FILE.new git update-index --index-info && mv \"$GIT_INDEX_FILE.new\" \"$GIT_INDEX_FILE\"' HEAD\n",
        escape_prefix(prefix)
    )
}

/// Render the filter script that strips `dir` from every commit and prunes
/// commits left empty.
fn remove_dir_script(dir: &str) -> String {
    format!(
        "#!/usr/bin/env bash\n\
         export FILTER_BRANCH_SQUELCH_WARNING=1\n\
         git filter-branch -f --index-filter 'git rm --cached --ignore-unmatch -r {}' --prune-empty HEAD\n",
        dir
    )
}

fn escape_prefix(prefix: &str) -> String {
    prefix.replace('.', "\\.").replace('-', "\\-")
}

/// Write `script` to a temp file and run it with bash inside `repo`.
fn run_script(script: &str, repo: &Path) -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(script.as_bytes())?;
    file.flush()?;

    let output = Command::new("bash")
        .arg(file.path())
        .current_dir(repo)
        .output()?;

    if !output.status.success() {
        return Err(Error::GitCommand {
            command: "filter-branch".to_string(),
            dir: repo.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
    // temp script deleted on drop, success or not
}

/// Rewrite the currently checked-out branch of `repo` so every file appears
/// under `prefix/`. Irreversible without a prior backup.
pub fn move_history(prefix: &str, repo: &Path) -> Result<()> {
    run_script(&move_script(prefix), repo).map_err(|e| Error::Rewrite {
        name: prefix.to_string(),
        message: e.to_string(),
    })
}

/// Remove `dir` from every commit of the currently checked-out branch of
/// `repo`, pruning commits left empty. A no-op (still successful) when the
/// directory never existed in history.
pub fn remove_directory(dir: &str, repo: &Path) -> Result<()> {
    run_script(&remove_dir_script(dir), repo).map_err(|e| Error::RemoveDir {
        dir: dir.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_escape_prefix_dots_and_dashes() {
        assert_eq!(escape_prefix("a.b-c"), "a\\.b\\-c");
        assert_eq!(escape_prefix("plain"), "plain");
        assert_eq!(escape_prefix("many-dashes--"), "many\\-dashes\\-\\-");
    }

    #[test]
    fn test_move_script_contains_escaped_prefix() {
        let script = move_script("a.b-c");
        // the literal directory, not a pattern
        assert!(script.contains("a\\.b\\-c/"));
        assert!(script.contains("git filter-branch -f --index-filter"));
        assert!(script.contains("HEAD"));
        assert!(script.contains("FILTER_BRANCH_SQUELCH_WARNING=1"));
    }

    #[test]
    fn test_move_script_rewrites_index_atomically() {
        let script = move_script("alpha");
        assert!(script.contains("GIT_INDEX_FILE=$GIT_INDEX_FILE.new"));
        assert!(script.contains("mv \"$GIT_INDEX_FILE.new\" \"$GIT_INDEX_FILE\""));
    }

    #[test]
    fn test_remove_dir_script_prunes_empty_commits() {
        let script = remove_dir_script("vendor");
        assert!(script.contains("git rm --cached --ignore-unmatch -r vendor"));
        assert!(script.contains("--prune-empty HEAD"));
        assert!(script.contains("filter-branch -f"));
    }

    #[test]
    fn test_run_script_success() {
        let dir = TempDir::new().unwrap();
        run_script("#!/usr/bin/env bash\ntrue\n", dir.path()).unwrap();
    }

    #[test]
    fn test_run_script_failure_captures_stderr() {
        let dir = TempDir::new().unwrap();
        let err = run_script(
            "#!/usr/bin/env bash\necho boom >&2\nexit 3\n",
            dir.path(),
        )
        .unwrap_err();
        let display = format!("{}", err);
        assert!(display.contains("boom"));
    }
}
