//! Phase 1: concurrent clone and history rewrite.
//!
//! A fixed pool of workers pulls [`WorkSpec`]s from a bounded queue. Each
//! worker clones its repository, enumerates the remote branches, checks each
//! branch out, and rewrites its history so every file lands under the local
//! folder name. Completed [`MergeItem`]s flow back over a results channel
//! drained by the single owning caller, so no shared list is ever appended
//! to concurrently.
//!
//! Failure semantics are first-error-wins: the first worker (or manifest)
//! error lands in a single-slot cell and raises a cancellation flag. Workers
//! observe the flag and stop processing further specs; in-flight subprocess
//! invocations finish naturally. Results collected before cancellation are
//! discarded once the phase reports failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::config::MergeConfig;
use crate::error::{Error, Result};
use crate::manifest::WorkSpec;
use crate::repository::GitOperations;

use super::MergeItem;

/// Executes the prepare phase.
///
/// `specs` is typically a [`crate::manifest::WorkSpecs`] iterator reading the
/// manifest lazily; the bounded queue gives it backpressure. On success the
/// returned items are in completion order, not manifest order.
pub fn execute<I>(
    specs: I,
    ops: &dyn GitOperations,
    config: &MergeConfig,
) -> Result<Vec<MergeItem>>
where
    I: IntoIterator<Item = Result<WorkSpec>> + Send,
{
    // One slot for the producer closure plus one per worker; the scope
    // closure itself occupies a pool thread.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers + 1)
        .build()
        .map_err(|e| Error::Pipeline {
            message: e.to_string(),
        })?;

    let (work_tx, work_rx) = mpsc::sync_channel::<WorkSpec>(config.queue_depth);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (item_tx, item_rx) = mpsc::channel::<MergeItem>();

    let cancelled = AtomicBool::new(false);
    let first_error: Mutex<Option<Error>> = Mutex::new(None);

    // Record an error into the single slot, first writer wins, and signal
    // cancellation. Later errors are dropped by design.
    let report = |err: Error| {
        if let Ok(mut slot) = first_error.lock() {
            slot.get_or_insert(err);
        }
        cancelled.store(true, Ordering::SeqCst);
    };

    pool.scope(|s| {
        for _ in 0..config.workers {
            let work_rx = Arc::clone(&work_rx);
            let item_tx = item_tx.clone();
            let cancelled = &cancelled;
            let report = &report;
            s.spawn(move |_| {
                loop {
                    // Keep draining after cancellation so the producer is
                    // never left blocked on a full queue.
                    let spec = match work_rx.lock() {
                        Ok(rx) => rx.recv(),
                        Err(_) => break,
                    };
                    let spec = match spec {
                        Ok(spec) => spec,
                        Err(_) => break, // queue closed
                    };
                    if cancelled.load(Ordering::SeqCst) {
                        continue;
                    }
                    match prepare_one(&spec, ops, config) {
                        Ok(item) => {
                            if item_tx.send(item).is_err() {
                                break;
                            }
                        }
                        Err(e) => report(e),
                    }
                }
            });
        }

        // Producer: feed specs into the bounded queue until the manifest is
        // exhausted, a line fails to parse, or a worker cancels the run.
        for spec in specs {
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            match spec {
                Ok(spec) => {
                    if work_tx.send(spec).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    report(e);
                    break;
                }
            }
        }
        drop(work_tx);
    });

    drop(item_tx);

    if let Ok(mut slot) = first_error.lock() {
        if let Some(err) = slot.take() {
            return Err(err);
        }
    }

    Ok(item_rx.into_iter().collect())
}

/// Clone, enumerate branches, and rewrite one repository. Clone, listing,
/// and per-branch rewrite are strictly sequential: each step depends on the
/// previous step's filesystem state.
fn prepare_one(
    spec: &WorkSpec,
    ops: &dyn GitOperations,
    config: &MergeConfig,
) -> Result<MergeItem> {
    let repo_path = config.working_dir.join(&spec.local_folder);

    println!("rewriting history for {:?}", spec.name);

    ops.clone_repo(&spec.remote_url, &repo_path)?;

    let branches = ops.list_remote_branches(&repo_path)?;
    for branch in &branches {
        ops.checkout_branch(branch, &repo_path)?;
        ops.move_history(&spec.local_folder, &repo_path)?;
    }

    Ok(MergeItem {
        remote_path: repo_path,
        name: spec.name.clone(),
        branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn test_config() -> MergeConfig {
        MergeConfig::new(
            "monorepo".to_string(),
            PathBuf::from("repos.txt"),
            PathBuf::from("/work"),
        )
    }

    fn spec(url: &str, name: &str) -> Result<WorkSpec> {
        Ok(WorkSpec {
            remote_url: url.to_string(),
            name: name.to_string(),
            local_folder: name.to_string(),
        })
    }

    /// Mock operations recording every call, optionally failing clones for
    /// chosen URLs.
    struct MockOps {
        calls: Mutex<Vec<String>>,
        branches: Vec<String>,
        fail_clone_urls: Vec<String>,
    }

    impl MockOps {
        fn new(branches: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                branches: branches.iter().map(|b| b.to_string()).collect(),
                fail_clone_urls: Vec::new(),
            }
        }

        fn failing_on(branches: &[&str], urls: &[&str]) -> Self {
            Self {
                fail_clone_urls: urls.iter().map(|u| u.to_string()).collect(),
                ..Self::new(branches)
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GitOperations for MockOps {
        fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
            self.record(format!("clone {} {}", url, dest.display()));
            if self.fail_clone_urls.iter().any(|u| u == url) {
                return Err(Error::Clone {
                    url: url.to_string(),
                    message: "mock clone failure".to_string(),
                });
            }
            Ok(())
        }

        fn list_remote_branches(&self, repo: &Path) -> Result<Vec<String>> {
            self.record(format!("list-remote {}", repo.display()));
            Ok(self.branches.clone())
        }

        fn list_branches(&self, _repo: &Path) -> Result<Vec<String>> {
            Ok(self.branches.clone())
        }

        fn checkout_branch(&self, branch: &str, repo: &Path) -> Result<()> {
            self.record(format!("checkout {} {}", branch, repo.display()));
            Ok(())
        }

        fn checkout_orphan(&self, branch: &str, _repo: &Path) -> Result<()> {
            self.record(format!("orphan {}", branch));
            Ok(())
        }

        fn current_branch(&self, _repo: &Path) -> Result<String> {
            Ok("master".to_string())
        }

        fn move_history(&self, prefix: &str, repo: &Path) -> Result<()> {
            self.record(format!("move {} {}", prefix, repo.display()));
            Ok(())
        }

        fn remove_directory(&self, dir: &str, _repo: &Path) -> Result<()> {
            self.record(format!("remove-dir {}", dir));
            Ok(())
        }

        fn add_remote(&self, name: &str, _url: &str, _repo: &Path) -> Result<()> {
            self.record(format!("remote-add {}", name));
            Ok(())
        }

        fn fetch_remote(&self, name: &str, _repo: &Path) -> Result<()> {
            self.record(format!("fetch {}", name));
            Ok(())
        }

        fn remove_remote(&self, name: &str, _repo: &Path) -> Result<()> {
            self.record(format!("remote-rm {}", name));
            Ok(())
        }

        fn merge_unrelated(&self, source: &str, _message: &str, _repo: &Path) -> Result<()> {
            self.record(format!("merge {}", source));
            Ok(())
        }

        fn import_tags(&self, name: &str, _repo: &Path) -> Result<()> {
            self.record(format!("tags {}", name));
            Ok(())
        }

        fn branch_tips(&self, _repo: &Path) -> Result<Vec<(String, String)>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_execute_one_item_per_spec() {
        let ops = MockOps::new(&["master"]);
        let config = test_config();
        let specs = vec![spec("repoA.git", "alpha"), spec("repoB.git", "beta")];

        let mut items = execute(specs, &ops, &config).unwrap();
        items.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "alpha");
        assert_eq!(items[0].remote_path, PathBuf::from("/work/alpha"));
        assert_eq!(items[0].branches, vec!["master".to_string()]);
        assert_eq!(items[1].name, "beta");
    }

    #[test]
    fn test_execute_rewrites_every_branch_with_folder_prefix() {
        let ops = MockOps::new(&["master", "feature-x"]);
        let config = test_config();

        let items = execute(vec![spec("repoA.git", "alpha")], &ops, &config).unwrap();
        assert_eq!(
            items[0].branches,
            vec!["master".to_string(), "feature-x".to_string()]
        );

        let calls = ops.calls();
        assert!(calls.contains(&"checkout master /work/alpha".to_string()));
        assert!(calls.contains(&"move alpha /work/alpha".to_string()));
        assert!(calls.contains(&"checkout feature-x /work/alpha".to_string()));
        // clone happens before any checkout
        assert!(calls[0].starts_with("clone repoA.git"));
    }

    #[test]
    fn test_execute_drains_a_lazy_manifest_reader() {
        use crate::manifest::WorkSpecs;
        use std::io::Cursor;

        let ops = MockOps::new(&["master"]);
        let config = test_config();
        let specs = WorkSpecs::from_reader(Cursor::new("repoA.git alpha\nrepoB.git beta\n"));

        let mut items = execute(specs, &ops, &config).unwrap();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "alpha");
        assert_eq!(items[1].name, "beta");
    }

    #[test]
    fn test_execute_empty_manifest_yields_no_items() {
        let ops = MockOps::new(&["master"]);
        let config = test_config();
        let items = execute(Vec::new(), &ops, &config).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_execute_worker_failure_reports_single_error() {
        let ops = MockOps::failing_on(&["master"], &["repoB.git"]);
        let config = test_config();
        let specs = vec![
            spec("repoA.git", "alpha"),
            spec("repoB.git", "beta"),
            spec("repoC.git", "gamma"),
            spec("repoD.git", "delta"),
        ];

        let err = execute(specs, &ops, &config).unwrap_err();
        assert!(matches!(err, Error::Clone { ref url, .. } if url == "repoB.git"));
    }

    #[test]
    fn test_execute_two_failures_surface_only_one() {
        let ops = MockOps::failing_on(&["master"], &["repoA.git", "repoB.git"]);
        let config = test_config();
        let specs = vec![spec("repoA.git", "alpha"), spec("repoB.git", "beta")];

        let err = execute(specs, &ops, &config).unwrap_err();
        assert!(
            matches!(err, Error::Clone { ref url, .. } if url == "repoA.git" || url == "repoB.git")
        );
    }

    #[test]
    fn test_execute_malformed_manifest_line_aborts() {
        let ops = MockOps::new(&["master"]);
        let config = test_config();
        let specs = vec![
            spec("repoA.git", "alpha"),
            Err(Error::Manifest {
                lineno: 2,
                line: "only-one-field".to_string(),
            }),
        ];

        let err = execute(specs, &ops, &config).unwrap_err();
        assert!(matches!(err, Error::Manifest { lineno: 2, .. }));
    }

    #[test]
    fn test_execute_cancellation_stops_pulling_later_specs() {
        // Every clone fails; with many specs queued, cancellation must keep
        // the run from processing all of them. Drained-but-skipped specs
        // never reach the clone step.
        let urls: Vec<String> = (0..32).map(|i| format!("repo{}.git", i)).collect();
        let url_refs: Vec<&str> = urls.iter().map(|u| u.as_str()).collect();
        let ops = MockOps::failing_on(&["master"], &url_refs);
        let config = test_config();
        let specs: Vec<Result<WorkSpec>> = urls
            .iter()
            .enumerate()
            .map(|(i, url)| spec(url, &format!("r{}", i)))
            .collect();

        let err = execute(specs, &ops, &config).unwrap_err();
        assert!(matches!(err, Error::Clone { .. }));

        let clone_calls = ops
            .calls()
            .iter()
            .filter(|c| c.starts_with("clone"))
            .count();
        assert!(clone_calls < 32, "cancellation did not stop the pipeline");
    }
}
