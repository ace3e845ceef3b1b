//! Phase 2: sequential merge into the destination repository.
//!
//! For each prepared item, in input order: register its clone as a remote,
//! fetch it, merge every source branch into the same-named destination
//! branch (creating an orphan branch when the destination has none), and
//! import its tags under a namespaced ref path. A second pass then walks
//! destination branches each item did not contribute and merges the item's
//! primary branch into them, so branches unique to one repository still
//! receive every other repository's content.
//!
//! Any subprocess failure aborts immediately; completed merges are not
//! rolled back. Before mutating anything the phase snapshots the
//! destination's branch tips, and on failure it reports which items were
//! fully applied versus pending so a retry can skip the completed ones.

use std::fs;

use log::{debug, error, warn};

use crate::config::MergeConfig;
use crate::diff;
use crate::error::{Error, Result};
use crate::repository::GitOperations;

use super::MergeItem;

/// The destination's primary branch, by convention.
pub const PRIMARY_BRANCH: &str = "master";

/// Executes the merge phase over all prepared items.
pub fn execute(ops: &dyn GitOperations, config: &MergeConfig, items: &[MergeItem]) -> Result<()> {
    let monorepo = config.monorepo_path();

    match ops.branch_tips(&monorepo) {
        Ok(tips) => debug!("destination branch tips before merge: {:?}", tips),
        Err(e) => debug!("could not snapshot destination branch tips: {}", e),
    }

    let mut applied: Vec<&str> = Vec::new();
    let result = merge_all(ops, config, items, &mut applied);

    if let Err(ref e) = result {
        let pending: Vec<&str> = items
            .iter()
            .map(|i| i.name.as_str())
            .filter(|n| !applied.contains(n))
            .collect();
        error!(
            "merge aborted: {}; fully applied: {:?}; pending: {:?}",
            e, applied, pending
        );
        // Leave the destination inspectable but drop the scratch state.
        cleanup(ops, config, items, true);
        return result;
    }

    cleanup(ops, config, items, false);
    ops.checkout_branch(PRIMARY_BRANCH, &monorepo)
}

fn merge_all<'a>(
    ops: &dyn GitOperations,
    config: &MergeConfig,
    items: &'a [MergeItem],
    applied: &mut Vec<&'a str>,
) -> Result<()> {
    let monorepo = config.monorepo_path();

    for item in items {
        merge_item(ops, config, item)?;
        applied.push(item.name.as_str());
    }

    // Fallback pass: destination branches an item did not contribute get the
    // item's primary branch merged in instead.
    ops.checkout_branch(PRIMARY_BRANCH, &monorepo)?;
    let dest_branches = ops.list_branches(&monorepo)?;

    for item in items {
        for branch in diff::strings(&dest_branches, &item.branches) {
            if item.branches.contains(&branch) {
                continue;
            }

            ops.checkout_branch(&branch, &monorepo)?;

            let source = format!("{}/{}", item.name, PRIMARY_BRANCH);
            let message = format!(
                "Migrating {:?} into {}/{}",
                source, config.monorepo_name, branch
            );
            println!("{}", message);
            ops.merge_unrelated(&source, &message, &monorepo)
                .map_err(|e| Error::Merge {
                    source_branch: source.clone(),
                    dest: format!("{}/{}", config.monorepo_name, branch),
                    message: e.to_string(),
                })?;
        }
    }

    Ok(())
}

/// Merge one item: remote add, fetch, per-branch merge, tag import.
fn merge_item(ops: &dyn GitOperations, config: &MergeConfig, item: &MergeItem) -> Result<()> {
    let monorepo = config.monorepo_path();

    ops.add_remote(&item.name, &item.remote_path.to_string_lossy(), &monorepo)?;
    ops.fetch_remote(&item.name, &monorepo)?;

    for branch in &item.branches {
        // A missing destination branch is created as an orphan so every
        // source branch lands somewhere.
        if ops.checkout_branch(branch, &monorepo).is_err() {
            ops.checkout_orphan(branch, &monorepo)?;
        }

        let source = format!("{}/{}", item.name, branch);
        let message = format!(
            "Migrating {}/{} into {}/{}",
            item.name, branch, config.monorepo_name, branch
        );
        println!("{}", message);
        ops.merge_unrelated(&source, &message, &monorepo)
            .map_err(|e| Error::Merge {
                source_branch: source.clone(),
                dest: format!("{}/{}", config.monorepo_name, branch),
                message: e.to_string(),
            })?;
    }

    ops.import_tags(&item.name, &monorepo)
}

/// Remove the temporary remotes and clone directories. Best-effort: on the
/// failure path problems are only logged, so the primary error survives.
fn cleanup(ops: &dyn GitOperations, config: &MergeConfig, items: &[MergeItem], quiet: bool) {
    let monorepo = config.monorepo_path();

    for item in items {
        if let Err(e) = ops.remove_remote(&item.name, &monorepo) {
            if !quiet {
                warn!("could not remove remote {:?}: {}", item.name, e);
            }
        }

        if item.remote_path.exists() {
            if let Err(e) = fs::remove_dir_all(&item.remote_path) {
                warn!(
                    "could not remove clone directory {}: {}",
                    item.remote_path.display(),
                    e
                );
            }
        }
    }
}
