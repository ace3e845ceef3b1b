//! # rm-dir
//!
//! Removes directories from a git repository's history, across every local
//! branch, pruning commits left empty. Operates on the repository in the
//! current working directory, in place.
//!
//! Exit codes: 0 on success, 1 on missing/invalid input or any subprocess
//! failure.

use std::env;
use std::process;

use anyhow::Result;
use clap::Parser;

use monorepo_tools::history;
use monorepo_tools::repository::DefaultGitOperations;

#[derive(Parser, Debug)]
#[command(name = "rm-dir")]
#[command(version, about = "Remove directories from a repository's history", long_about = None)]
struct Cli {
    /// Comma separated list of directories to remove
    #[arg(long, value_name = "DIRS", default_value = "")]
    dirs: String,
}

fn main() {
    let cli = Cli::parse();

    env_logger::init();

    // Validated by hand rather than clap `required` so missing input exits 1
    let dirs: Vec<String> = cli
        .dirs
        .split(',')
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();

    if dirs.is_empty() {
        eprintln!("at least 1 directory is required");
        process::exit(1);
    }

    if let Err(e) = run(&dirs) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(dirs: &[String]) -> Result<()> {
    let wd = env::current_dir()?;
    let ops = DefaultGitOperations;
    history::remove_dirs(&ops, dirs, &wd)?;
    Ok(())
}
