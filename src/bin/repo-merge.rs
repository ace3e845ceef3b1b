//! # repo-merge
//!
//! Binary entry point for the monorepo merge tool. Reads a manifest of
//! repositories (`<remote-url> <name> [local-folder]`, one per line), clones
//! and rewrites them in parallel, then merges everything into a freshly
//! created destination repository.
//!
//! Exit codes: 0 on success, 1 on any failure, 2 on CLI usage errors
//! (missing `--input`, handled by clap).

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use monorepo_tools::config::MergeConfig;
use monorepo_tools::manifest::WorkSpecs;
use monorepo_tools::output::OutputConfig;
use monorepo_tools::repository::DefaultGitOperations;
use monorepo_tools::{git, phases};

/// Merge independent git repositories into a single monorepo
#[derive(Parser, Debug)]
#[command(name = "repo-merge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the monorepo to be created
    #[arg(long, value_name = "NAME", default_value = "monorepo")]
    name: String,

    /// Manifest file containing the repositories to be merged
    #[arg(long, value_name = "PATH", required = true)]
    input: PathBuf,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&cli.log_level),
    )
    .init();

    let output = OutputConfig::from_env_and_flag(&cli.color);
    let start_time = Instant::now();

    println!(
        "{} Merging repositories from {} into {:?}",
        output.emoji("🔀", "[MERGE]"),
        cli.input.display(),
        cli.name
    );

    let working_dir = env::current_dir()?;
    let config = MergeConfig::new(cli.name, cli.input, working_dir);

    let result = run(&config);

    match result {
        Ok(item_count) => {
            println!(
                "{} Merged {} repositories into {:?} in {:.2}s",
                output.emoji("✅", "[OK]"),
                item_count,
                config.monorepo_name,
                start_time.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} Merge failed", output.emoji("❌", "[FAILED]"));
            Err(e)
        }
    }
}

fn run(config: &MergeConfig) -> Result<usize> {
    let specs = WorkSpecs::open(&config.manifest_path)?;
    let ops = DefaultGitOperations;

    // The destination is only created once every source repository has been
    // cloned and rewritten successfully.
    let items = phases::prepare::execute(specs, &ops, config)?;
    git::init_repo(&config.monorepo_name, &config.working_dir)?;
    phases::merge::execute(&ops, config, &items)?;

    Ok(items.len())
}
