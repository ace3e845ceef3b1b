//! # rewrite-history
//!
//! Rewrites the repository in the current working directory in place so that
//! its files appear to have always lived under a given directory.
//!
//! Exit codes: 1 on a generic error, 126 when invoked without a subcommand,
//! 127 for an unknown subcommand.

use std::env;
use std::process;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

use monorepo_tools::history;
use monorepo_tools::repository::DefaultGitOperations;

#[derive(Parser, Debug)]
#[command(name = "rewrite-history")]
#[command(version, about = "Rewrite a repository's history in place", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite history so the repository appears to have always been under
    /// the provided directory
    Mv {
        /// Directory to move the repository's files under
        dir: String,

        /// Run the mv operation on all remote branches
        #[arg(long)]
        all: bool,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            // clap derive reports a bare invocation as help-on-missing
            ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                eprint!("{}", err);
                process::exit(126);
            }
            ErrorKind::InvalidSubcommand => {
                eprint!("{}", err);
                process::exit(127);
            }
            ErrorKind::MissingRequiredArgument => {
                eprint!("{}", err);
                process::exit(1);
            }
            // help/version exit 0
            _ => err.exit(),
        },
    };

    env_logger::init();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let wd = env::current_dir()?;
    let ops = DefaultGitOperations;

    match cli.command {
        Commands::Mv { dir, all } => history::move_into_dir(&ops, &dir, &wd, all)?,
    }

    Ok(())
}
