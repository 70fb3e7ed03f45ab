//! filemirror CLI - mirror growing files from change notifications
//!
//! Usage: filemirror <COMMAND>
//!
//! Commands:
//!   file    Mirror files into the replica as they grow
//!   events  Print raw change notifications

mod cli;
mod commands;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, USAGE};
use commands::{cmd_events, cmd_file};
use filemirror::MirrorError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = filemirror::logging::init(cli.verbose) {
        eprintln!("filemirror: could not initialize logging: {e}");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::File {
            paths,
            replica,
            expected_size,
            config,
            no_lock,
        } => cmd_file(
            commands::FileArgs {
                paths,
                replica,
                expected_size,
                config,
                no_lock,
            },
            cli.json,
        ),
        Commands::Events { paths } => cmd_events(paths, cli.json),
    }
}

/// Usage problems exit 2 with the command list; runtime failures exit 1.
fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<MirrorError>() {
        Some(e) if e.is_config_error() => {
            eprintln!("filemirror: {e}\n\n{USAGE}");
            ExitCode::from(2)
        }
        _ => {
            tracing::error!("fatal: {err:#}");
            eprintln!("filemirror: {err:#}");
            ExitCode::FAILURE
        }
    }
}
