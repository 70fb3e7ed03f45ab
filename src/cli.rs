use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const USAGE: &str = "\
Commands:

    file   [files]  Mirror the files into the replica as they grow.
    events [paths]  Watch the paths and print every notification.
";

/// filemirror - mirror growing files from change notifications
#[derive(Parser, Debug)]
#[command(name = "filemirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output events as NDJSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mirror one or more files into the replica
    File {
        /// Files to mirror (watched through their parent directory)
        paths: Vec<PathBuf>,

        /// Replica path (overrides config and FILEMIRROR_REPLICA)
        #[arg(short, long)]
        replica: Option<PathBuf>,

        /// Total bytes after which source and replica are compared once
        #[arg(long)]
        expected_size: Option<u64>,

        /// Config file (defaults to ~/.config/filemirror/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Do not lock the replica
        #[arg(long)]
        no_lock: bool,
    },

    /// Print raw change notifications
    Events {
        /// Files or directories to watch
        paths: Vec<PathBuf>,
    },
}
