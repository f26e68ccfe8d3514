//! CLI Argument Parsing
//!
//! Global flags (--config, --color, --verbose) are inherited by all subcommands.
//! Running `hoist` without a subcommand deploys.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Hoist - package a web app, ship it over SSH and run it under systemd + nginx
#[derive(Parser, Debug)]
#[command(name = "hoist")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'hoist' without a subcommand to deploy.")]
pub struct Cli {
    /// Path to the deployment config
    #[arg(short, long, global = true, default_value = hoist::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Package, upload and provision the application (default)
    Deploy,

    /// Show the tail of the service's journal
    Logs {
        /// Number of journal lines (defaults to logs.lines in the config)
        #[arg(short = 'n', long)]
        lines: Option<usize>,
    },
}

impl Cli {
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Deploy)
    }
}
