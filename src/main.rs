//! Hoist CLI - single-target deployment orchestrator
//!
//! Usage: hoist [--config PATH] [-v...] [--color WHEN] [COMMAND]
//!
//! Commands:
//!   deploy  Package, upload and provision the application (default)
//!   logs    Show the tail of the service's journal

mod cli;
mod commands;
mod ui;

use clap::Parser;
use hoist::application::deploy::EXIT_FAILURE;
use hoist::CancelFlag;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::ui::context::UiContext;

/// Env var holding a tracing filter that overrides `-v`
const LOG_ENV: &str = "HOIST_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ui = UiContext::new(cli.verbose, cli.color);

    // SIGINT also reaches the remote client in the foreground process group,
    // so the running step fails and the pipeline sees the flag right after.
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || handler_flag.cancel()).expect("Error setting Ctrl+C handler");

    let code = match commands::run(&cli, &ui, &cancel) {
        Ok(code) => code,
        Err(err) => {
            eprint!("{}", crate::ui::error::format_error(&err, ui.color, ui.unicode));
            if let Some(report) = crate::ui::error::unexpected_diagnostic(&err) {
                eprintln!("\n{}", report);
            }
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
