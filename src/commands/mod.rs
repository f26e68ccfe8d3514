//! Command handlers: load the config, wire adapters to use cases, render.

mod deploy;
mod logs;

use std::path::Path;

use anyhow::Result;
use hoist::{load_target, CancelFlag, ConfigWarning, DeploymentTarget};

use crate::cli::{Cli, Commands};
use crate::ui::blocks::warning::WarningBlock;
use crate::ui::context::UiContext;

pub use deploy::cmd_deploy;
pub use logs::cmd_logs;

/// Run the selected command and return the process exit code.
pub fn run(cli: &Cli, ui: &UiContext, cancel: &CancelFlag) -> Result<i32> {
    match cli.command() {
        Commands::Deploy => cmd_deploy(&cli.config, ui, cancel),
        Commands::Logs { lines } => cmd_logs(&cli.config, *lines, ui),
    }
}

fn load_config(path: &Path, ui: &UiContext) -> Result<DeploymentTarget> {
    let (target, warnings) = load_target(path)?;
    print_config_warnings(path, &warnings, ui);
    tracing::debug!(
        host = %target.host,
        service = %target.service_name,
        credential = target.credential.label(),
        "loaded {}",
        path.display()
    );
    Ok(target)
}

fn print_config_warnings(path: &Path, warnings: &[ConfigWarning], ui: &UiContext) {
    let mut block = WarningBlock::new(format!("Config warnings ({})", path.display()));
    for w in warnings {
        match w.line {
            Some(line) => block.add_line(format!("Unknown key '{}' on line {}", w.key, line)),
            None => block.add_line(format!("Unknown key '{}'", w.key)),
        }
        if let Some(suggestion) = &w.suggestion {
            block.add_line(format!("  Did you mean '{}'?", suggestion));
        }
    }
    if !block.is_empty() {
        eprint!("{}", block.render(ui.color, ui.unicode));
    }
}
