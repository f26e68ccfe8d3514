use std::path::Path;

use anyhow::Result;
use hoist::application::deploy::{EXIT_FAILURE, EXIT_SUCCESS};
use hoist::{fetch_logs, OpenSshConnector};

use crate::ui::context::UiContext;
use crate::ui::views::logs::{render_logs, render_logs_header};

/// Logs command entry point
///
/// A non-zero `journalctl` exit is shown and turned into exit code 1.
pub fn cmd_logs(config_path: &Path, lines: Option<usize>, ui: &UiContext) -> Result<i32> {
    let target = super::load_config(config_path, ui)?;
    let lines = lines.unwrap_or(target.log_lines);

    print!(
        "{}",
        render_logs_header(
            &target.destination(),
            &target.service_name,
            lines,
            ui.color,
            ui.unicode
        )
    );

    let fetch = fetch_logs(&OpenSshConnector::new(), &target, lines)?;
    print!(
        "{}",
        render_logs(&target.service_name, &fetch, ui.color, ui.unicode)
    );

    Ok(if fetch.exit_code == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    })
}
