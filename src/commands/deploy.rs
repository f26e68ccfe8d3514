use std::path::Path;

use anyhow::Result;
use hoist::{CancelFlag, DeployPipeline, OpenSshConnector};

use crate::ui::context::UiContext;
use crate::ui::views::deploy::ConsoleEventSink;

/// Deploy command entry point
pub fn cmd_deploy(config_path: &Path, ui: &UiContext, cancel: &CancelFlag) -> Result<i32> {
    let target = super::load_config(config_path, ui)?;

    let sink = ConsoleEventSink::stdout(*ui);
    let pipeline = DeployPipeline::new(&target, &sink, cancel.clone());
    let report = pipeline.execute(&OpenSshConnector::new());

    for (stage, status) in report.stages() {
        tracing::debug!(stage = stage.number(), ?status, "{}", stage.title());
    }
    Ok(report.exit_code())
}
