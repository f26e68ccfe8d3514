use hoist::HoistError;

use crate::ui::blocks::error::ErrorBlock;

/// Render a command error, with a suggested fix when the cause is known.
pub fn format_error(err: &anyhow::Error, supports_color: bool, supports_unicode: bool) -> String {
    let mut block = ErrorBlock::new("ERROR", err.to_string());
    for cause in err.chain().skip(1) {
        block = block.with_cause(cause.to_string());
    }
    if let Some(hoist) = err.downcast_ref::<HoistError>() {
        block = with_fix_for(block, hoist);
    }
    block.render(supports_color, supports_unicode)
}

/// Full `{:?}` report (with backtrace when captured) for failures hoist
/// did not anticipate; `None` when a `HoistError` is anywhere in the chain.
pub fn unexpected_diagnostic(err: &anyhow::Error) -> Option<String> {
    let anticipated = err
        .chain()
        .any(|cause| cause.downcast_ref::<HoistError>().is_some());
    (!anticipated).then(|| format!("{:?}", err))
}

fn with_fix_for(block: ErrorBlock, err: &HoistError) -> ErrorBlock {
    match err {
        HoistError::ConfigNotFound { .. } => block
            .with_fix("Create hoist.toml in the project directory or pass --config <PATH>"),
        HoistError::ConfigParse { .. } => block.with_fix("Fix the TOML syntax and try again"),
        HoistError::InvalidConfig { field, .. } => {
            block.with_fix(format!("Correct '{}' in the config file", field))
        }
        HoistError::MissingSecret { var } => {
            block.with_fix(format!("Export {} before running hoist", var))
        }
        HoistError::Authentication { .. } => block.with_fix(
            "Check target.user and the [target.auth] settings; try `ssh` by hand first",
        ),
        HoistError::Connection { .. } => {
            block.with_fix("Check target.host, target.port and your network connection")
        }
        _ => block,
    }
}
