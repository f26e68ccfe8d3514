//! Console rendering of a deployment run

use std::io::{self, Write};
use std::sync::Mutex;

use hoist::{DeployEvent, DeployEventSink, DeploySummary, NoticeLevel, StageId, StageStatus};

use crate::ui::blocks::error::ErrorBlock;
use crate::ui::blocks::header::CommandHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::context::UiContext;
use crate::ui::primitives::border::rule;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

const MAX_RULE_WIDTH: usize = 60;

/// Event sink that prints human-readable progress
pub struct ConsoleEventSink {
    ui: UiContext,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleEventSink {
    pub fn stdout(ui: UiContext) -> Self {
        Self::with_writer(ui, io::stdout())
    }

    pub fn with_writer<W: Write + Send + 'static>(ui: UiContext, writer: W) -> Self {
        Self {
            ui,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.write_all(text.as_bytes());
            let _ = writer.flush();
        }
    }

    fn line(&self, indent: usize, icon: Icon, text: &str) {
        self.write(&format!(
            "{}{} {}\n",
            " ".repeat(indent),
            icon.colored(self.ui.color, self.ui.unicode),
            text
        ));
    }

    fn dim(&self, indent: usize, text: &str) {
        for line in text.lines() {
            self.write(&format!(
                "{}{}\n",
                " ".repeat(indent),
                ColoredText::dim(line).render(self.ui.color)
            ));
        }
    }

    fn render(&self, event: DeployEvent) -> Option<String> {
        let (color, unicode) = (self.ui.color, self.ui.unicode);
        let text = match event {
            DeployEvent::Started {
                host,
                domain,
                app_port,
                remote_root,
            } => {
                let mut header = CommandHeader::new(Icon::Deploy, "Hoist Deploy");
                header.add("Server", host);
                header.add("Domain", domain);
                header.add("App port", app_port.to_string());
                header.add("Remote root", remote_root);
                header.render(color, unicode)
            }
            DeployEvent::ArchiveBuilt {
                path,
                file_count,
                archive_bytes,
            } => {
                self.line(
                    2,
                    Icon::Success,
                    &format!(
                        "Archive created: {} ({} files, {})",
                        path.display(),
                        file_count,
                        format_size(archive_bytes)
                    ),
                );
                return None;
            }
            DeployEvent::StageStarted { stage } => {
                let width = usize::from(self.ui.caps.width).clamp(20, MAX_RULE_WIDTH);
                render_stage_heading(stage, width, color, unicode)
            }
            DeployEvent::StageFinished { stage, status } => {
                match status {
                    StageStatus::Failed if !stage.is_fatal() => self.line(
                        2,
                        Icon::Warning,
                        &ColoredText::warning(format!("{} finished with problems", stage.title()))
                            .render(color),
                    ),
                    StageStatus::Skipped => {
                        self.line(2, Icon::Pending, &format!("{} skipped", stage.title()))
                    }
                    _ => {}
                }
                return None;
            }
            DeployEvent::StepStarted { description } => {
                self.line(2, Icon::Progress, &format!("{description}..."));
                return None;
            }
            DeployEvent::StepSucceeded {
                description,
                output,
            } => {
                self.line(2, Icon::Success, &description);
                if let Some(output) = output.filter(|o| !o.trim().is_empty()) {
                    self.dim(6, output.trim_end());
                }
                return None;
            }
            DeployEvent::StepFailed {
                description,
                detail,
            } => {
                self.line(2, Icon::Error, &ColoredText::error(description).render(color));
                for line in detail.trim_end().lines() {
                    self.line(6, Icon::Arrow, line);
                }
                return None;
            }
            DeployEvent::Notice { level, message } => {
                let icon = match level {
                    NoticeLevel::Info => Icon::Arrow,
                    NoticeLevel::Success => Icon::Success,
                    NoticeLevel::Warning => Icon::Warning,
                };
                self.line(2, icon, &message);
                return None;
            }
            DeployEvent::Aborted { stage, reason } => {
                let block = ErrorBlock::new(
                    "Deployment Failed",
                    format!("Stopped at step {}: {}", stage.number(), stage.title()),
                )
                .with_cause(reason);
                format!("\n{}", block.render(color, unicode))
            }
            DeployEvent::Cancelled => format!(
                "\n{} {}\n",
                Icon::Warning.colored(color, unicode),
                ColoredText::warning("Deployment cancelled by user")
                    .bold()
                    .render(color)
            ),
            DeployEvent::Completed { summary } => {
                format!("\n{}", render_deploy_summary(&summary, color, unicode))
            }
            DeployEvent::SessionClosed => {
                if self.ui.verbose > 0 {
                    self.dim(2, "Remote session closed");
                }
                return None;
            }
            DeployEvent::ArchiveRemoved { path } => {
                if self.ui.verbose > 0 {
                    self.dim(2, &format!("Removed local archive {}", path.display()));
                }
                return None;
            }
        };
        Some(text)
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        if let Some(text) = self.render(event) {
            self.write(&text);
        }
    }
}

fn render_stage_heading(
    stage: StageId,
    width: usize,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let title = format!(
        "STEP {}/{}: {}",
        stage.number(),
        StageId::ALL.len(),
        stage.title().to_uppercase()
    );
    format!(
        "\n{}\n{}\n",
        ColoredText::info(title).bold().render(supports_color),
        ColoredText::dim(rule(width, supports_unicode)).render(supports_color)
    )
}

pub fn render_deploy_summary(
    summary: &DeploySummary,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut block = if summary.degraded.is_empty() {
        ResultSummary::success("Deployment Complete")
    } else {
        ResultSummary::partial("Deployment Complete (with warnings)")
    };

    block.add_row("Server", summary.host.as_str());
    block.add_row("App port", summary.app_port.to_string());
    block.add_row("Domain", summary.domain.as_str());
    block.add_row("Service", summary.service_name.as_str());
    block.add_row("Status", summary.service_state.to_string());
    block.add_row("Port", summary.port_status.to_string());

    block.add_section("Access", summary.access_urls());
    block.add_section("Useful commands", summary.operator_hints());

    for stage in &summary.degraded {
        block.add_warning(format!(
            "Step {} ({}) did not complete cleanly",
            stage.number(),
            stage.title()
        ));
    }
    if !summary.certificate_issued {
        block.add_warning("No TLS certificate; the site is served over HTTP");
    }
    block.with_next_step("Run `hoist logs` to follow the service output");

    block.render(supports_color, supports_unicode)
}

fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
