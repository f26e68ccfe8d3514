//! Deployment Pipeline
//!
//! Drives one target through the twelve stages of [`StageId::ALL`] in order.
//! Fatal stages stop the run; advisory ones are reported and skipped past.
//! Whatever happens, the session is closed and the local archive removed
//! before [`DeployPipeline::execute`] returns.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::application::artifact::ArchiveArtifact;
use crate::application::probe::{
    classify_port_probe, classify_service_status, listening_probe_command, port_probe_command,
    service_status_command,
};
use crate::application::step::{run_step, Step, StepResult};
use crate::application::templates::{
    certificate_command, enable_site_command, write_site_command, write_unit_command,
};
use crate::config::DeploymentTarget;
use crate::domain::ports::{Connector, DeployEvent, DeployEventSink, NoticeLevel, RemoteSession};
use crate::domain::value_objects::{
    DeploySummary, PortStatus, ServiceState, StageId, StagePolicy, StageStatus,
};
use crate::error::HoistResult;
use crate::infrastructure::{ArchiveBuilder, ArchiveStats};

use super::cancel::CancelFlag;
use super::result::{DeployOutcome, DeployReport};

/// Granularity of the interruptible settle wait
const CANCEL_POLL: Duration = Duration::from_millis(100);

/// Why the stage sequence stopped early
#[derive(Debug)]
enum Stop {
    Abort { stage: StageId, reason: String },
    Cancelled,
}

/// Runs a full deployment against one target.
pub struct DeployPipeline<'a> {
    target: &'a DeploymentTarget,
    sink: &'a dyn DeployEventSink,
    cancel: CancelFlag,
}

impl<'a> DeployPipeline<'a> {
    pub fn new(
        target: &'a DeploymentTarget,
        sink: &'a dyn DeployEventSink,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            target,
            sink,
            cancel,
        }
    }

    /// Execute every stage. Never panics on remote failure and never leaves
    /// the session open or the archive on disk.
    pub fn execute<C: Connector>(&self, connector: &C) -> DeployReport {
        self.sink.on_event(DeployEvent::Started {
            host: self.target.host.clone(),
            domain: self.target.domain.clone(),
            app_port: self.target.app_port,
            remote_root: self.target.remote_root.clone(),
        });

        let mut artifact = ArchiveArtifact::claim(self.target.archive_path());
        let mut slot: Option<C::Session> = None;
        let mut run = Run {
            target: self.target,
            sink: self.sink,
            cancel: &self.cancel,
            stages: [StageStatus::NotRun; StageId::ALL.len()],
            archive: None,
            certificate_issued: false,
        };

        let outcome = match run.drive(connector, &artifact, &mut slot) {
            Ok(summary) => DeployOutcome::Completed(summary),
            Err(Stop::Abort { stage, reason }) => DeployOutcome::Aborted { stage, reason },
            Err(Stop::Cancelled) => DeployOutcome::Cancelled,
        };

        match &outcome {
            DeployOutcome::Completed(summary) => {
                tracing::info!(degraded = summary.degraded.len(), "deployment completed");
                self.sink.on_event(DeployEvent::Completed {
                    summary: summary.clone(),
                });
            }
            DeployOutcome::Aborted { stage, reason } => {
                tracing::warn!(stage = %stage, reason = %reason, "deployment aborted");
                self.sink.on_event(DeployEvent::Aborted {
                    stage: *stage,
                    reason: reason.clone(),
                });
            }
            DeployOutcome::Cancelled => {
                tracing::warn!("deployment cancelled");
                self.sink.on_event(DeployEvent::Cancelled);
            }
        }

        if let Some(mut session) = slot.take() {
            session.close();
            self.sink.on_event(DeployEvent::SessionClosed);
        }
        if artifact.release() {
            self.sink.on_event(DeployEvent::ArchiveRemoved {
                path: artifact.path().to_path_buf(),
            });
        }

        DeployReport::new(run.stages, outcome, run.archive)
    }
}

/// Mutable state of one `execute` call
struct Run<'p> {
    target: &'p DeploymentTarget,
    sink: &'p dyn DeployEventSink,
    cancel: &'p CancelFlag,
    stages: [StageStatus; StageId::ALL.len()],
    archive: Option<ArchiveStats>,
    certificate_issued: bool,
}

impl Run<'_> {
    fn drive<C: Connector>(
        &mut self,
        connector: &C,
        artifact: &ArchiveArtifact,
        slot: &mut Option<C::Session>,
    ) -> Result<DeploySummary, Stop> {
        self.build_archive(artifact.path())?;
        let session = self.connect(connector, slot)?;
        self.pre_checks(session)?;
        self.prepare_directory(session)?;
        self.upload(session, artifact.path())?;
        self.extract(session)?;
        self.install_dependencies(session)?;
        self.build(session)?;
        self.configure_service(session)?;
        self.configure_proxy(session)?;
        self.certificate(session)?;
        self.verify(session)
    }

    // -- bookkeeping --------------------------------------------------------

    fn enter(&mut self, stage: StageId) -> Result<(), Stop> {
        if self.cancel.is_cancelled() {
            return Err(Stop::Cancelled);
        }
        tracing::info!(stage = stage.number(), title = stage.title(), "stage started");
        self.sink.on_event(DeployEvent::StageStarted { stage });
        Ok(())
    }

    fn finish(&mut self, stage: StageId, status: StageStatus) {
        self.stages[stage.number() - 1] = status;
        if status == StageStatus::Failed && stage.policy() == StagePolicy::Advisory {
            tracing::warn!(stage = %stage, "advisory stage failed, continuing");
        }
        self.sink.on_event(DeployEvent::StageFinished { stage, status });
    }

    /// End the run at `stage`. A failure that follows an interruption is the
    /// interruption: SIGINT takes the foreground `ssh`/`scp` child down with it.
    fn abort(&mut self, stage: StageId, reason: impl Into<String>) -> Stop {
        self.finish(stage, StageStatus::Failed);
        if self.cancel.is_cancelled() {
            return Stop::Cancelled;
        }
        Stop::Abort {
            stage,
            reason: reason.into(),
        }
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.sink.on_event(DeployEvent::Notice {
            level,
            message: message.into(),
        });
    }

    /// Run a step; a broken channel or an interruption ends the run.
    fn step<S: RemoteSession>(
        &mut self,
        session: &mut S,
        stage: StageId,
        step: Step,
    ) -> Result<StepResult, Stop> {
        let result = run_step(session, self.sink, &step);
        if result.channel_failure || (!result.succeeded && self.cancel.is_cancelled()) {
            return Err(self.abort(stage, result.failure_detail()));
        }
        Ok(result)
    }

    /// Upload with the same before/after events as a step.
    fn transfer<S: RemoteSession>(
        &self,
        session: &mut S,
        local: &Path,
        remote: &str,
        description: String,
    ) -> HoistResult<()> {
        self.sink.on_event(DeployEvent::StepStarted {
            description: description.clone(),
        });
        match session.upload(local, remote) {
            Ok(()) => {
                self.sink.on_event(DeployEvent::StepSucceeded {
                    description,
                    output: None,
                });
                Ok(())
            }
            Err(e) => {
                self.sink.on_event(DeployEvent::StepFailed {
                    description,
                    detail: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn wait_unless_cancelled(&self, delay: Duration) -> Result<(), Stop> {
        let deadline = Instant::now() + delay;
        loop {
            if self.cancel.is_cancelled() {
                return Err(Stop::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }

    fn in_root(&self, command: &str) -> String {
        format!("cd {} && {}", self.target.remote_root, command)
    }

    // -- stages -------------------------------------------------------------

    fn build_archive(&mut self, output: &Path) -> Result<(), Stop> {
        let stage = StageId::BuildArchive;
        self.enter(stage)?;

        let stats = ArchiveBuilder::for_target(self.target)
            .build(output)
            .map_err(|e| self.abort(stage, e.to_string()))?;
        self.sink.on_event(DeployEvent::ArchiveBuilt {
            path: stats.path.clone(),
            file_count: stats.file_count,
            archive_bytes: stats.archive_bytes,
        });
        self.archive = Some(stats);
        self.finish(stage, StageStatus::Succeeded);
        Ok(())
    }

    fn connect<'s, C: Connector>(
        &mut self,
        connector: &C,
        slot: &'s mut Option<C::Session>,
    ) -> Result<&'s mut C::Session, Stop> {
        let stage = StageId::Connect;
        self.enter(stage)?;

        let t = self.target;
        self.notice(
            NoticeLevel::Info,
            format!(
                "Connecting to {}:{} as {} ({})",
                t.host,
                t.port,
                t.user,
                t.credential.label()
            ),
        );
        let session = connector
            .connect(t)
            .map_err(|e| self.abort(stage, e.to_string()))?;
        self.notice(NoticeLevel::Success, "Connection established");
        self.finish(stage, StageStatus::Succeeded);
        Ok(slot.insert(session))
    }

    fn pre_checks<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::PreChecks;
        self.enter(stage)?;
        let t = self.target;

        let port = self.step(
            session,
            stage,
            Step::new(
                port_probe_command(t.app_port),
                format!("Checking if port {} is available", t.app_port),
            ),
        )?;
        match classify_port_probe(&port.stdout, t.app_port) {
            PortStatus::Available => {}
            PortStatus::InUse => {
                self.notice(
                    NoticeLevel::Warning,
                    format!("Port {} is already in use", t.app_port),
                );
                self.notice(
                    NoticeLevel::Info,
                    format!("This is fine if it is the existing {} service", t.service_name),
                );
            }
            PortStatus::Unknown => self.notice(
                NoticeLevel::Warning,
                format!("Could not tell whether port {} is free", t.app_port),
            ),
        }

        let status = self.step(
            session,
            stage,
            Step::new(
                service_status_command(&t.service_name),
                format!("Checking {} service status", t.service_name),
            ),
        )?;
        let message = match classify_service_status(&status.stdout) {
            ServiceState::Active => format!(
                "Found existing {} service (active), will update it",
                t.service_name
            ),
            ServiceState::Inactive => format!(
                "Found existing {} service (inactive), will restart it",
                t.service_name
            ),
            ServiceState::Unknown => format!(
                "No existing {} service found, will create a new one",
                t.service_name
            ),
        };
        self.notice(NoticeLevel::Info, message);

        let ok = port.succeeded && status.succeeded;
        self.finish(stage, status_of(ok));
        Ok(())
    }

    fn prepare_directory<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::PrepareDirectory;
        self.enter(stage)?;
        let result = self.step(
            session,
            stage,
            Step::new(
                format!("mkdir -p {}", self.target.remote_root),
                "Create remote directory",
            ),
        )?;
        self.finish(stage, status_of(result.succeeded));
        Ok(())
    }

    fn upload<S: RemoteSession>(&mut self, session: &mut S, archive: &Path) -> Result<(), Stop> {
        let stage = StageId::Upload;
        self.enter(stage)?;
        let t = self.target;

        self.transfer(
            session,
            archive,
            &t.remote_archive_path(),
            format!("Upload {} to {}", t.archive_name, t.remote_root),
        )
        .map_err(|e| self.abort(stage, e.to_string()))?;

        if let (Some(local), Some(remote)) = (t.local_env_file(), t.remote_env_file()) {
            let name = t.env_file.as_deref().unwrap_or_default();
            if local.is_file() {
                self.transfer(session, &local, &remote, format!("Upload {}", name))
                    .map_err(|e| self.abort(stage, e.to_string()))?;
            } else {
                self.notice(
                    NoticeLevel::Info,
                    format!("No {} found locally, skipping", name),
                );
            }
        }

        self.notice(NoticeLevel::Success, "All files uploaded");
        self.finish(stage, StageStatus::Succeeded);
        Ok(())
    }

    fn extract<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::Extract;
        self.enter(stage)?;
        let name = &self.target.archive_name;
        let command = self.in_root(&format!("unzip -o {name} && rm {name}"));
        let result = self.step(session, stage, Step::new(command, "Extract project files"))?;
        self.finish(stage, status_of(result.succeeded));
        Ok(())
    }

    fn install_dependencies<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::InstallDependencies;
        self.enter(stage)?;
        let command = self.in_root(&self.target.install_command);
        let result = self.step(session, stage, Step::new(command, "Install dependencies"))?;
        if !result.succeeded {
            self.notice(
                NoticeLevel::Warning,
                "Dependency installation failed, continuing",
            );
        }
        self.finish(stage, status_of(result.succeeded));
        Ok(())
    }

    fn build<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::Build;
        self.enter(stage)?;
        let command = self.in_root(&self.target.build_command);
        let result = self.step(session, stage, Step::new(command, "Build application"))?;
        if !result.succeeded {
            return Err(self.abort(stage, "build failed"));
        }
        self.finish(stage, StageStatus::Succeeded);
        Ok(())
    }

    fn configure_service<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::ConfigureService;
        self.enter(stage)?;
        let t = self.target;
        let svc = &t.service_name;

        let steps = [
            Step::new(
                write_unit_command(t),
                format!("Create systemd service at {}", t.unit_path()),
            ),
            Step::new("systemctl daemon-reload", "Reload systemd daemon"),
            Step::new(format!("systemctl enable {svc}"), "Enable service to start on boot"),
            Step::new(format!("systemctl restart {svc}"), "Restart service"),
        ];
        let mut ok = true;
        for step in steps {
            ok &= self.step(session, stage, step)?.succeeded;
        }

        if !t.settle_delay.is_zero() {
            self.notice(
                NoticeLevel::Info,
                format!(
                    "Waiting {}s for the service to start",
                    t.settle_delay.as_secs()
                ),
            );
            self.wait_unless_cancelled(t.settle_delay)?;
        }

        let status = self.step(
            session,
            stage,
            Step::new(
                format!("systemctl status {svc} --no-pager -l"),
                "Verify service status",
            )
            .with_output(),
        )?;
        ok &= status.succeeded;

        self.finish(stage, status_of(ok));
        Ok(())
    }

    fn configure_proxy<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::ConfigureProxy;
        self.enter(stage)?;
        let t = self.target;

        let mut ok = self
            .step(
                session,
                stage,
                Step::new(
                    write_site_command(t),
                    format!("Create nginx site at {}", t.site_available_path()),
                ),
            )?
            .succeeded;
        ok &= self
            .step(session, stage, Step::new(enable_site_command(t), "Enable nginx site"))?
            .succeeded;

        let test = self.step(session, stage, Step::new("nginx -t", "Test nginx configuration"))?;
        if test.succeeded {
            ok &= self
                .step(session, stage, Step::new("systemctl reload nginx", "Reload nginx"))?
                .succeeded;
        } else {
            ok = false;
            self.notice(
                NoticeLevel::Warning,
                "nginx configuration test failed, not reloading. Check the configuration manually.",
            );
        }

        self.finish(stage, status_of(ok));
        Ok(())
    }

    fn certificate<S: RemoteSession>(&mut self, session: &mut S) -> Result<(), Stop> {
        let stage = StageId::Certificate;
        self.enter(stage)?;
        let t = self.target;

        self.notice(
            NoticeLevel::Info,
            format!("Setting up TLS for {} using certbot", t.domain),
        );
        let present = self.step(
            session,
            stage,
            Step::new("which certbot", "Check if certbot is installed"),
        )?;
        if !present.succeeded {
            self.notice(NoticeLevel::Warning, "certbot not installed, skipping TLS setup");
            self.notice(NoticeLevel::Info, "Site will be reachable over HTTP only");
            self.finish(stage, StageStatus::Skipped);
            return Ok(());
        }

        let issued = self.step(
            session,
            stage,
            Step::new(certificate_command(t), "Configure TLS certificate"),
        )?;
        if issued.succeeded {
            self.certificate_issued = true;
            self.notice(NoticeLevel::Success, "TLS certificate configured");
        } else {
            self.notice(
                NoticeLevel::Warning,
                "TLS setup failed, site remains reachable over HTTP",
            );
        }
        self.finish(stage, status_of(issued.succeeded));
        Ok(())
    }

    fn verify<S: RemoteSession>(&mut self, session: &mut S) -> Result<DeploySummary, Stop> {
        let stage = StageId::Verify;
        self.enter(stage)?;
        let t = self.target;

        let status = self.step(
            session,
            stage,
            Step::new(
                service_status_command(&t.service_name),
                format!("Checking {} service status", t.service_name),
            ),
        )?;
        let service_state = classify_service_status(&status.stdout);
        self.notice(NoticeLevel::Info, format!("Service status: {}", service_state));

        let listening = self.step(
            session,
            stage,
            Step::new(
                listening_probe_command(t.app_port),
                format!("Verify port {} is listening", t.app_port),
            )
            .with_output(),
        )?;
        let port_status = match classify_port_probe(&listening.stdout, t.app_port) {
            PortStatus::InUse => PortStatus::InUse,
            // grep found nothing under either tool
            _ if listening.exit_code == 1 => PortStatus::Available,
            _ => PortStatus::Unknown,
        };

        let healthy = service_state == ServiceState::Active && port_status == PortStatus::InUse;
        self.finish(stage, status_of(healthy));

        let degraded = StageId::ALL
            .iter()
            .copied()
            .filter(|s| self.stages[s.number() - 1] == StageStatus::Failed)
            .collect();

        Ok(DeploySummary {
            host: t.host.clone(),
            app_port: t.app_port,
            domain: t.domain.clone(),
            service_name: t.service_name.clone(),
            service_state,
            port_status,
            certificate_issued: self.certificate_issued,
            degraded,
        })
    }
}

fn status_of(ok: bool) -> StageStatus {
    if ok {
        StageStatus::Succeeded
    } else {
        StageStatus::Failed
    }
}
