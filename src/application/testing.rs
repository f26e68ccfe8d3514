//! Scripted in-memory remote session for unit tests

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::DeploymentTarget;
use crate::domain::ports::{CommandOutput, Connector, RemoteSession};
use crate::error::{HoistError, HoistResult};

use super::deploy::CancelFlag;

/// Everything a scripted session observed; shared between clones.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub commands: RefCell<Vec<String>>,
    /// (local path, remote path, local file existed at upload time)
    pub uploads: RefCell<Vec<(PathBuf, String, bool)>>,
    pub close_calls: Cell<usize>,
}

impl SessionLog {
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.contains(needle))
    }

    pub fn position(&self, needle: &str) -> Option<usize> {
        self.commands.borrow().iter().position(|c| c.contains(needle))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedSession {
    responses: Vec<(String, CommandOutput)>,
    lost_on: Vec<String>,
    cancel_on: Vec<(String, CancelFlag)>,
    fail_uploads_to: Option<String>,
    cancel_on_upload: Option<CancelFlag>,
    closed: bool,
    pub log: Rc<SessionLog>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands containing `needle` answer with this output. First match wins;
    /// anything unmatched exits 0 silently.
    pub fn respond(mut self, needle: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.responses.push((
            needle.to_string(),
            CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        ));
        self
    }

    pub fn lose_channel_on(mut self, needle: &str) -> Self {
        self.lost_on.push(needle.to_string());
        self
    }

    pub fn cancel_on(mut self, needle: &str, flag: &CancelFlag) -> Self {
        self.cancel_on.push((needle.to_string(), flag.clone()));
        self
    }

    pub fn fail_uploads_to(mut self, remote_suffix: &str) -> Self {
        self.fail_uploads_to = Some(remote_suffix.to_string());
        self
    }

    /// Raise `flag` as soon as any upload starts.
    pub fn cancel_on_upload(mut self, flag: &CancelFlag) -> Self {
        self.cancel_on_upload = Some(flag.clone());
        self
    }
}

impl RemoteSession for ScriptedSession {
    fn run(&mut self, command: &str) -> HoistResult<CommandOutput> {
        assert!(!self.closed, "command after close: {command}");
        self.log.commands.borrow_mut().push(command.to_string());

        for (needle, flag) in &self.cancel_on {
            if command.contains(needle.as_str()) {
                flag.cancel();
            }
        }
        if self.lost_on.iter().any(|n| command.contains(n.as_str())) {
            return Err(HoistError::Channel {
                detail: "connection reset by peer".to_string(),
            });
        }

        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| command.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    fn upload(&mut self, local_path: &Path, remote_path: &str) -> HoistResult<()> {
        assert!(!self.closed, "upload after close");
        self.log.uploads.borrow_mut().push((
            local_path.to_path_buf(),
            remote_path.to_string(),
            local_path.is_file(),
        ));
        if let Some(flag) = &self.cancel_on_upload {
            flag.cancel();
        }
        match &self.fail_uploads_to {
            Some(suffix) if remote_path.ends_with(suffix.as_str()) => Err(HoistError::Upload {
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
                detail: "disk quota exceeded".to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn close(&mut self) {
        self.log.close_calls.set(self.log.close_calls.get() + 1);
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// How a [`ScriptedConnector`] refuses to connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefuseWith {
    Authentication,
    Connection,
}

/// Hands out clones of one scripted session, or refuses.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    pub session: ScriptedSession,
    pub refuse: Option<RefuseWith>,
    pub cancel_on_connect: Option<CancelFlag>,
    pub connects: Rc<Cell<usize>>,
}

impl ScriptedConnector {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub fn refusing(refuse: RefuseWith) -> Self {
        Self {
            refuse: Some(refuse),
            ..Self::default()
        }
    }

    /// Raise `flag` while connecting, as a Ctrl+C during the handshake would.
    pub fn cancelling(mut self, flag: &CancelFlag) -> Self {
        self.cancel_on_connect = Some(flag.clone());
        self
    }

    pub fn log(&self) -> Rc<SessionLog> {
        Rc::clone(&self.session.log)
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, target: &DeploymentTarget) -> HoistResult<ScriptedSession> {
        self.connects.set(self.connects.get() + 1);
        if let Some(flag) = &self.cancel_on_connect {
            flag.cancel();
        }
        match self.refuse {
            Some(RefuseWith::Authentication) => Err(HoistError::Authentication {
                host: target.host.clone(),
                detail: "Permission denied (publickey,password).".to_string(),
            }),
            Some(RefuseWith::Connection) => Err(HoistError::Connection {
                host: target.host.clone(),
                detail: "Connection timed out".to_string(),
            }),
            None => Ok(self.session.clone()),
        }
    }
}
