//! Runs commands against a [`ConnectionTarget`], holding at most one live
//! session per key for the lifetime of the executor.

use crate::session::{Connector, ExecResult, LocalSession, Session, SshConnector};
use crate::target::{ConnectionTarget, RemoteTarget};
use ldev_core::error::Result;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Per-call execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Stream output to the executor's writer as it arrives.
    pub print: bool,
    /// Applied when the call opens a new remote session. An existing session
    /// keeps the timeout it was opened with.
    pub timeout: Duration,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            print: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ExecOptions {
    pub fn printed(mut self, print: bool) -> Self {
        self.print = print;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Identifies a cached remote session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// The docker host itself.
    Outer,
    /// The web container of the named environment.
    Web(String),
}

pub struct CommandExecutor<C = SshConnector> {
    connector: C,
    local: LocalSession,
    sessions: HashMap<SessionKey, Box<dyn Session>>,
    out: Box<dyn Write>,
}

impl CommandExecutor<SshConnector> {
    pub fn new() -> Self {
        Self::with_connector(SshConnector)
    }
}

impl Default for CommandExecutor<SshConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> CommandExecutor<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            local: LocalSession,
            sessions: HashMap::new(),
            out: Box::new(io::stdout()),
        }
    }

    /// Send printed output somewhere other than stdout.
    pub fn with_output(mut self, out: Box<dyn Write>) -> Self {
        self.out = out;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn is_connected(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Run `command` on the docker host.
    ///
    /// With `command` set to `None` nothing runs: a remote session is opened
    /// (if not already open) and `Ok(None)` is returned.
    pub fn exec(
        &mut self,
        target: &ConnectionTarget,
        command: Option<&str>,
        opts: &ExecOptions,
    ) -> Result<Option<ExecResult>> {
        self.exec_keyed(SessionKey::Outer, target, command, opts)
    }

    pub fn exec_keyed(
        &mut self,
        key: SessionKey,
        target: &ConnectionTarget,
        command: Option<&str>,
        opts: &ExecOptions,
    ) -> Result<Option<ExecResult>> {
        match command {
            Some(command) => self.run_keyed(key, target, command, opts).map(Some),
            None => {
                if let ConnectionTarget::Remote(remote) = target {
                    Self::session_entry(
                        &mut self.sessions,
                        &self.connector,
                        key,
                        remote,
                        opts.timeout,
                    )?;
                }
                Ok(None)
            }
        }
    }

    /// Run `command` on the docker host and return its result.
    pub fn run(
        &mut self,
        target: &ConnectionTarget,
        command: &str,
        opts: &ExecOptions,
    ) -> Result<ExecResult> {
        self.run_keyed(SessionKey::Outer, target, command, opts)
    }

    pub fn run_keyed(
        &mut self,
        key: SessionKey,
        target: &ConnectionTarget,
        command: &str,
        opts: &ExecOptions,
    ) -> Result<ExecResult> {
        let session: &mut dyn Session = match target {
            ConnectionTarget::Local => &mut self.local,
            ConnectionTarget::Remote(remote) => Self::session_entry(
                &mut self.sessions,
                &self.connector,
                key,
                remote,
                opts.timeout,
            )?
            .as_mut(),
        };

        debug!(command, print = opts.print, "executing");
        let sink: Option<&mut dyn Write> = if opts.print {
            Some(self.out.as_mut())
        } else {
            None
        };
        session.execute(command, sink)
    }

    pub fn read_file(
        &mut self,
        key: SessionKey,
        target: &ConnectionTarget,
        path: &str,
        opts: &ExecOptions,
    ) -> Result<String> {
        self.session_for(key, target, opts)?.read_file(path)
    }

    pub fn write_file(
        &mut self,
        key: SessionKey,
        target: &ConnectionTarget,
        path: &str,
        contents: &str,
        opts: &ExecOptions,
    ) -> Result<()> {
        self.session_for(key, target, opts)?.write_file(path, contents)
    }

    fn session_for(
        &mut self,
        key: SessionKey,
        target: &ConnectionTarget,
        opts: &ExecOptions,
    ) -> Result<&mut dyn Session> {
        let session: &mut dyn Session = match target {
            ConnectionTarget::Local => &mut self.local,
            ConnectionTarget::Remote(remote) => Self::session_entry(
                &mut self.sessions,
                &self.connector,
                key,
                remote,
                opts.timeout,
            )?
            .as_mut(),
        };
        Ok(session)
    }

    fn session_entry<'a>(
        sessions: &'a mut HashMap<SessionKey, Box<dyn Session>>,
        connector: &C,
        key: SessionKey,
        remote: &RemoteTarget,
        timeout: Duration,
    ) -> Result<&'a mut Box<dyn Session>> {
        match sessions.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                info!(target = %remote.address(), key = ?entry.key(), "opening session");
                let session = connector.connect(remote, timeout)?;
                Ok(entry.insert(session))
            }
        }
    }
}
