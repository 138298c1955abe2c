//! The capability every execution path provides.
//!
//! Downstream code talks to `dyn Session` only; whether a command runs through
//! the local shell or over ssh is decided once, when the session is created.

mod local;
mod ssh;

pub use local::LocalSession;
pub use ssh::{SshConnector, SshSession};

use crate::target::RemoteTarget;
use ldev_core::error::Result;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

/// Normalized outcome of one command, identical for local and remote runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    /// Combined stdout/stderr without the trailing newline. Empty when the
    /// output was streamed to a sink instead.
    pub output: String,
    /// The remote read deadline passed before the command finished. Always
    /// false for local commands.
    pub timed_out: bool,
    /// Exit code; -1 when unknown (killed by a signal, or timed out).
    pub exit_status: i32,
}

impl ExecResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_status == 0
    }
}

/// A live execution channel to one target.
pub trait Session {
    /// Run `command`. With a `sink`, output is written there as it arrives.
    fn execute(&mut self, command: &str, sink: Option<&mut dyn Write>) -> Result<ExecResult>;

    fn read_file(&mut self, path: &str) -> Result<String>;

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()>;
}

/// Opens sessions to remote targets.
pub trait Connector {
    /// Connect and authenticate. `timeout` bounds every blocking call made
    /// through the returned session.
    fn connect(&self, target: &RemoteTarget, timeout: Duration) -> Result<Box<dyn Session>>;
}
