// Standard library
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, ErrorKind, Write};

// External crates
use crate::error::{LdevError, Result};
use duct::cmd;
use tracing::debug;
use which::which;

/// Combined stdout/stderr and exit status of a finished local process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub output: String,
    /// Exit code, or -1 when the process was killed by a signal.
    pub status: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

fn spawn_error(program: &str, err: std::io::Error) -> LdevError {
    if err.kind() == ErrorKind::NotFound {
        LdevError::Dependency(program.to_string())
    } else {
        LdevError::Command(format!("Failed to start '{}': {}", program, err))
    }
}

/// Run a command line through `sh -c`, blocking until it exits.
///
/// With a `sink`, each output line is written to it as it arrives and the
/// returned output is empty; without one, the lines are collected and joined
/// with `\n`. Bytes that are not UTF-8 are replaced, as on the ssh path. A non-zero exit is reported through `status`, not as an error.
pub fn run_shell(command: &str, mut sink: Option<&mut dyn Write>) -> Result<ProcessOutput> {
    debug!(command, "running local shell command");

    let reader = cmd("sh", ["-c", command])
        .stderr_to_stdout()
        .unchecked()
        .reader()
        .map_err(|e| spawn_error("sh", e))?;

    let mut lines = Vec::new();
    for raw in BufReader::new(&reader).split(b'\n') {
        let raw = raw?;
        let line = String::from_utf8_lossy(&raw);
        match sink.as_deref_mut() {
            Some(out) => {
                writeln!(out, "{}", line)?;
                out.flush()?;
            }
            None => lines.push(line.into_owned()),
        }
    }

    let status = reader
        .try_wait()?
        .and_then(|output| output.status.code())
        .unwrap_or(-1);

    Ok(ProcessOutput {
        output: lines.join("\n"),
        status,
    })
}

/// Captured output of a program run without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, or -1 when the process was killed by a signal.
    pub status: i32,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stdout followed by stderr, for error reports.
    pub fn combined(&self) -> String {
        match (self.stdout.trim_end(), self.stderr.trim_end()) {
            (out, "") => out.to_string(),
            ("", err) => err.to_string(),
            (out, err) => format!("{out}\n{err}"),
        }
    }
}

/// Run a program directly (no shell), keeping stdout and stderr apart.
pub fn run_tool<A: AsRef<OsStr>>(program: &str, args: &[A]) -> Result<ToolOutput> {
    let full_command = format!(
        "{} {}",
        program,
        args.iter()
            .map(|a| a.as_ref().to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );
    debug!(command = %full_command.trim_end(), "running local tool");

    let output = cmd(program, args)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()
        .map_err(|e| spawn_error(program, e))?;

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status.code().unwrap_or(-1),
    })
}

/// Checks if a command-line tool is available in the system's PATH.
pub fn is_tool_installed(tool_name: &str) -> bool {
    which(tool_name).is_ok()
}
