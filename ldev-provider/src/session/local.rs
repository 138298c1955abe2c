use super::{ExecResult, Session};
use ldev_core::command_stream::run_shell;
use ldev_core::error::Result;
use std::fs;
use std::io::Write;

/// Runs commands through `sh -c` on this machine.
///
/// There is no timeout here: a local command blocks until it exits.
#[derive(Debug, Default)]
pub struct LocalSession;

impl Session for LocalSession {
    fn execute(&mut self, command: &str, sink: Option<&mut dyn Write>) -> Result<ExecResult> {
        let result = run_shell(command, sink)?;
        Ok(ExecResult {
            output: result.output,
            timed_out: false,
            exit_status: result.status,
        })
    }

    fn read_file(&mut self, path: &str) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()> {
        Ok(fs::write(path, contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_execute_reports_exit_status() {
        let mut session = LocalSession;
        let result = session.execute("echo hello && false", None).unwrap();
        assert_eq!(result.output, "hello");
        assert_eq!(result.exit_status, 1);
        assert!(!result.timed_out);
        assert!(!result.success());
    }

    #[test]
    fn test_local_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("xdebug.ini");
        let path = path.to_str().unwrap();

        let mut session = LocalSession;
        session.write_file(path, "xdebug.remote_enable=1\n").unwrap();
        assert_eq!(session.read_file(path).unwrap(), "xdebug.remote_enable=1\n");
    }
}
