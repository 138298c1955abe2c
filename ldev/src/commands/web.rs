// Commands that reach into an environment's web container

use super::exit_code;
use crate::error::{CliError, CliResult};
use ldev_core::{ldev_print, ldev_println, ldev_success};
use ldev_provider::compose::shell_escape;
use ldev_provider::ssh_config::ConnectionInfoSource;
use ldev_provider::{Connector, ExecutionContext};
use std::fs;
use std::path::Path;

/// Handles `ldev ssh-command [environment]`.
pub fn handle_ssh_command<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: Option<&str>,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let web = context.web_connection(environment)?;
    ldev_println!("{}", web.ssh_command());
    Ok(0)
}

/// Handles `ldev exec [environment] -- <command...>`.
pub fn handle_exec<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: Option<&str>,
    command: &[String],
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let line = join_command(command);
    match context.exec_web(environment, Some(&line), true)? {
        Some(result) => Ok(exit_code(&result)),
        None => Ok(0),
    }
}

/// Handles `ldev get <environment> <path>`.
pub fn handle_get<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: &str,
    path: &str,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let contents = context.read_web_file(Some(environment), path)?;
    ldev_print!("{}", contents);
    Ok(0)
}

/// Handles `ldev put <environment> <file> <path>`.
pub fn handle_put<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: &str,
    file: &Path,
    path: &str,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let contents = fs::read_to_string(file)
        .map_err(|e| CliError::filesystem(e, file.display().to_string(), "read"))?;
    context.write_web_file(Some(environment), path, &contents)?;
    ldev_success!("Copied {} to {}:{}", file.display(), environment, path);
    Ok(0)
}

/// Quote each argument so the remote shell sees the words as given.
fn join_command(command: &[String]) -> String {
    command
        .iter()
        .map(|arg| shell_escape(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_command_quotes_only_when_needed() {
        let command: Vec<String> = ["drush", "sql-query", "SELECT 1;", "--uri=shop.local"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            join_command(&command),
            "drush sql-query 'SELECT 1;' --uri=shop.local"
        );
    }
}
