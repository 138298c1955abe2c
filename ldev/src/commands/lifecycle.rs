// docker-compose lifecycle commands: up, destroy, ps, ls

use super::exit_code;
use crate::error::CliResult;
use dialoguer::Confirm;
use ldev_core::{ldev_println, ldev_success};
use ldev_provider::compose::{destroy_commands, ls_command, ps_command, up_command};
use ldev_provider::ssh_config::ConnectionInfoSource;
use ldev_provider::{Connector, ExecutionContext};
use tracing::info;

/// Handles `ldev up <environment>`.
pub fn handle_up<S, C>(context: &mut ExecutionContext<S, C>, environment: &str) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let command = up_command(&context.root_dir()?, environment);
    info!(environment, "starting environment");
    let result = context.run(&command, true)?;
    let code = exit_code(&result);
    if code == 0 {
        ldev_success!("Environment '{}' is up", environment);
    }
    Ok(code)
}

/// Handles `ldev destroy <environment>`.
///
/// Containers are stopped, then removed. Removal runs even if stopping fails.
pub fn handle_destroy<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: &str,
    yes: bool,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    if !yes && !confirm_destroy()? {
        ldev_println!("Aborted.");
        return Ok(0);
    }

    let mut code = 0;
    for command in destroy_commands(&context.root_dir()?, environment) {
        let result = context.run(&command, true)?;
        if code == 0 {
            code = exit_code(&result);
        }
    }
    if code == 0 {
        ldev_success!("Environment '{}' destroyed", environment);
    }
    Ok(code)
}

fn confirm_destroy() -> CliResult<bool> {
    Ok(Confirm::new()
        .with_prompt("This will destroy any data stored in containers. Continue?")
        .default(true)
        .interact()?)
}

/// Handles `ldev ps [environment]`.
pub fn handle_ps<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: Option<&str>,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let command = ps_command(&context.root_dir()?, environment);
    let result = context.run(&command, true)?;
    Ok(exit_code(&result))
}

/// Handles `ldev ls`.
pub fn handle_ls<S, C>(context: &mut ExecutionContext<S, C>) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let command = ls_command(&context.root_dir()?);
    let result = context.run(&command, true)?;
    Ok(exit_code(&result))
}
