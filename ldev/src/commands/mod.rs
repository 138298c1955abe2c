// Command handlers for ldev

use crate::cli::{Args, Command, TargetArgs};
use crate::error::CliResult;
use ldev_config::{ConfigLoader, ProjectDefaults};
use ldev_core::ldev_warning;
use ldev_provider::executor::DEFAULT_TIMEOUT_SECS;
use ldev_provider::{ExecResult, ExecutionContext, TargetOptions};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub mod env_info;
pub mod init;
pub mod lifecycle;
pub mod web;

/// Exit status used when a remote command times out.
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Main command dispatcher. Returns the process exit code.
pub fn execute_command(args: Args) -> CliResult<i32> {
    let cwd = env::current_dir()?;
    debug!(command = args.command.name(), cwd = %cwd.display(), "dispatching");

    match args.command {
        Command::Init => init::handle_init(&cwd),
        Command::Up { environment } => {
            lifecycle::handle_up(&mut open_context(&args.target, &cwd)?, &environment)
        }
        Command::Destroy { environment, yes } => {
            lifecycle::handle_destroy(&mut open_context(&args.target, &cwd)?, &environment, yes)
        }
        Command::Ps { environment } => {
            lifecycle::handle_ps(&mut open_context(&args.target, &cwd)?, environment.as_deref())
        }
        Command::Ls => lifecycle::handle_ls(&mut open_context(&args.target, &cwd)?),
        Command::Env { environment, json } => env_info::handle_env(
            &mut open_context(&args.target, &cwd)?,
            environment.as_deref(),
            json,
        ),
        Command::SshCommand { environment } => web::handle_ssh_command(
            &mut open_context(&args.target, &cwd)?,
            environment.as_deref(),
        ),
        Command::Exec {
            environment,
            command,
        } => web::handle_exec(
            &mut open_context(&args.target, &cwd)?,
            environment.as_deref(),
            &command,
        ),
        Command::Get { environment, path } => {
            web::handle_get(&mut open_context(&args.target, &cwd)?, &environment, &path)
        }
        Command::Put {
            environment,
            file,
            path,
        } => web::handle_put(
            &mut open_context(&args.target, &cwd)?,
            &environment,
            &file,
            &path,
        ),
    }
}

/// Load `.ldev` and build the context every project command runs in.
fn open_context(target: &TargetArgs, cwd: &Path) -> CliResult<ExecutionContext> {
    let project = ConfigLoader::new().load(cwd)?;
    let project_dir = project.project_dir().unwrap_or(cwd).to_path_buf();
    debug!(project_dir = %project_dir.display(), "loaded project");

    let timeout = target
        .timeout
        .or(project.defaults.timeout)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let options = target_options(target, &project.defaults);

    Ok(ExecutionContext::new(options, project_dir)?.with_timeout(Duration::from_secs(timeout)))
}

/// Merge command-line target flags over the project defaults.
///
/// `--remote` and `--vagrant` are taken as a pair: naming either on the
/// command line replaces both defaults, so a pinned `vagrant` default never
/// collides with an explicit `--remote`.
fn target_options(args: &TargetArgs, defaults: &ProjectDefaults) -> TargetOptions {
    let (remote, vagrant) = if args.remote.is_some() || args.vagrant {
        (args.remote.clone(), args.vagrant)
    } else {
        (defaults.remote.clone(), defaults.vagrant.unwrap_or(false))
    };

    TargetOptions {
        remote,
        vagrant,
        identity: args.identity.clone().or_else(|| defaults.identity.clone()),
    }
}

/// Process exit code for a finished command.
fn exit_code(result: &ExecResult) -> i32 {
    if result.timed_out {
        ldev_warning!("Remote command timed out");
        TIMEOUT_EXIT_CODE
    } else if result.exit_status < 0 {
        1
    } else {
        result.exit_status
    }
}
