// `ldev env`: what discovery found on the docker host

use crate::error::CliResult;
use ldev_core::error::LdevError;
use ldev_core::{ldev_info, ldev_println};
use ldev_provider::ssh_config::ConnectionInfoSource;
use ldev_provider::{Connector, Environment, ExecutionContext};

/// Handles `ldev env [environment] [--json]`.
pub fn handle_env<S, C>(
    context: &mut ExecutionContext<S, C>,
    environment: Option<&str>,
    json: bool,
) -> CliResult<i32>
where
    S: ConnectionInfoSource,
    C: Connector,
{
    let registry = context.discover()?;

    let selected: Vec<&Environment> = match environment {
        Some(name) => vec![registry
            .get(name)
            .ok_or_else(|| LdevError::UnknownEnvironment(name.to_string()))?],
        None => registry.iter().collect(),
    };

    if json {
        let rendered = match environment {
            Some(_) => serde_json::to_string_pretty(&selected[0])?,
            None => serde_json::to_string_pretty(registry)?,
        };
        ldev_println!("{}", rendered);
        return Ok(0);
    }

    if selected.is_empty() {
        ldev_info!("No environments are running");
        return Ok(0);
    }
    for env in selected {
        ldev_println!("{}", render_summary(env));
    }
    Ok(0)
}

fn render_summary(env: &Environment) -> String {
    let mut out = env.name.clone();

    if !env.ports.is_empty() {
        let ports: Vec<String> = env
            .ports
            .iter()
            .map(|(role, port)| format!("{role} {port}"))
            .collect();
        out.push_str(&format!("\n  ports:      {}", ports.join(", ")));
    }

    let details = [
        ("xdebug ini", env.ldev.xdebug_ini()),
        ("docroot", env.ldev.phpstorm_project_root()),
        ("php", env.ldev.language_level()),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            out.push_str(&format!("\n  {:<11} {}", format!("{label}:"), value));
        }
    }

    let containers: Vec<String> = env
        .containers
        .iter()
        .map(|(role, container)| format!("{role} ({})", container.id))
        .collect();
    out.push_str(&format!("\n  containers: {}", containers.join(", ")));
    out
}
