//! Shell command lines for docker-compose environments.
//!
//! Every environment lives in `<root>/provision/docker/compose/<env>/`, where
//! `<root>` is `/opt` on a remote docker host and the project directory locally.

/// Root directory on remote docker hosts.
pub const REMOTE_ROOT_DIR: &str = "/opt";

/// Location of environment directories below the root.
pub const COMPOSE_SUBDIR: &str = "provision/docker/compose";

/// One line per running container: `<name>  <ports>`.
pub const LISTING_COMMAND: &str = "docker ps --format='{{.Names}}  {{.Ports}}'";

/// Human-readable container table.
pub const TABLE_COMMAND: &str = "docker ps --format='table {{.Names}}\\t{{.Status}}\\t{{.Ports}}'";

/// Quote `arg` for `sh` unless it is made of path-safe characters only.
pub fn shell_escape(arg: &str) -> String {
    let safe = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | '@' | ':' | '=' | ',')
    };
    if !arg.is_empty() && arg.chars().all(safe) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// `<root>/provision/docker/compose`
pub fn environments_dir(root: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), COMPOSE_SUBDIR)
}

/// `<root>/provision/docker/compose/<env>`
pub fn environment_dir(root: &str, env: &str) -> String {
    format!("{}/{}", environments_dir(root), env)
}

fn in_environment(root: &str, env: &str, command: &str) -> String {
    format!(
        "cd {} && {}",
        shell_escape(&environment_dir(root, env)),
        command
    )
}

pub fn up_command(root: &str, env: &str) -> String {
    in_environment(root, env, "docker-compose up -d")
}

/// Stop, then remove, the environment's containers.
pub fn destroy_commands(root: &str, env: &str) -> [String; 2] {
    [
        in_environment(root, env, "docker-compose stop"),
        in_environment(root, env, "docker-compose rm -f"),
    ]
}

/// `docker-compose ps` for one environment, or the container table for all.
pub fn ps_command(root: &str, env: Option<&str>) -> String {
    match env {
        Some(env) => in_environment(root, env, "docker-compose ps"),
        None => TABLE_COMMAND.to_string(),
    }
}

pub fn ls_command(root: &str) -> String {
    format!("ls {}/", shell_escape(&environments_dir(root)))
}

pub fn cat_command(path: &str) -> String {
    format!("cat {}", shell_escape(path))
}
