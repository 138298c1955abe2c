//! Reaching the `web` container of an environment over ssh.
//!
//! Each environment publishes its web container's sshd on the docker host.
//! The connection goes to that published port on the docker host (or
//! `localhost`), as root, with the user's own key.

use crate::compose::shell_escape;
use crate::credential::CredentialResolver;
use crate::registry::{EnvironmentRegistry, PortRole};
use crate::ssh_config::REQUIRED_KEYS;
use crate::target::{ConnectionTarget, RemoteTarget};
use indexmap::IndexMap;
use ldev_core::error::{LdevError, Result};
use serde::Serialize;
use std::path::PathBuf;

pub const WEB_USER: &str = "root";
pub const LOOPBACK_HOST: &str = "localhost";

/// Connection parameters for one environment's web container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebConnection {
    pub env: String,
    pub user: String,
    pub host: String,
    pub port: u16,
    pub identity_file: PathBuf,
    /// Options carried over from the docker host connection.
    pub extra_options: IndexMap<String, String>,
    /// The full ssh_config view: `User`, `HostName`, `Port`, `ForwardAgent`,
    /// the carried options, then `IdentityFile`.
    pub session_config: IndexMap<String, String>,
}

impl WebConnection {
    pub fn target(&self) -> RemoteTarget {
        RemoteTarget {
            user: self.user.clone(),
            host: self.host.clone(),
            port: self.port,
            identity_file: self.identity_file.clone(),
            options: self.extra_options.clone(),
        }
    }

    /// `ssh` arguments equivalent to `session_config`.
    pub fn ssh_args(&self) -> Vec<String> {
        let mut args = vec!["-p".to_string(), self.port.to_string(), "-A".to_string()];
        for (key, value) in &self.extra_options {
            args.push("-o".to_string());
            args.push(format!("{key} {value}"));
        }
        args.push("-i".to_string());
        args.push(self.identity_file.display().to_string());
        args.push(format!("{}@{}", self.user, self.host));
        args
    }

    /// A shell-ready `ssh` command line.
    pub fn ssh_command(&self) -> String {
        let args: Vec<String> = self.ssh_args().iter().map(|a| shell_escape(a)).collect();
        format!("ssh {}", args.join(" "))
    }
}

/// Pick the environment a web command applies to.
///
/// An explicit name is used as given. Without one, a registry holding exactly
/// one environment determines it.
pub fn select_environment<'a>(
    env: Option<&'a str>,
    registry: &'a EnvironmentRegistry,
) -> Result<&'a str> {
    if let Some(env) = env.filter(|e| !e.is_empty()) {
        return Ok(env);
    }
    let mut names = registry.names();
    match (names.next(), names.next()) {
        (Some(only), None) => Ok(only),
        _ => Err(LdevError::MissingEnvironment),
    }
}

/// Derive the web container connection for `env`.
///
/// `identity` is the key requested on the command line; it is resolved
/// afresh, so a virtualization-provided key is never reused here.
pub fn resolve_web(
    env: Option<&str>,
    outer: &ConnectionTarget,
    registry: &EnvironmentRegistry,
    credentials: &CredentialResolver,
    identity: Option<&str>,
) -> Result<WebConnection> {
    let env = select_environment(env, registry)?;

    let environment = registry
        .get(env)
        .ok_or_else(|| LdevError::UnknownEnvironment(env.to_string()))?;
    let port_text = environment
        .port(PortRole::Ssh)
        .ok_or_else(|| LdevError::UnknownEnvironment(env.to_string()))?;
    let port = port_text
        .parse::<u16>()
        .map_err(|_| LdevError::InvalidPort {
            remote: env.to_string(),
            port: port_text.to_string(),
        })?;

    let (host, extra_options) = match outer {
        ConnectionTarget::Remote(remote) => (
            remote.host.clone(),
            remote
                .options
                .iter()
                .filter(|(key, _)| !REQUIRED_KEYS.contains(&key.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<IndexMap<_, _>>(),
        ),
        ConnectionTarget::Local => (LOOPBACK_HOST.to_string(), IndexMap::new()),
    };

    let identity_file = credentials.resolve(identity)?;

    let mut session_config = IndexMap::new();
    session_config.insert("User".to_string(), WEB_USER.to_string());
    session_config.insert("HostName".to_string(), host.clone());
    session_config.insert("Port".to_string(), port.to_string());
    session_config.insert("ForwardAgent".to_string(), "yes".to_string());
    session_config.extend(extra_options.clone());
    session_config.insert(
        "IdentityFile".to_string(),
        identity_file.display().to_string(),
    );

    Ok(WebConnection {
        env: env.to_string(),
        user: WEB_USER.to_string(),
        host,
        port,
        identity_file,
        extra_options,
        session_config,
    })
}
