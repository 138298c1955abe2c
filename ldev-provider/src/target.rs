//! Deciding where commands run.

use crate::credential::CredentialResolver;
use crate::ssh_config::{parse_ssh_config, require_keys, ConnectionInfoSource, VagrantSshConfig};
use indexmap::IndexMap;
use ldev_core::error::{LdevError, Result};
use ldev_core::user_paths::expand_home;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Where commands for this invocation are executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConnectionTarget {
    Local,
    Remote(RemoteTarget),
}

impl ConnectionTarget {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn remote(&self) -> Option<&RemoteTarget> {
        match self {
            Self::Remote(remote) => Some(remote),
            Self::Local => None,
        }
    }
}

/// An ssh endpoint plus the key used to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteTarget {
    pub user: String,
    pub host: String,
    pub port: u16,
    pub identity_file: PathBuf,
    /// Extra ssh_config options reported with the connection, e.g.
    /// `StrictHostKeyChecking`. Empty for targets given with `--remote`.
    pub options: IndexMap<String, String>,
}

impl RemoteTarget {
    /// `user@host:port`, used in logs and error messages.
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Target selection as requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOptions {
    /// `user@host[:port]` of a docker host reached over ssh.
    pub remote: Option<String>,
    /// Docker runs inside the Vagrant machine of the current directory.
    pub vagrant: bool,
    /// Private key path; searched for in `~/.ssh` when absent.
    pub identity: Option<String>,
}

impl TargetOptions {
    pub fn wants_remote(&self) -> bool {
        self.remote.is_some() || self.vagrant
    }
}

/// Split `user@host[:port]` into its parts. The port defaults to 22.
pub fn parse_remote_spec(spec: &str) -> Result<(String, String, u16)> {
    let (user, host_part) = spec
        .split_once('@')
        .filter(|(user, _)| !user.is_empty())
        .ok_or_else(|| LdevError::MissingUser {
            remote: spec.to_string(),
        })?;

    let (host, port) = match host_part.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| LdevError::InvalidPort {
                remote: spec.to_string(),
                port: port.to_string(),
            })?;
            (host, port)
        }
        None => (host_part, DEFAULT_SSH_PORT),
    };

    if host.is_empty() {
        return Err(LdevError::Config(format!("No host in remote \"{}\"", spec)));
    }

    Ok((user.to_string(), host.to_string(), port))
}

/// Resolves [`TargetOptions`] to a [`ConnectionTarget`] once per invocation.
///
/// The first successful resolution is memoized; later calls return it without
/// spawning the virtualization tool again.
pub struct ConnectionResolver<S = VagrantSshConfig> {
    options: TargetOptions,
    credentials: CredentialResolver,
    source: S,
    resolved: OnceCell<ConnectionTarget>,
}

impl ConnectionResolver<VagrantSshConfig> {
    /// Resolver backed by `~/.ssh` and `vagrant ssh-config`.
    pub fn new(options: TargetOptions) -> Result<Self> {
        Ok(Self::with_parts(
            options,
            CredentialResolver::new()?,
            VagrantSshConfig::default(),
        ))
    }
}

impl<S: ConnectionInfoSource> ConnectionResolver<S> {
    pub fn with_parts(options: TargetOptions, credentials: CredentialResolver, source: S) -> Self {
        Self {
            options,
            credentials,
            source,
            resolved: OnceCell::new(),
        }
    }

    pub fn options(&self) -> &TargetOptions {
        &self.options
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    pub fn resolve(&self) -> Result<&ConnectionTarget> {
        self.resolved.get_or_try_init(|| self.resolve_uncached())
    }

    fn resolve_uncached(&self) -> Result<ConnectionTarget> {
        let options = &self.options;
        if options.remote.is_some() && options.vagrant {
            return Err(LdevError::ConflictingTargets);
        }

        let target = if let Some(spec) = options.remote.as_deref() {
            let (user, host, port) = parse_remote_spec(spec)?;
            let identity_file = self.credentials.resolve(options.identity.as_deref())?;
            ConnectionTarget::Remote(RemoteTarget {
                user,
                host,
                port,
                identity_file,
                options: IndexMap::new(),
            })
        } else if options.vagrant {
            ConnectionTarget::Remote(self.resolve_from_source()?)
        } else {
            ConnectionTarget::Local
        };

        match &target {
            ConnectionTarget::Remote(remote) => {
                info!(target = %remote.address(), "resolved remote docker host")
            }
            ConnectionTarget::Local => debug!("resolved local docker host"),
        }
        Ok(target)
    }

    fn resolve_from_source(&self) -> Result<RemoteTarget> {
        let tool = self.source.describe();
        let mut entries = parse_ssh_config(&self.source.fetch()?);
        require_keys(&entries, &tool)?;

        // require_keys guarantees all four are present.
        let mut take = |key: &str| entries.shift_remove(key).unwrap_or_default();
        let host = take("HostName");
        let user = take("User");
        let port_text = take("Port");
        let identity = take("IdentityFile");

        let port = port_text
            .parse::<u16>()
            .map_err(|_| LdevError::InvalidPort {
                remote: tool,
                port: port_text.clone(),
            })?;

        Ok(RemoteTarget {
            user,
            host,
            port,
            identity_file: expand_home(&identity),
            options: entries,
        })
    }
}
