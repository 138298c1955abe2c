//! Running environments, discovered from the container listing.
//!
//! Discovery runs [`LISTING_COMMAND`] on the docker host, groups containers by
//! compose project, fetches each project's `docker-compose.yml` and `ldev.yml`
//! once, and records which published ports serve ssh, http, https and the
//! database.

mod listing;
mod ports;

pub use listing::{parse_listing_line, ListingLine};
pub use ports::{PortBinding, PortRole, Protocol};

use crate::compose::{cat_command, environment_dir, LISTING_COMMAND};
use crate::executor::{CommandExecutor, ExecOptions};
use crate::session::Connector;
use crate::target::ConnectionTarget;
use indexmap::IndexMap;
use ldev_config::descriptor::{COMPOSE_FILENAME, LDEV_FILENAME};
use ldev_config::{ComposeDescriptor, LdevDescriptor};
use ldev_core::error::{LdevError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// The two declarative files an environment directory holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptors {
    pub compose: ComposeDescriptor,
    pub ldev: LdevDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Container {
    /// Full container name, e.g. `myapp_web_1`.
    pub id: String,
    /// Container port spec (`22/tcp`) to published port (`32776`).
    pub ports: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub name: String,
    /// Compose service name to container.
    pub containers: IndexMap<String, Container>,
    pub compose: ComposeDescriptor,
    pub ldev: LdevDescriptor,
    pub ports: BTreeMap<PortRole, String>,
}

impl Environment {
    fn new(name: &str, descriptors: Descriptors) -> Self {
        Self {
            name: name.to_string(),
            containers: IndexMap::new(),
            compose: descriptors.compose,
            ldev: descriptors.ldev,
            ports: BTreeMap::new(),
        }
    }

    pub fn port(&self, role: PortRole) -> Option<&str> {
        self.ports.get(&role).map(String::as_str)
    }

    fn record_container(&mut self, line: &ListingLine) {
        let mut container = Container {
            id: line.container.clone(),
            ports: IndexMap::new(),
        };

        for token in line.ports.split(", ") {
            let Some(binding) = PortBinding::parse(token) else {
                continue;
            };
            let spec = binding.container_spec();
            if let Some(role) = PortRole::classify(&spec, self.ldev.db_port()) {
                self.ports.insert(role, binding.external_port.clone());
            }
            container.ports.insert(spec, binding.external_port);
        }

        self.containers.insert(line.role.clone(), container);
    }
}

/// Environments keyed by name, in listing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnvironmentRegistry {
    environments: IndexMap<String, Environment>,
}

impl EnvironmentRegistry {
    /// Build from listing output. `fetch` is called once per environment,
    /// the first time one of its containers is seen.
    pub fn from_listing<F>(listing: &str, mut fetch: F) -> Result<Self>
    where
        F: FnMut(&str) -> Result<Descriptors>,
    {
        let mut environments: IndexMap<String, Environment> = IndexMap::new();

        for raw in listing.trim().lines() {
            if raw.trim().is_empty() {
                continue;
            }
            let Some(line) = parse_listing_line(raw) else {
                warn!(line = raw, "skipping container that is not part of a compose project");
                continue;
            };

            if !environments.contains_key(&line.env) {
                debug!(env = %line.env, "fetching environment descriptors");
                let descriptors = fetch(&line.env)?;
                environments.insert(line.env.clone(), Environment::new(&line.env, descriptors));
            }
            if let Some(env) = environments.get_mut(&line.env) {
                env.record_container(&line);
            }
        }

        info!(count = environments.len(), "discovered environments");
        Ok(Self { environments })
    }

    /// Run the listing on `target` and fetch descriptors from below `root`.
    pub fn discover<C: Connector>(
        executor: &mut CommandExecutor<C>,
        target: &ConnectionTarget,
        root: &str,
        opts: &ExecOptions,
    ) -> Result<Self> {
        let opts = opts.printed(false);
        let listing = executor.run(target, LISTING_COMMAND, &opts)?;
        if listing.exit_status != 0 {
            return Err(LdevError::DescriptorFetch {
                path: "docker ps".to_string(),
                output: listing.output,
            });
        }

        Self::from_listing(&listing.output, |env| {
            let dir = environment_dir(root, env);
            let compose_path = format!("{dir}/{COMPOSE_FILENAME}");
            let ldev_path = format!("{dir}/{LDEV_FILENAME}");

            let compose_text = fetch_file(executor, target, &compose_path, &opts)?;
            let compose = ComposeDescriptor::parse(&compose_text, &compose_path)?;
            let ldev_text = fetch_file(executor, target, &ldev_path, &opts)?;
            let ldev = LdevDescriptor::parse(&ldev_text, &ldev_path)?;
            Ok(Descriptors { compose, ldev })
        })
    }

    pub fn get(&self, name: &str) -> Option<&Environment> {
        self.environments.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Environment> {
        self.environments.values()
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

fn fetch_file<C: Connector>(
    executor: &mut CommandExecutor<C>,
    target: &ConnectionTarget,
    path: &str,
    opts: &ExecOptions,
) -> Result<String> {
    let result = executor.run(target, &cat_command(path), opts)?;
    if result.exit_status != 0 {
        return Err(LdevError::DescriptorFetch {
            path: path.to_string(),
            output: result.output,
        });
    }
    Ok(result.output)
}
