//! Private key discovery for SSH connections.

use ldev_core::error::{LdevError, Result};
use ldev_core::user_paths::{expand_home, ssh_dir};
use std::path::PathBuf;
use tracing::debug;

/// Conventional key filenames under `~/.ssh`, in the order they are tried.
pub const DEFAULT_KEY_NAMES: [&str; 4] = ["id_dsa", "id_ecdsa", "id_ed25519", "id_rsa"];

/// Locates the private key used to authenticate.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    ssh_dir: PathBuf,
}

impl CredentialResolver {
    /// Resolver that searches the current user's `~/.ssh`.
    pub fn new() -> Result<Self> {
        Ok(Self::with_ssh_dir(ssh_dir()?))
    }

    /// Resolver that searches `dir` instead of `~/.ssh`.
    pub fn with_ssh_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            ssh_dir: dir.into(),
        }
    }

    /// Pick the key to use.
    ///
    /// An explicit path always wins and is only `~`-expanded; whether it exists
    /// is left to the authentication step. Otherwise the first of
    /// [`DEFAULT_KEY_NAMES`] present in the ssh directory is returned.
    pub fn resolve(&self, explicit: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = explicit.filter(|p| !p.is_empty()) {
            return Ok(expand_home(path));
        }

        let found = DEFAULT_KEY_NAMES
            .iter()
            .map(|name| self.ssh_dir.join(name))
            .find(|candidate| candidate.is_file());

        match found {
            Some(path) => {
                debug!(key = %path.display(), "using conventional private key");
                Ok(path)
            }
            None => Err(LdevError::NoCredentialFound {
                searched: DEFAULT_KEY_NAMES
                    .iter()
                    .map(|name| self.ssh_dir.join(name).display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}
