//! Home directory helpers.

use crate::error::{LdevError, Result};
use std::path::PathBuf;

/// Get the current user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| LdevError::Config("Cannot determine home directory".to_string()))
}

/// Get `~/.ssh`, the directory conventional private keys live in.
pub fn ssh_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".ssh"))
}

/// Expand a leading `~` to the home directory. Other paths are returned unchanged.
///
/// # Examples
/// ```
/// use ldev_core::user_paths::expand_home;
///
/// let path = expand_home("/etc/hosts");
/// assert_eq!(path, std::path::PathBuf::from("/etc/hosts"));
/// ```
pub fn expand_home(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
