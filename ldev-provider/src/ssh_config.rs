//! Connection parameters reported by a virtualization front-end.
//!
//! `vagrant ssh-config` prints an ssh_config(5) block:
//!
//! ```text
//! Host default
//!   HostName 127.0.0.1
//!   User vagrant
//!   Port 2222
//!   IdentityFile "/home/me/project/.vagrant/machines/default/virtualbox/private_key"
//! ```
//!
//! Indented `Key Value` / `Key "Value"` lines become entries; anything else
//! (the `Host` header, blank lines) is ignored.

use indexmap::IndexMap;
use ldev_core::command_stream::{is_tool_installed, run_tool};
use ldev_core::error::{LdevError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Keys a usable connection cannot do without.
pub const REQUIRED_KEYS: [&str; 4] = ["HostName", "User", "Port", "IdentityFile"];

static SSH_CONFIG_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ +([^ ]+) +(.*)$").expect("static regex"));

/// Parse ssh-config output into an ordered key/value map.
///
/// Values wrapped in double quotes are unwrapped; lines with an empty value
/// are dropped.
pub fn parse_ssh_config(text: &str) -> IndexMap<String, String> {
    let mut entries = IndexMap::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        let Some(caps) = SSH_CONFIG_LINE.captures(line) else {
            continue;
        };
        let key = &caps[1];
        let mut value = &caps[2];
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }
        let value = value.trim_end();
        if value.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), value.to_string());
    }
    entries
}

/// Check that every key in [`REQUIRED_KEYS`] is present, naming the first one missing.
pub fn require_keys(entries: &IndexMap<String, String>, tool: &str) -> Result<()> {
    for key in REQUIRED_KEYS {
        if entries.get(key).map_or(true, |v| v.is_empty()) {
            return Err(LdevError::IncompleteVirtualizationConfig {
                tool: tool.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Something that can report ssh connection parameters for a guest machine.
pub trait ConnectionInfoSource {
    /// Command line shown in error messages.
    fn describe(&self) -> String;

    /// Raw ssh-config text. Fails with `ToolInvocationFailed` on a non-zero exit.
    fn fetch(&self) -> Result<String>;
}

/// `vagrant ssh-config`, run in the current directory.
#[derive(Debug, Clone)]
pub struct VagrantSshConfig {
    program: String,
}

impl Default for VagrantSshConfig {
    fn default() -> Self {
        Self::with_program("vagrant")
    }
}

impl VagrantSshConfig {
    /// Use another executable in place of `vagrant`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ConnectionInfoSource for VagrantSshConfig {
    fn describe(&self) -> String {
        format!("{} ssh-config", self.program)
    }

    /// Only stdout is parsed; warnings on stderr show up in failures alone.
    fn fetch(&self) -> Result<String> {
        if !is_tool_installed(&self.program) {
            return Err(LdevError::Dependency(self.program.clone()));
        }
        let result = run_tool(&self.program, &["ssh-config"])?;
        if !result.success() {
            return Err(LdevError::ToolInvocationFailed {
                tool: self.describe(),
                status: result.status,
                output: result.combined(),
            });
        }
        Ok(result.stdout)
    }
}
