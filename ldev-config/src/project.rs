use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the project file that marks an ldev project root.
pub const CONFIG_FILENAME: &str = ".ldev";

/// Namespace stamped into every `.ldev` file; files with another namespace are ignored.
pub const NAMESPACE: &str = "name.brianfisher.ldev";

/// Contents of a `.ldev` project file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub namespace: String,
    pub version: String,

    /// Option defaults applied when the command line leaves them unset.
    #[serde(default, skip_serializing_if = "ProjectDefaults::is_empty")]
    pub defaults: ProjectDefaults,

    /// Where this config was loaded from. Not serialized.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vagrant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Remote command timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ProjectDefaults {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ProjectConfig {
    /// A fresh config for `ldev init`, stamped with this tool's version.
    pub fn new() -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            defaults: ProjectDefaults::default(),
            source_path: None,
        }
    }

    pub fn is_ldev_project(&self) -> bool {
        self.namespace == NAMESPACE
    }

    /// Directory containing the `.ldev` file, if this config was loaded from disk.
    pub fn project_dir(&self) -> Option<&Path> {
        self.source_path.as_deref().and_then(Path::parent)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new()
    }
}
