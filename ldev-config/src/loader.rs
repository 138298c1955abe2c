// Standard library imports
use std::fs;
use std::path::{Path, PathBuf};

// External crate imports
use tracing::debug;

// Internal imports
use crate::project::{ProjectConfig, CONFIG_FILENAME};
use ldev_core::error::{LdevError, Result};

/// Finds, loads and creates `.ldev` project files.
///
/// Discovery starts at a directory and walks up through its ancestors. The
/// first `.ldev` that parses and carries the ldev namespace wins; files that
/// fail either check are skipped and the search continues upward.
#[derive(Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Search `start` and its ancestors for a project file.
    pub fn find(&self, start: &Path) -> Option<ProjectConfig> {
        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                match self.load_file(&candidate) {
                    Ok(config) if config.is_ldev_project() => {
                        debug!("Loading config from: {}", candidate.display());
                        return Some(config);
                    }
                    Ok(_) => debug!("Ignoring {}: foreign namespace", candidate.display()),
                    Err(e) => debug!("Ignoring {}: {}", candidate.display(), e),
                }
            }
            current = dir.parent();
        }
        None
    }

    /// Like [`find`](Self::find), but a missing project file is an error.
    pub fn load(&self, start: &Path) -> Result<ProjectConfig> {
        self.find(start).ok_or_else(|| {
            LdevError::Config("No .ldev configuration file found.".to_string())
        })
    }

    /// Load from the current working directory.
    pub fn load_from_cwd(&self) -> Result<ProjectConfig> {
        let cwd = std::env::current_dir()?;
        self.load(&cwd)
    }

    /// Write a fresh `.ldev` into `dir`. Refuses to overwrite an existing one.
    pub fn init(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            return Err(LdevError::Config(format!(
                "{} already exists in the current directory.",
                path.display()
            )));
        }
        let json = serde_json::to_string_pretty(&ProjectConfig::new())?;
        fs::write(&path, json)?;
        Ok(path)
    }

    fn load_file(&self, path: &Path) -> Result<ProjectConfig> {
        let contents = fs::read_to_string(path)?;
        let mut config: ProjectConfig = serde_json::from_str(&contents)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_in_same_directory() {
        let dir = tempdir().unwrap();
        let path = ConfigLoader::new().init(dir.path()).unwrap();

        let config = ConfigLoader::new().find(dir.path()).unwrap();
        assert_eq!(config.source_path, Some(path));
    }

    #[test]
    fn test_find_walks_up_to_ancestor() {
        let dir = tempdir().unwrap();
        ConfigLoader::new().init(dir.path()).unwrap();
        let nested = dir.path().join("code/site/web");
        fs::create_dir_all(&nested).unwrap();

        let config = ConfigLoader::new().find(&nested).unwrap();
        assert_eq!(config.project_dir(), Some(dir.path()));
    }

    #[test]
    fn test_foreign_namespace_is_skipped() {
        let dir = tempdir().unwrap();
        ConfigLoader::new().init(dir.path()).unwrap();
        let nested = dir.path().join("other");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join(CONFIG_FILENAME),
            r#"{"namespace": "someone.else", "version": "1"}"#,
        )
        .unwrap();

        let config = ConfigLoader::new().find(&nested).unwrap();
        assert_eq!(config.project_dir(), Some(dir.path()));
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "not json").unwrap();
        assert!(ConfigLoader::new().find(dir.path()).is_none());
    }

    #[test]
    fn test_load_without_project_is_config_error() {
        let dir = tempdir().unwrap();
        let err = ConfigLoader::new().load(dir.path()).unwrap_err();
        assert!(matches!(err, LdevError::Config(_)));
        assert_eq!(err.hint(), Some("Run `ldev init`"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        ConfigLoader::new().init(dir.path()).unwrap();
        let err = ConfigLoader::new().init(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
