use anyhow::Result;
use ldev_config::{ConfigLoader, ProjectConfig, CONFIG_FILENAME};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project tree with `.ldev` at its root, restoring the working directory on drop.
struct ProjectFixture {
    _temp_dir: TempDir,
    root: PathBuf,
    original_dir: PathBuf,
}

impl ProjectFixture {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        ConfigLoader::new().init(&root)?;
        Ok(Self {
            _temp_dir: temp_dir,
            root,
            original_dir: env::current_dir()?,
        })
    }

    fn enter(&self, relative: &str) -> Result<PathBuf> {
        let dir = self.root.join(relative);
        fs::create_dir_all(&dir)?;
        env::set_current_dir(&dir)?;
        Ok(dir)
    }

    fn write_defaults(&self, defaults: &str) -> Result<()> {
        let mut config: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(self.root.join(CONFIG_FILENAME))?)?;
        config["defaults"] = serde_json::from_str(defaults)?;
        fs::write(
            self.root.join(CONFIG_FILENAME),
            serde_json::to_string_pretty(&config)?,
        )?;
        Ok(())
    }
}

impl Drop for ProjectFixture {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original_dir);
    }
}

#[test]
#[serial]
fn test_load_from_cwd_finds_project_root() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.enter("provision/docker/compose/shop")?;

    let config = ConfigLoader::new().load_from_cwd()?;
    assert_eq!(config.project_dir(), Some(fixture.root.as_path()));
    assert!(config.is_ldev_project());
    Ok(())
}

#[test]
#[serial]
fn test_load_from_cwd_reads_defaults() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_defaults(r#"{"vagrant": true, "identity": "~/.ssh/vagrant", "timeout": 120}"#)?;
    fixture.enter("web")?;

    let config = ConfigLoader::new().load_from_cwd()?;
    assert_eq!(config.defaults.vagrant, Some(true));
    assert_eq!(config.defaults.identity.as_deref(), Some("~/.ssh/vagrant"));
    assert_eq!(config.defaults.timeout, Some(120));
    assert!(config.defaults.remote.is_none());
    Ok(())
}

#[test]
fn test_written_file_matches_fresh_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = ConfigLoader::new().init(temp_dir.path())?;

    let written: ProjectConfig = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written, ProjectConfig::new());
    assert_eq!(path.parent(), Some(Path::new(temp_dir.path())));
    Ok(())
}
