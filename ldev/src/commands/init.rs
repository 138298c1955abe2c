use crate::error::CliResult;
use ldev_config::ConfigLoader;
use ldev_core::ldev_success;
use std::path::Path;

/// Handles the `ldev init` command.
pub fn handle_init(dir: &Path) -> CliResult<i32> {
    let path = ConfigLoader::new().init(dir)?;
    ldev_success!("Created {}", path.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use ldev_core::error::LdevError;
    use tempfile::tempdir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        assert_eq!(handle_init(dir.path()).unwrap(), 0);
        assert!(dir.path().join(".ldev").is_file());

        match handle_init(dir.path()) {
            Err(CliError::Ldev(LdevError::Config(msg))) => {
                assert!(msg.contains("already exists"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
