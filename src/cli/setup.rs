use crate::core::config::AppConfig;
use anyhow::{Context, Result, bail};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example config to the default config location.
pub fn setup() -> Result<()> {
    setup_at_path(AppConfig::default_config_path()?)
}

/// Writes the example config to `path`. An existing file is never replaced.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create config directory {}", dir.display()))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            bail!("Config already exists at {}, not overwriting", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot create config {}", path.display()));
        }
    };
    file.write_all(EXAMPLE_CONFIG.as_bytes())
        .with_context(|| format!("Cannot write config {}", path.display()))?;

    tracing::info!(path = %path.display(), "Wrote example config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_setup_writes_loadable_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.yaml");

        setup_at_path(&config_path)?;

        assert_eq!(fs::read_to_string(&config_path)?, EXAMPLE_CONFIG);
        let config = AppConfig::load_from_path(&config_path)?;
        assert_eq!(config.updater.assets, vec!["bitcoin", "ethereum", "litecoin"]);
        assert_eq!(config.updater.history_window_hours, 24);

        Ok(())
    }

    #[test]
    fn test_setup_keeps_existing_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "request_timeout_secs: 3\n")?;

        let err = setup_at_path(&config_path).unwrap_err();

        assert!(err.to_string().contains("not overwriting"));
        assert_eq!(fs::read_to_string(&config_path)?, "request_timeout_secs: 3\n");
        Ok(())
    }
}
