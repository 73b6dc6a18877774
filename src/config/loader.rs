//! Config file loading

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::config::{default_config_file, Config, FileConfig};

/// Load configuration from a TOML file over the defaults.
///
/// An explicitly provided path must exist and parse; an auto-discovered
/// `fpds-savings.toml` that fails to parse is logged and ignored so a
/// stray file never blocks a run.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();
    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_file().exists().then(|| default_config_file().to_path_buf()),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    match toml::from_str::<FileConfig>(&content) {
        Ok(file_config) => Ok(file_config.apply(Config::default())),
        Err(err) => {
            let err = anyhow::Error::new(err)
                .context(format!("Invalid config file: {}", config_file.display()));
            if explicit {
                return Err(err);
            }
            tracing::warn!("ignoring auto-discovered config: {err:#}");
            Ok(Config::default())
        }
    }
}
