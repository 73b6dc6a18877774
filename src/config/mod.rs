//! Application configuration.
//!
//! Defaults, an optional TOML file, and CLI flags, with CLI > file >
//! defaults precedence. Currency formatting is an explicit value carried
//! in the config rather than process-global locale state, so it is
//! testable in isolation and safe to use from anywhere.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ingest::REGISTRY_FILE_NAME;

pub mod loader;

pub use loader::load_config;

/// How amounts are rendered in the report.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }
}

/// Resolved application settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Directory holding the `*.json` feed exports.
    pub data_directory: PathBuf,
    /// Persisted Parquet table.
    pub table_path: PathBuf,
    /// Processed-hash registry; defaults to a file inside `data_directory`.
    pub registry_path: Option<PathBuf>,
    /// Fetch from the live feed instead of reading files.
    pub use_live_data: bool,
    /// Date format for feed query ranges.
    pub date_format: String,
    pub currency: CurrencyFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_directory: PathBuf::from("data"),
            table_path: PathBuf::from("data/sanitized_contract_data.parquet"),
            registry_path: None,
            use_live_data: false,
            date_format: "%Y/%m/%d".to_string(),
            currency: CurrencyFormat::default(),
        }
    }
}

impl Config {
    /// Registry location, explicit or derived from the data directory.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| self.data_directory.join(REGISTRY_FILE_NAME))
    }
}

/// File-level settings; every field optional so partial files work.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub data_directory: Option<PathBuf>,
    pub table_path: Option<PathBuf>,
    pub registry_path: Option<PathBuf>,
    pub use_live_data: Option<bool>,
    pub date_format: Option<String>,
    pub currency: Option<CurrencyFormat>,
}

impl FileConfig {
    pub(crate) fn apply(self, mut config: Config) -> Config {
        if let Some(v) = self.data_directory {
            config.data_directory = v;
        }
        if let Some(v) = self.table_path {
            config.table_path = v;
        }
        if let Some(v) = self.registry_path {
            config.registry_path = Some(v);
        }
        if let Some(v) = self.use_live_data {
            config.use_live_data = v;
        }
        if let Some(v) = self.date_format {
            config.date_format = v;
        }
        if let Some(v) = self.currency {
            config.currency = v;
        }
        config
    }
}

/// Default config file name, discovered in the working directory.
pub fn default_config_file() -> &'static Path {
    Path::new("fpds-savings.toml")
}
