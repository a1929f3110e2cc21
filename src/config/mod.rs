//! Configuration management
//!
//! The only setting is where the commit log lives. It is resolved once at
//! startup and handed to the commands; nothing below `main` looks up a
//! default on its own.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "GIT_GLOBAL_LOG_DB";

/// Contents of the optional `config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Database location; a leading `~/` is expanded.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// SQLite file holding the commit log.
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the configuration.
    ///
    /// `cli_db_path` is the `--db-path` flag (or its environment variable)
    /// and wins over the config file, which wins over the default.
    pub fn resolve(cli_db_path: Option<PathBuf>) -> Result<Self> {
        let home = dirs::home_dir();
        let config_file = Self::config_path().ok();
        Self::resolve_from(cli_db_path, config_file.as_deref(), home.as_deref())
    }

    fn resolve_from(
        cli_db_path: Option<PathBuf>,
        config_file: Option<&Path>,
        home: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_db_path {
            return Ok(Self { db_path: path });
        }

        if let Some(file) = config_file {
            if let Some(path) = FileConfig::load(file)?.db_path {
                return Ok(Self {
                    db_path: expand_home(path, home),
                });
            }
        }

        let home = home.context("Could not find home directory")?;
        Ok(Self {
            db_path: default_db_path(home),
        })
    }

    /// Location of the optional YAML config file.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("git-global-log").join("config.yaml"))
    }
}

impl FileConfig {
    /// Load the config file, treating a missing file as empty.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_saphyr::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

/// Default database location under the user's home directory.
pub fn default_db_path(home: &Path) -> PathBuf {
    home.join(".local")
        .join("share")
        .join("git-commits")
        .join("log.sqlite")
}

fn expand_home(path: PathBuf, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path,
    }
}
