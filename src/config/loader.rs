//! Lookup of the liveqml config file.
//!
//! The first file found wins; nothing is merged. A missing file means
//! defaults, an unreadable or malformed one is an error.

use std::path::{Path, PathBuf};

use super::LiveConfig;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".liveqml.toml";

/// Ordered list of candidate config files.
#[derive(Debug)]
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// `.liveqml.toml` in the working directory, then
    /// `<config_dir>/liveqml/config.toml` when the platform has one.
    #[must_use]
    pub fn new() -> Self {
        let user_file = dirs::config_dir().map(|dir| dir.join("liveqml").join("config.toml"));
        let search_paths = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(user_file)
            .collect();

        Self { search_paths }
    }

    /// Only look at `path` (the `--config` flag).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Read the first existing candidate, or fall back to [`LiveConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the chosen file cannot be read or is not
    /// valid TOML for [`LiveConfig`].
    pub fn load(&self) -> Result<LiveConfig, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No config file found, using default filter rules");
        Ok(LiveConfig::default())
    }

    fn load_from_path(path: &Path) -> Result<LiveConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure to use a config file that exists.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
