//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::watcher::{QML_EXTENSION, QMLC_TEMP_FRAGMENT};

/// Which events count as noise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Extensions (with leading dot, case-sensitive) whose changes never reload.
    pub ignored_extensions: Vec<String>,
    /// Base-name fragments whose changes never reload.
    pub ignored_fragments: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignored_extensions: vec![QML_EXTENSION.to_string()],
            ignored_fragments: vec![QMLC_TEMP_FRAGMENT.to_string()],
        }
    }
}

/// Watch registration options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Register directories created after the initial walk.
    pub track_new_dirs: bool,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub filter: FilterConfig,
    pub watch: WatchConfig,
}
