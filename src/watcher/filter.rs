//! Reload-worthiness filter for raw events.
//!
//! QML source edits are noise: the engine rewrites its compiled cache
//! (`*.qmlc`) right after, and that write is what triggers the reload.
//! The engine's temporary cache files (`*.qmlc.<suffix>`) are noise too.

use std::borrow::Cow;
use std::path::Path;

use super::event::RawEvent;
use crate::config::FilterConfig;

/// Extension of QML source files.
pub const QML_EXTENSION: &str = ".qml";

/// Fragment present in the names of temporary compiled-cache files.
pub const QMLC_TEMP_FRAGMENT: &str = ".qmlc.";

/// Final component of `path`, or an empty string if there is none.
#[must_use]
pub fn base_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map_or(Cow::Borrowed(""), |name| name.to_string_lossy())
}

/// Suffix of `name` starting at its last dot, or `""`.
///
/// Unlike [`Path::extension`], a dotfile such as `.qml` has extension `.qml`.
#[must_use]
pub fn extension(name: &str) -> &str {
    name.rfind('.').map_or("", |idx| &name[idx..])
}

/// Default decision: not `.qml`, not a `.qmlc.` temp file.
#[must_use]
pub fn is_reload_worthy(event: &RawEvent) -> bool {
    let name = base_name(event.path());
    extension(&name) != QML_EXTENSION && !name.contains(QMLC_TEMP_FRAGMENT)
}

/// Configurable event filter.
///
/// The operation kind is never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    ignored_extensions: Vec<String>,
    ignored_fragments: Vec<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            ignored_extensions: vec![QML_EXTENSION.to_string()],
            ignored_fragments: vec![QMLC_TEMP_FRAGMENT.to_string()],
        }
    }
}

impl EventFilter {
    #[must_use]
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            ignored_extensions: config.ignored_extensions.clone(),
            ignored_fragments: config.ignored_fragments.clone(),
        }
    }

    /// Returns `true` if `event` should trigger a reload.
    #[must_use]
    pub fn is_reload_worthy(&self, event: &RawEvent) -> bool {
        let name = base_name(event.path());
        let ext = extension(&name);

        if self.ignored_extensions.iter().any(|ignored| ignored == ext) {
            return false;
        }

        !self
            .ignored_fragments
            .iter()
            .any(|fragment| name.contains(fragment.as_str()))
    }
}
