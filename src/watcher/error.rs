//! Watch startup error types.

use std::path::PathBuf;

/// Errors that prevent a watch from starting.
///
/// Runtime failures of the OS facility are not represented here: they are
/// delivered as `notify::Error` on the watch's error channel.
#[derive(thiserror::Error, Debug)]
pub enum WatchError {
    /// The OS notification facility could not be created.
    #[error("Failed to create watcher: {0}")]
    Init(#[source] notify::Error),

    /// The watch root could not be resolved to an absolute path.
    #[error("Failed to get directory path {path}: {source}")]
    PathResolution {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The watch root is not an existing directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}
