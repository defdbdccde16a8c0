//! Recursive directory registration with the OS notification facility.
//!
//! Every directory under the root is registered non-recursively; files are
//! reported through their parent directory. Directories created after the
//! walk are not registered unless [`Registrar::register_tree`] is called for
//! them.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use walkdir::WalkDir;

use super::error::WatchError;
use super::event::{overflow_error, Op, RawEvent};

/// Receiver for raw change events.
pub type EventReceiver = mpsc::UnboundedReceiver<RawEvent>;

/// Receiver for runtime failures of the OS facility.
pub type ErrorReceiver = mpsc::UnboundedReceiver<notify::Error>;

/// Directories currently registered.
pub type WatchSet = BTreeSet<PathBuf>;

/// Owns the OS watcher and the set of registered directories.
///
/// Dropping or closing the registrar releases every registration and closes
/// both delivery channels.
pub struct Registrar {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    watch_set: WatchSet,
}

impl Registrar {
    /// Register `dir` and every directory below it that is not yet watched.
    ///
    /// Failures on individual directories are logged and skipped. Returns the
    /// number of newly registered directories; zero once closed.
    pub fn register_tree(&mut self, dir: &Path) -> usize {
        let Some(watcher) = self.watcher.as_mut() else {
            return 0;
        };

        let mut added = 0;
        for entry in WalkDir::new(dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let path = entry.into_path();
            if self.watch_set.contains(&path) {
                continue;
            }

            match watcher.watch(&path, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::trace!(path = %path.display(), "Registered directory");
                    self.watch_set.insert(path);
                    added += 1;
                }
                Err(err) => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %err,
                        "Failed to register directory"
                    );
                }
            }
        }
        added
    }

    /// Release the OS watcher. Idempotent.
    pub fn close(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            drop(watcher);
            tracing::debug!(root = %self.root.display(), "Watch closed");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.watcher.is_none()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch_set
    }
}

impl Drop for Registrar {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("root", &self.root)
            .field("closed", &self.is_closed())
            .field("directories", &self.watch_set.len())
            .finish()
    }
}

/// A running watch: the registrar plus its two delivery channels.
#[derive(Debug)]
pub struct WatchHandle {
    registrar: Registrar,
    events: EventReceiver,
    errors: ErrorReceiver,
}

impl WatchHandle {
    /// Receiver for change events.
    pub fn events(&mut self) -> &mut EventReceiver {
        &mut self.events
    }

    /// Receiver for watcher errors.
    pub fn errors(&mut self) -> &mut ErrorReceiver {
        &mut self.errors
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.registrar.root()
    }

    #[must_use]
    pub fn watch_set(&self) -> &WatchSet {
        self.registrar.watch_set()
    }

    /// Release all registrations. Pending receives resolve to `None`.
    pub fn close(&mut self) {
        self.registrar.close();
    }

    /// Split into the registrar and the two receivers.
    #[must_use]
    pub fn into_parts(self) -> (Registrar, EventReceiver, ErrorReceiver) {
        (self.registrar, self.events, self.errors)
    }
}

/// Route one notify callback result onto the delivery channels.
///
/// A queue overflow is reported as an error, followed by a `Write` on `root`
/// so the view catches up on the changes that were lost.
fn forward(
    result: notify::Result<notify::Event>,
    root: &Path,
    event_tx: &mpsc::UnboundedSender<RawEvent>,
    error_tx: &mpsc::UnboundedSender<notify::Error>,
) {
    match result {
        Ok(event) => {
            if let Some(err) = overflow_error(&event) {
                let _ = error_tx.send(err);
                let _ = event_tx.send(RawEvent::new(root, Op::Write));
            }
            for raw in RawEvent::from_notify(event) {
                let _ = event_tx.send(raw);
            }
        }
        Err(err) => {
            let _ = error_tx.send(err);
        }
    }
}

/// Start watching `root` and every directory below it.
///
/// `root` must already be absolute; it is not resolved again.
///
/// # Errors
///
/// Returns [`WatchError::NotADirectory`] if `root` is not a directory and
/// [`WatchError::Init`] if the OS watcher cannot be created.
pub fn start_watch(root: &Path) -> Result<WatchHandle, WatchError> {
    if !root.is_dir() {
        return Err(WatchError::NotADirectory(root.to_path_buf()));
    }

    let (event_tx, events) = mpsc::unbounded_channel();
    let (error_tx, errors) = mpsc::unbounded_channel();

    let callback_root = root.to_path_buf();
    let watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
        forward(result, &callback_root, &event_tx, &error_tx);
    })
    .map_err(WatchError::Init)?;

    let mut registrar = Registrar {
        root: root.to_path_buf(),
        watcher: Some(watcher),
        watch_set: WatchSet::new(),
    };
    let registered = registrar.register_tree(root);
    tracing::info!(
        root = %root.display(),
        directories = registered,
        "Watch started"
    );

    Ok(WatchHandle {
        registrar,
        events,
        errors,
    })
}
