//! Application lifecycle: `init`, `run`, teardown.
//!
//! `init` resolves the watch root and starts the watch. `run` moves the
//! notifier onto its own task and applies reload requests to the view on the
//! caller's task until cancelled. Teardown happens when `run` returns: the
//! notifier has closed the watch.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::LiveConfig;
use crate::notifier::{NotifierStats, ReloadNotifier};
use crate::reload::{reload_channel, Dispatcher, ReloadInbox, ReloadTarget};
use crate::watcher::{start_watch, EventFilter, WatchError};

/// Errors from the application lifecycle.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// The watch could not be started.
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// The notifier task panicked or was aborted.
    #[error("Notifier task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything needed to start the viewer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// File shown by the view. Its directory is watched.
    pub target: PathBuf,
    pub config: LiveConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            config: LiveConfig::default(),
        }
    }
}

/// Absolute directory containing `target`.
///
/// # Errors
///
/// Returns [`WatchError::PathResolution`] if the directory cannot be made
/// absolute and [`WatchError::NotADirectory`] if it does not exist.
pub fn resolve_watch_root(target: &Path) -> Result<PathBuf, WatchError> {
    let dir = target.parent().map_or(target, |parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    });

    let absolute = std::path::absolute(dir).map_err(|source| WatchError::PathResolution {
        path: dir.to_path_buf(),
        source,
    })?;

    if !absolute.is_dir() {
        return Err(WatchError::NotADirectory(absolute));
    }
    Ok(absolute)
}

/// A started viewer.
#[derive(Debug)]
pub struct App {
    target: PathBuf,
    watch_root: PathBuf,
    notifier: ReloadNotifier,
    inbox: ReloadInbox,
}

impl App {
    /// Resolve the watch root and start watching it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Watch`] if the root cannot be resolved or the
    /// watcher cannot be created.
    pub fn init(config: AppConfig) -> Result<Self, AppError> {
        let watch_root = resolve_watch_root(&config.target)?;
        let watch = start_watch(&watch_root)?;

        let (queue, inbox) = reload_channel();
        let notifier = ReloadNotifier::from_watch(watch, Dispatcher::new(queue))
            .with_filter(EventFilter::new(&config.config.filter))
            .with_new_dir_tracking(config.config.watch.track_new_dirs);

        tracing::info!(
            root = %watch_root.display(),
            target = %config.target.display(),
            track_new_dirs = config.config.watch.track_new_dirs,
            "Watching directory"
        );

        Ok(Self {
            target: config.target,
            watch_root,
            notifier,
            inbox,
        })
    }

    #[must_use]
    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Run until `cancel` fires, applying reloads to `target` on this task.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Join`] if the notifier task fails.
    pub async fn run<T: ReloadTarget + ?Sized>(
        self,
        target: &mut T,
        cancel: CancellationToken,
    ) -> Result<NotifierStats, AppError> {
        let Self {
            mut notifier,
            mut inbox,
            ..
        } = self;

        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            notifier.run(loop_cancel).await;
            notifier
        });

        let reloads = inbox.drive(target, cancel.clone()).await;

        // The inbox also returns if the notifier task dies; make sure it stops.
        cancel.cancel();
        let notifier = task.await?;

        let stats = notifier.stats();
        tracing::info!(
            reloads,
            dispatched = stats.dispatched,
            ignored = stats.ignored,
            errors = stats.errors,
            "Viewer stopped"
        );
        Ok(stats)
    }
}
