//! Notifier loop.
//!
//! Waits on the event channel, the error channel and a cancellation token.
//! Approved events are dispatched, filtered events dropped, errors logged.
//! Only cancellation ends the loop.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use super::{NotifierState, NotifierStats};
use crate::reload::Dispatcher;
use crate::watcher::{
    ErrorReceiver, EventFilter, EventReceiver, Op, RawEvent, Registrar, WatchHandle,
};

/// Drives reload dispatch from a running watch.
pub struct ReloadNotifier {
    events: EventReceiver,
    errors: ErrorReceiver,
    registrar: Option<Registrar>,
    filter: EventFilter,
    dispatcher: Dispatcher,
    track_new_dirs: bool,
    state: NotifierState,
    stats: NotifierStats,
}

impl ReloadNotifier {
    /// Create a notifier over bare channels, without a registrar.
    ///
    /// New directories cannot be registered in this mode.
    #[must_use]
    pub fn new(events: EventReceiver, errors: ErrorReceiver, dispatcher: Dispatcher) -> Self {
        Self {
            events,
            errors,
            registrar: None,
            filter: EventFilter::default(),
            dispatcher,
            track_new_dirs: false,
            state: NotifierState::Running,
            stats: NotifierStats::default(),
        }
    }

    /// Create a notifier that owns `watch` and closes it when stopped.
    #[must_use]
    pub fn from_watch(watch: WatchHandle, dispatcher: Dispatcher) -> Self {
        let (registrar, events, errors) = watch.into_parts();
        let mut notifier = Self::new(events, errors, dispatcher);
        notifier.registrar = Some(registrar);
        notifier
    }

    #[must_use]
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Register directories that appear after startup.
    #[must_use]
    pub fn with_new_dir_tracking(mut self, enabled: bool) -> Self {
        self.track_new_dirs = enabled;
        self
    }

    #[must_use]
    pub fn state(&self) -> NotifierState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> NotifierStats {
        self.stats
    }

    #[must_use]
    pub fn registrar(&self) -> Option<&Registrar> {
        self.registrar.as_ref()
    }

    /// Run until `cancel` fires, then release the watch.
    ///
    /// A closed channel only disables its branch; the loop keeps waiting for
    /// cancellation.
    pub async fn run(&mut self, cancel: CancellationToken) -> NotifierStats {
        let mut events_open = true;
        let mut errors_open = true;

        while self.state == NotifierState::Running {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    tracing::info!("Reload notifier cancelled");
                    self.stop();
                }
                event = self.events.recv(), if events_open => {
                    if let Some(event) = event {
                        self.handle_event(&event).await;
                    } else {
                        tracing::debug!("Event channel closed");
                        events_open = false;
                    }
                }
                error = self.errors.recv(), if errors_open => {
                    if let Some(error) = error {
                        self.handle_error(&error);
                    } else {
                        tracing::debug!("Error channel closed");
                        errors_open = false;
                    }
                }
            }
        }

        self.stats
    }

    async fn handle_event(&mut self, event: &RawEvent) {
        if self.track_new_dirs && event.op == Op::Create && self.registrar.is_some() {
            self.register_new_dir(&event.path).await;
        }

        if !self.filter.is_reload_worthy(event) {
            tracing::trace!(event = %event, "Ignoring event");
            self.stats.ignored += 1;
            return;
        }

        self.dispatcher.dispatch(event);
        self.stats.dispatched += 1;
    }

    async fn register_new_dir(&mut self, path: &Path) {
        let is_dir = tokio::fs::metadata(path)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return;
        }

        // The walk stays on the blocking pool; the registrar travels with it.
        let Some(mut registrar) = self.registrar.take() else {
            return;
        };
        let dir = path.to_path_buf();
        let walked = tokio::task::spawn_blocking(move || {
            let added = registrar.register_tree(&dir);
            (registrar, added)
        })
        .await;

        match walked {
            Ok((registrar, added)) => {
                self.registrar = Some(registrar);
                if added > 0 {
                    tracing::debug!(
                        path = %path.display(),
                        directories = added,
                        "Registered new directories"
                    );
                    self.stats.registered_dirs += added;
                }
            }
            Err(err) => {
                tracing::error!(
                    path = %path.display(),
                    error = %err,
                    "Directory registration task failed"
                );
            }
        }
    }

    fn handle_error(&mut self, error: &notify::Error) {
        tracing::error!(error = %error, "Watcher error");
        self.stats.errors += 1;
    }

    fn stop(&mut self) {
        if let Some(registrar) = self.registrar.as_mut() {
            registrar.close();
        }
        tracing::debug!(from = ?self.state, to = ?NotifierState::Stopped, "State transition");
        self.state = NotifierState::Stopped;
    }
}

impl std::fmt::Debug for ReloadNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadNotifier")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("track_new_dirs", &self.track_new_dirs)
            .field("registrar", &self.registrar)
            .finish_non_exhaustive()
    }
}
