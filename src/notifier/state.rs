//! Notifier state and counters.

/// Lifecycle of the notifier loop.
///
/// There is no transition back to `Running`: a stopped notifier has released
/// its watch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotifierState {
    #[default]
    Running,
    Stopped,
}

/// Counters collected while the loop runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifierStats {
    /// Events that passed the filter and were dispatched.
    pub dispatched: usize,
    /// Events discarded by the filter.
    pub ignored: usize,
    /// Watcher errors reported.
    pub errors: usize,
    /// Directories registered after startup.
    pub registered_dirs: usize,
}

impl NotifierStats {
    #[must_use]
    pub fn events(&self) -> usize {
        self.dispatched.saturating_add(self.ignored)
    }
}
