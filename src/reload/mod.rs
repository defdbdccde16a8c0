//! Reload requests from the watch loop to the view.
//!
//! The view owns its state on a single context. Other tasks never call into
//! it directly; they post [`ReloadSignal`]s on a [`ReloadQueue`] and the
//! owning context applies them from its [`ReloadInbox`].

mod dispatcher;
mod queue;

pub use dispatcher::Dispatcher;
pub use queue::{reload_channel, ReloadInbox, ReloadQueue, ReloadSignal};

use std::path::Path;

/// A view that can refresh itself from its source file.
pub trait ReloadTarget {
    /// Re-read the current source. Must be safe to call any number of times.
    fn reload(&mut self);

    /// Replace the source. Used at setup.
    fn set_source(&mut self, path: &Path);

    /// Current source file.
    fn source(&self) -> &Path;
}
