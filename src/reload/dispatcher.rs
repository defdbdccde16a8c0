//! Reload dispatcher.

use super::queue::ReloadQueue;
use crate::watcher::{base_name, extension, RawEvent};

/// Turns approved events into reload requests.
///
/// Dispatch never blocks and never retries: a reload that fails is the
/// view's concern.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    queue: ReloadQueue,
}

impl Dispatcher {
    #[must_use]
    pub fn new(queue: ReloadQueue) -> Self {
        Self { queue }
    }

    /// Log the triggering event and post one reload request.
    ///
    /// Returns `false` if the view has gone away.
    pub fn dispatch(&self, event: &RawEvent) -> bool {
        let name = base_name(event.path());
        tracing::info!(ext = extension(&name), event = %event, "Event");

        let posted = self.queue.post();
        if !posted {
            tracing::debug!(event = %event, "Reload target gone, request dropped");
        }
        posted
    }
}
