//! Reload queue between the notifier task and the view context.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::ReloadTarget;

/// Request to refresh the view's source. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal;

/// Create a connected queue/inbox pair.
#[must_use]
pub fn reload_channel() -> (ReloadQueue, ReloadInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReloadQueue { tx }, ReloadInbox { rx })
}

/// Sending half, held by the dispatcher.
#[derive(Debug, Clone)]
pub struct ReloadQueue {
    tx: mpsc::UnboundedSender<ReloadSignal>,
}

impl ReloadQueue {
    /// Post a reload request. Returns `false` if the inbox is gone.
    pub fn post(&self) -> bool {
        self.tx.send(ReloadSignal).is_ok()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the view context.
#[derive(Debug)]
pub struct ReloadInbox {
    rx: mpsc::UnboundedReceiver<ReloadSignal>,
}

impl ReloadInbox {
    /// Apply every pending signal without waiting. Returns how many were
    /// applied.
    ///
    /// Meant for frame-driven loops that poll once per iteration.
    pub fn drain<T: ReloadTarget + ?Sized>(&mut self, target: &mut T) -> usize {
        let mut applied = 0;
        while let Ok(ReloadSignal) = self.rx.try_recv() {
            target.reload();
            applied += 1;
        }
        applied
    }

    /// Apply signals as they arrive until `cancel` fires or every queue is
    /// dropped. Returns how many were applied.
    pub async fn drive<T: ReloadTarget + ?Sized>(
        &mut self,
        target: &mut T,
        cancel: CancellationToken,
    ) -> usize {
        let mut applied = 0;
        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => break,
                signal = self.rx.recv() => {
                    let Some(ReloadSignal) = signal else {
                        break;
                    };
                    target.reload();
                    applied += 1;
                }
            }
        }
        applied
    }
}
