//! Integration tests for the reload notifier loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use liveqml::config::FilterConfig;
use liveqml::notifier::{NotifierState, NotifierStats, ReloadNotifier};
use liveqml::reload::{reload_channel, Dispatcher, ReloadInbox, ReloadTarget};
use liveqml::watcher::{EventFilter, Op, RawEvent, OVERFLOW_MESSAGE};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::watcher::{start_or_skip, DELIVERY_TIMEOUT, QUIET_PERIOD};

#[derive(Default)]
struct RecordingTarget {
    source: PathBuf,
    reloads: usize,
}

impl ReloadTarget for RecordingTarget {
    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn set_source(&mut self, path: &Path) {
        self.source = path.to_path_buf();
    }

    fn source(&self) -> &Path {
        &self.source
    }
}

struct Harness {
    events: mpsc::UnboundedSender<RawEvent>,
    errors: mpsc::UnboundedSender<notify::Error>,
    inbox: ReloadInbox,
    cancel: CancellationToken,
    task: JoinHandle<ReloadNotifier>,
}

impl Harness {
    fn spawn() -> Self {
        Self::spawn_with(|notifier| notifier)
    }

    fn spawn_with(configure: impl FnOnce(ReloadNotifier) -> ReloadNotifier) -> Self {
        let (events, event_rx) = mpsc::unbounded_channel();
        let (errors, error_rx) = mpsc::unbounded_channel();
        let (queue, inbox) = reload_channel();
        let mut notifier = configure(ReloadNotifier::new(
            event_rx,
            error_rx,
            Dispatcher::new(queue),
        ));

        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            notifier.run(loop_cancel).await;
            notifier
        });

        Self {
            events,
            errors,
            inbox,
            cancel,
            task,
        }
    }

    fn send(&self, path: &str, op: Op) {
        self.events.send(RawEvent::new(path, op)).unwrap();
    }

    async fn stop(self) -> (ReloadNotifier, ReloadInbox) {
        // Let the loop drain what was sent before cancelling.
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.cancel.cancel();
        let notifier = tokio::time::timeout(DELIVERY_TIMEOUT, self.task)
            .await
            .expect("notifier did not stop after cancel")
            .unwrap();
        (notifier, self.inbox)
    }
}

#[tokio::test]
async fn qml_source_write_dispatches_nothing() {
    let harness = Harness::spawn();
    harness.send("/tmp/proj/app.qml", Op::Write);

    let (notifier, mut inbox) = harness.stop().await;
    let mut target = RecordingTarget::default();

    assert_eq!(inbox.drain(&mut target), 0);
    assert_eq!(notifier.stats().dispatched, 0);
    assert_eq!(notifier.stats().ignored, 1);
}

#[tokio::test]
async fn compiled_cache_write_dispatches_exactly_once() {
    let harness = Harness::spawn();
    // The engine writes a temp file, then renames it over the cache file.
    harness.send("/tmp/proj/app.qmlc.12345", Op::Create);
    harness.send("/tmp/proj/app.qmlc.12345", Op::Write);
    harness.send("/tmp/proj/app.qmlc.12345", Op::Rename);
    harness.send("/tmp/proj/app.qmlc", Op::Create);

    let (notifier, mut inbox) = harness.stop().await;
    let mut target = RecordingTarget::default();

    assert_eq!(inbox.drain(&mut target), 1);
    assert_eq!(
        notifier.stats(),
        NotifierStats {
            dispatched: 1,
            ignored: 3,
            errors: 0,
            registered_dirs: 0,
        }
    );
}

#[tokio::test]
async fn errors_never_stop_the_loop() {
    let harness = Harness::spawn();
    for i in 0..5 {
        harness
            .errors
            .send(notify::Error::generic(&format!("synthetic failure {i}")))
            .unwrap();
    }
    harness.send("/tmp/proj/main.js", Op::Write);

    let (notifier, mut inbox) = harness.stop().await;
    let mut target = RecordingTarget::default();

    assert_eq!(inbox.drain(&mut target), 1);
    assert_eq!(notifier.stats().errors, 5);
    assert_eq!(notifier.stats().dispatched, 1);
}

#[tokio::test]
async fn queue_overflow_is_counted_and_reloads_once() {
    let harness = Harness::spawn();
    // What the registrar forwards when the OS queue overflows.
    harness
        .errors
        .send(notify::Error::generic(OVERFLOW_MESSAGE))
        .unwrap();
    harness.send("/tmp/proj", Op::Write);

    let (notifier, mut inbox) = harness.stop().await;
    let mut target = RecordingTarget::default();

    assert_eq!(inbox.drain(&mut target), 1);
    assert_eq!(notifier.stats().errors, 1);
    assert_eq!(notifier.stats().dispatched, 1);
    assert_eq!(notifier.state(), NotifierState::Stopped);
}

#[tokio::test]
async fn events_processed_in_order() {
    let harness = Harness::spawn();
    for path in ["/p/a.js", "/p/b.qml", "/p/c.png", "/p/d.qmlc.1", "/p/e.qmlc"] {
        harness.send(path, Op::Write);
    }

    let (notifier, _inbox) = harness.stop().await;
    assert_eq!(notifier.stats().dispatched, 3);
    assert_eq!(notifier.stats().ignored, 2);
    assert_eq!(notifier.stats().events(), 5);
}

#[tokio::test]
async fn closed_channels_do_not_end_the_loop() {
    let harness = Harness::spawn();
    let Harness {
        events,
        errors,
        inbox: _inbox,
        cancel,
        mut task,
    } = harness;
    drop(events);
    drop(errors);

    let still_running = tokio::time::timeout(QUIET_PERIOD, &mut task).await;
    assert!(still_running.is_err(), "loop exited without cancellation");

    cancel.cancel();
    let notifier = tokio::time::timeout(DELIVERY_TIMEOUT, task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notifier.state(), NotifierState::Stopped);
}

#[tokio::test]
async fn cancel_moves_to_stopped() {
    let harness = Harness::spawn();
    let (notifier, _inbox) = harness.stop().await;
    assert_eq!(notifier.state(), NotifierState::Stopped);
    assert_eq!(notifier.stats(), NotifierStats::default());
}

#[tokio::test]
async fn configured_filter_is_applied() {
    let filter = EventFilter::new(&FilterConfig {
        ignored_extensions: vec![".swp".to_string()],
        ignored_fragments: Vec::new(),
    });
    let harness = Harness::spawn_with(|notifier| notifier.with_filter(filter));
    harness.send("/p/app.qml", Op::Write);
    harness.send("/p/.app.qml.swp", Op::Write);

    let (notifier, _inbox) = harness.stop().await;
    assert_eq!(notifier.stats().dispatched, 1);
    assert_eq!(notifier.stats().ignored, 1);
}

#[tokio::test]
async fn rapid_reloads_leave_target_consistent() {
    let harness = Harness::spawn();
    harness.send("/p/app.qmlc", Op::Write);
    harness.send("/p/app.qmlc", Op::Write);

    let (_notifier, mut inbox) = harness.stop().await;
    let mut target = RecordingTarget::default();
    target.set_source(Path::new("/p/app.qml"));

    assert_eq!(inbox.drain(&mut target), 2);
    assert_eq!(target.reloads, 2);
    assert_eq!(target.source(), Path::new("/p/app.qml"));
}

async fn run_on_real_watch(track_new_dirs: bool) -> usize {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let Some(handle) = start_or_skip(&root) else {
        return usize::MAX;
    };

    let (queue, mut inbox) = reload_channel();
    let mut notifier = ReloadNotifier::from_watch(handle, Dispatcher::new(queue))
        .with_new_dir_tracking(track_new_dirs);
    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let task = tokio::spawn(async move {
        notifier.run(loop_cancel).await;
        notifier
    });

    let late = root.join("late");
    std::fs::create_dir(&late).unwrap();
    tokio::time::sleep(QUIET_PERIOD).await;
    let mut target = RecordingTarget::default();
    inbox.drain(&mut target);

    std::fs::write(late.join("main.js"), "var x = 1;").unwrap();
    tokio::time::sleep(QUIET_PERIOD).await;
    let after_write = inbox.drain(&mut target);

    cancel.cancel();
    let notifier = task.await.unwrap();
    assert_eq!(notifier.state(), NotifierState::Stopped);
    assert!(notifier.registrar().is_some_and(|r| r.is_closed()));
    after_write
}

#[tokio::test]
async fn late_directory_ignored_by_default() {
    let reloads = run_on_real_watch(false).await;
    if reloads != usize::MAX {
        assert_eq!(reloads, 0);
    }
}

#[tokio::test]
async fn late_directory_tracked_when_enabled() {
    let reloads = run_on_real_watch(true).await;
    if reloads != usize::MAX {
        assert!(reloads >= 1);
    }
}
