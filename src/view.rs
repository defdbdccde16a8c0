//! Console stand-in for the QML view.
//!
//! Re-reads its source on every reload and reports it on the terminal.

use std::io;
use std::path::{Path, PathBuf};

use tokio::runtime::{Handle, RuntimeFlavor};

use crate::display;
use crate::reload::ReloadTarget;

/// A view that "renders" its source by reading it.
#[derive(Debug)]
pub struct ConsoleView {
    title: String,
    source: PathBuf,
    reloads: usize,
    last_size: Option<usize>,
}

impl ConsoleView {
    /// Open a view titled `Live <source>` and load the source once.
    #[must_use]
    pub fn open(source: &Path) -> Self {
        let mut view = Self {
            title: format!("Live {}", source.display()),
            source: source.to_path_buf(),
            reloads: 0,
            last_size: None,
        };
        view.last_size = view.load();
        display::print_view_open(&view.title, &view.source);
        view
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn reloads(&self) -> usize {
        self.reloads
    }

    /// Size of the source at the last load, if it could be read.
    #[must_use]
    pub fn last_size(&self) -> Option<usize> {
        self.last_size
    }

    fn load(&self) -> Option<usize> {
        match read_source(&self.source) {
            Ok(len) => Some(len),
            Err(err) => {
                tracing::warn!(
                    source = %self.source.display(),
                    error = %err,
                    "Failed to read source"
                );
                None
            }
        }
    }
}

/// Read `path` and return its length.
///
/// Reloads run on the task that drives the view. On a multi-threaded runtime
/// the read is moved off the worker with `block_in_place`; elsewhere it runs
/// inline.
fn read_source(path: &Path) -> io::Result<usize> {
    let read = || std::fs::read(path).map(|bytes| bytes.len());
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

impl ReloadTarget for ConsoleView {
    fn reload(&mut self) {
        self.reloads += 1;
        self.last_size = self.load();
        tracing::info!(source = %self.source.display(), "Reloaded");
        display::print_reload(&self.source, self.last_size);
    }

    fn set_source(&mut self, path: &Path) {
        self.source = path.to_path_buf();
        self.last_size = self.load();
    }

    fn source(&self) -> &Path {
        &self.source
    }
}
