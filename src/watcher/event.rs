//! Raw filesystem events as delivered by the watch registrar.

use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;

/// Operation reported for a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl Op {
    /// Upper-case label used in event descriptors.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Write => "WRITE",
            Self::Remove => "REMOVE",
            Self::Rename => "RENAME",
            Self::Chmod => "CHMOD",
        }
    }

    /// Map a notify event kind to an operation.
    ///
    /// Access events (open, read, close) do not change anything on disk and
    /// yield `None`. A rename destination is reported as `Create`, the source
    /// as `Rename`. `RenameMode::Both` only summarizes a `From`/`To` pair that
    /// was already reported and yields `None`.
    #[must_use]
    pub fn from_kind(kind: EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) | EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => None,
            EventKind::Create(_) => Some(Self::Create),
            EventKind::Remove(_) => Some(Self::Remove),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(Self::Chmod),
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(Self::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(Self::Rename),
            EventKind::Modify(_) | EventKind::Any | EventKind::Other => Some(Self::Write),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub op: Op,
}

impl RawEvent {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Split a notify event into one `RawEvent` per affected path.
    #[must_use]
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let Some(op) = Op::from_kind(event.kind) else {
            return Vec::new();
        };

        event
            .paths
            .into_iter()
            .map(|path| Self { path, op })
            .collect()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Message of the error reported when the OS dropped events.
pub const OVERFLOW_MESSAGE: &str = "event queue overflow";

/// Error describing lost events, if `event` asks for a rescan.
///
/// An overflowing inotify queue arrives as a path-less `EventKind::Other`
/// carrying `Flag::Rescan`; it maps to no `RawEvent` at all.
#[must_use]
pub fn overflow_error(event: &notify::Event) -> Option<notify::Error> {
    event
        .need_rescan()
        .then(|| notify::Error::generic(OVERFLOW_MESSAGE))
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path.display().to_string(), self.op)
    }
}
