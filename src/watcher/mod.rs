//! Directory watching: registration, raw events and the reload filter.

mod error;
mod event;
mod filter;
mod registrar;

pub use error::WatchError;
pub use event::{overflow_error, Op, RawEvent, OVERFLOW_MESSAGE};
pub use filter::{
    base_name, extension, is_reload_worthy, EventFilter, QML_EXTENSION, QMLC_TEMP_FRAGMENT,
};
pub use registrar::{
    start_watch, ErrorReceiver, EventReceiver, Registrar, WatchHandle, WatchSet,
};
