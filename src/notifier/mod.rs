//! Reload notifier loop tying the event filter to the dispatcher.

mod runner;
mod state;

pub use runner::*;
pub use state::*;
