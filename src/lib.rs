//! liveqml - Live QML viewer that reloads on filesystem changes.

pub mod app;
pub mod config;
pub mod display;
pub mod notifier;
pub mod reload;
pub mod view;
pub mod watcher;
