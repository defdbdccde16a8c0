//! Colored console output for the viewer.

use std::fmt::Display;
use std::path::Path;

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::notifier::NotifierStats;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Print the resolved watch root.
pub fn print_watch_root(root: &Path) {
    println!(
        "{} {} {}",
        timestamp().dimmed(),
        "[WATCH]".blue().bold(),
        root.display()
    );
}

/// Print the view title and its source file.
pub fn print_view_open(title: &str, source: &Path) {
    println!(
        "{} {} {} ({})",
        timestamp().dimmed(),
        "[VIEW]".cyan().bold(),
        title.bold(),
        source.display()
    );
}

/// Print a completed reload.
pub fn print_reload(source: &Path, bytes: Option<usize>) {
    let size = bytes.map_or_else(|| "unreadable".to_string(), |n| format!("{n} bytes"));
    println!(
        "{} {} {} {}",
        timestamp().dimmed(),
        "[RELOAD]".green().bold(),
        source.display(),
        size.dimmed()
    );
}

/// Print a fatal error.
pub fn print_error(err: &dyn Display) {
    eprintln!(
        "{} {} {}",
        timestamp().dimmed(),
        "[ERROR]".red().bold(),
        err
    );
}

/// Print loop counters on shutdown.
pub fn print_shutdown(stats: &NotifierStats) {
    println!(
        "{} {} dispatched={}, ignored={}, errors={}",
        timestamp().dimmed(),
        "[STOP]".yellow().bold(),
        stats.dispatched,
        stats.ignored,
        stats.errors
    );
}
