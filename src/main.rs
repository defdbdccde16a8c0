//! liveqml - Live QML viewer that reloads on filesystem changes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liveqml::app::{App, AppConfig};
use liveqml::config::ConfigLoader;
use liveqml::display;
use liveqml::view::ConsoleView;

#[derive(Parser)]
#[command(
    name = "liveqml",
    about = "Run live QML viewer for specified path",
    version
)]
struct Cli {
    /// QML file to display. Its directory is watched recursively.
    path: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: .liveqml.toml, then the user config directory).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also watch directories created after startup.
    #[arg(long)]
    track_new_dirs: bool,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = match loader.load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load config");
            display::print_error(&err);
            return ExitCode::FAILURE;
        }
    };
    if cli.track_new_dirs {
        config.watch.track_new_dirs = true;
    }

    let app = match App::init(AppConfig {
        target: cli.path.clone(),
        config,
    }) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, "Failed to start watching");
            display::print_error(&err);
            return ExitCode::FAILURE;
        }
    };
    display::print_watch_root(app.watch_root());

    let mut view = ConsoleView::open(&cli.path);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                shutdown.cancel();
            }
            Err(err) => tracing::error!(error = %err, "Failed to listen for Ctrl-C"),
        }
    });

    match app.run(&mut view, cancel).await {
        Ok(stats) => {
            display::print_shutdown(&stats);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Viewer failed");
            display::print_error(&err);
            ExitCode::FAILURE
        }
    }
}
