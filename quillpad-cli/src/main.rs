use anyhow::{Context, Result};
use clap::Parser;
use quillpad_core::config::Config;
use quillpad_core::listener::spawn_listener;
use quillpad_core::logging::{init_logging_with_config, LogConfig};
use quillpad_core::shutdown::{install_ctrl_c_handler, ShutdownCoordinator};
use quillpad_core::SessionController;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

mod app;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "quillpad")]
#[command(author, version, about = "Role-based blogging platform", long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long)]
    json_logs: bool,

    /// TOML configuration file (defaults plus QUILLPAD_* variables otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not start the background TCP listener
    #[arg(long)]
    no_listener: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env()?,
    };

    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    if args.no_listener {
        config.listener.enabled = false;
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;
    info!("Quillpad started");

    let coordinator = Arc::new(ShutdownCoordinator::new());
    install_ctrl_c_handler(coordinator.clone());
    let mut interrupted = coordinator.subscribe();

    let listener = config
        .listener
        .enabled
        .then(|| spawn_listener(config.listener.bind_address, coordinator.clone()));

    let session = Arc::new(SessionController::bootstrap(&config)?);
    let mut app = App::new(
        session.clone(),
        tokio::io::BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );

    let outcome = tokio::select! {
        result = app.run() => result,
        _ = interrupted.recv() => {
            info!("Interrupted");
            Ok(())
        }
    };

    // Runs on every exit path, including a failed terminal
    wind_down(&session, &coordinator, listener).await;
    outcome
}

/// Stop the session first, then the background components
async fn wind_down(
    session: &SessionController,
    coordinator: &ShutdownCoordinator,
    listener: Option<JoinHandle<()>>,
) {
    session.shutdown().await;
    // Ctrl-C has already triggered the coordinator
    if !coordinator.is_shutting_down().await {
        coordinator.shutdown().await;
    }
    if let Some(listener) = listener {
        let _ = listener.await;
    }
    coordinator.mark_complete().await;
}
