mod cli;

use std::process::ExitCode;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use warden_core::config::{Config, LogFormat};
use warden_core::config::load_dotenv;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    let args = CliArgs::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            // Logging isn't bootstrapped yet (it depends on the config
            // that just failed to load), so this goes straight to stderr.
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    let pool = match warden_store::connect(&config.database).await {
        Ok(pool) => pool,
        Err(err) => {
            error!(error = %err, "failed to connect to the store");
            return ExitCode::FAILURE;
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let result = match args.command {
        Command::Collect => warden_pipeline::Coordinator::start(pool, &config, shutdown_rx)
            .await
            .map_err(anyhow::Error::from),
        Command::Investigate => warden_investigate::start(pool, &config, shutdown_rx)
            .await
            .map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => {
            info!("shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "fatal error");
            ExitCode::FAILURE
        }
    }
}

/// Bootstraps the global `tracing` subscriber from the `logging:` config
/// section. `RUST_LOG` overrides `logging.level` when set, matching the
/// teacher's `EnvFilter::try_from_default_env()` fallback convention.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match config.logging.format {
        LogFormat::Compact => subscriber.compact().init(),
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Waits for SIGINT or SIGTERM (Unix) or Ctrl+C (cross-platform fallback),
/// the single shared shutdown signal a process reacts to (§5).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM");
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl_c");
    }
}
