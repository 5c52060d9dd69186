//! Equipment Checkout command-line front-end

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use equipment_checkout::{config::LoggingConfig, AppConfig, AppState};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    let _log_guard = init_tracing(&config.logging);

    tracing::debug!("Starting equipment-checkout v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Using equipment API at {}", config.api.base_url);

    let state = AppState::from_config(config, Arc::new(output::TerminalNotifier))?;

    if let Err(e) = cli.execute(&state).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

/// Stderr logging plus an optional daily log file. The returned guard flushes
/// the file writer on exit.
fn init_tracing(config: &LoggingConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("equipment_checkout={}", config.level).into())
    };

    let stderr = if config.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    };

    let (file, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "equipment-checkout.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(filter())
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(stderr).with(file).init();
    guard
}
