//! Storefront CLI - A terminal client for the storefront backend.
//!
//! Customers browse the catalog, manage their cart and place orders; admins
//! see sales figures and manage products, orders and users. The session is
//! kept in the OS keychain between runs and refreshed automatically.

mod cli;
mod commands;
mod output;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use storefront_core::{ApiError, Config};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Args;

/// Directory for daily log files, in addition to stderr
const LOG_DIR_ENV: &str = "STOREFRONT_LOG_DIR";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file on drop and must live until exit.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "storefront.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _guard = init_tracing();
    info!("Storefront CLI starting");

    let mut config = Config::load().context("Failed to load configuration")?;

    let result = commands::run(args, &mut config).await;
    if let Err(ref e) = result {
        if e.chain().any(|cause| {
            cause
                .downcast_ref::<ApiError>()
                .map(ApiError::is_session_ending)
                .unwrap_or(false)
        }) {
            eprintln!("Your session has ended. Run `storefront login` to sign in again.");
        }
    }
    result
}
