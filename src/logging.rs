//! Tracing subscriber set-up.
//!
//! `RUST_LOG` takes precedence; otherwise `info`, or `debug` with `--verbose`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Log to stderr, for the non-interactive subcommands
pub fn init_stderr(verbose: bool) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

/// Append logs to `path`. Used by the dashboard, which owns the terminal.
pub fn init_file(path: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}
