//! Tracing subscriber setup
//!
//! Logs are written as JSON lines to [`crate::config::log_path`], or to stderr
//! when requested. `RUST_LOG` overrides the default `info` level.

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

/// Initialize the global subscriber
///
/// The returned guard flushes buffered lines on drop and must be kept alive
/// for as long as the program logs.
pub fn init(target: LogTarget<'_>) -> anyhow::Result<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (writer, guard) = match target {
        LogTarget::File(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log path {}", path.display()))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    let layer = fmt::layer()
        .json()
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}
