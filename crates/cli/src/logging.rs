//! Logging setup
//!
//! Logs go to stderr so command output on stdout stays clean.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `imhotep=info`)
//! - `IMHOTEP_LOG_FORMAT`: `json` or `pretty` (default)
//! - `IMHOTEP_LOG_FILE`: also write JSON logs to this file

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "imhotep=info";
const LOG_FORMAT_ENV: &str = "IMHOTEP_LOG_FORMAT";
const LOG_FILE_ENV: &str = "IMHOTEP_LOG_FILE";

/// Keeps the file writer flushing until dropped
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init() -> Result<LogGuard> {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("Failed to create env filter")?;

    let console = match log_format.as_str() {
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        _ => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
    };

    let (file_layer, file_guard) = match std::env::var(LOG_FILE_ENV) {
        Ok(raw) if !raw.trim().is_empty() => {
            let path = PathBuf::from(shellexpand::tilde(&raw).into_owned());
            let name = path
                .file_name()
                .with_context(|| format!("{} must name a file: {}", LOG_FILE_ENV, raw))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file_layer);

    #[cfg(feature = "telemetry")]
    {
        registry
            .with(crate::telemetry::layer()?)
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    #[cfg(not(feature = "telemetry"))]
    {
        registry
            .try_init()
            .context("Failed to install tracing subscriber")?;
    }

    crate::telemetry::report_status();

    Ok(LogGuard { _file: file_guard })
}
