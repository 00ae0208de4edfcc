//! Logging initialization for prelim.
//!
//! Wizard mode: logs to `<state>/logs/prelim-{datetime}.log`
//! Subcommands: logs to stderr

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file logs when dropped; keep it alive until exit.
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file (only set when logging to a file)
    pub log_file_path: Option<PathBuf>,
}

/// Name of the log file for a run started at `started`
pub fn log_file_name(started: DateTime<Utc>) -> String {
    format!("prelim-{}.log", started.format("%Y%m%dT%H%M%SZ"))
}

/// Whether logs should go to a file instead of stderr
pub fn logs_to_file(config: &Config, is_tui_mode: bool) -> bool {
    is_tui_mode && config.logging.to_file
}

fn level_filter(config: &Config, debug_override: bool) -> EnvFilter {
    let level = if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    EnvFilter::new(std::env::var("RUST_LOG").unwrap_or(level))
}

/// Initialize logging.
///
/// The terminal belongs to the wizard while it runs, so in TUI mode logs go
/// to a file unless `logging.to_file` is off. `RUST_LOG` overrides the
/// configured level; `debug_override` (from `--debug`) forces `debug`.
pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = level_filter(config, debug_override);

    if logs_to_file(config, is_tui_mode) {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

        let log_filename = log_file_name(Utc::now());
        let log_file_path = logs_dir.join(&log_filename);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(log_file_path),
        })
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}
