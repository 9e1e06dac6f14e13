//! Logging infrastructure for adbwifi
//!
//! Provides unified logging setup using the tracing ecosystem.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::{paths, AdbWifiError, Result};

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr (one-shot commands)
    Stderr,
    /// Log to file (long-running watch loop, which owns the terminal)
    File,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g., "info", "adbwifi_core=debug")
    pub filter: String,
    /// Include file/line in logs
    pub file_line: bool,
    /// Optional custom log file name (defaults to "adbwifi.log")
    pub file_name: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            file_line: false,
            file_name: None,
        }
    }
}

impl LogConfig {
    /// Create config for one-shot CLI commands (stderr logging)
    pub fn cli() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: std::env::var("ADBWIFI_LOG").unwrap_or_else(|_| "warn".into()),
            file_line: false,
            file_name: None,
        }
    }

    /// Create config for the status watch loop (file logging, since the
    /// watch output owns the terminal)
    pub fn watch() -> Self {
        Self {
            output: LogOutput::File,
            filter: std::env::var("ADBWIFI_LOG").unwrap_or_else(|_| "info".into()),
            file_line: true,
            file_name: None,
        }
    }
}

/// Initialize logging with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| AdbWifiError::config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    let fmt_layer = if config.file_line {
        fmt_layer.with_file(true).with_line_number(true)
    } else {
        fmt_layer.with_file(false).with_line_number(false)
    };

    match config.output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| AdbWifiError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::File => {
            let log_dir = paths::log_dir();
            paths::ensure_dir(&log_dir).map_err(|e| AdbWifiError::FileWrite {
                path: log_dir.clone(),
                source: e,
            })?;

            let file_name = config.file_name.as_deref().unwrap_or("adbwifi.log");
            let log_path = log_dir.join(file_name);
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| AdbWifiError::FileWrite {
                    path: log_path,
                    source: e,
                })?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::sync::Arc::new(file)).with_ansi(false))
                .try_init()
                .map_err(|e| AdbWifiError::internal(format!("Failed to init logging: {}", e)))?;
        }
    }

    Ok(())
}
