//! Error types for adbwifi
//!
//! Provides a unified error type used across all adbwifi crates.
//!
//! Only environment and configuration failures live here. "The device did
//! not become ready" is an expected outcome, not an error, and is carried
//! by `WaitOutcome` in adbwifi-core.

use std::path::PathBuf;

/// Main error type for adbwifi operations
#[derive(Debug, thiserror::Error)]
pub enum AdbWifiError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Bridge Tool Errors ===

    #[error("adb executable not found: {program}")]
    ToolNotFound { program: String },

    #[error("Failed to spawn process: {0}")]
    ProcessSpawn(String),

    #[error("adb command timed out after {seconds}s")]
    ToolTimeout { seconds: u64 },

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration at {}: {message}", .path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdbWifiError {
    /// Create a tool-not-found error
    pub fn tool_not_found(program: impl Into<String>) -> Self {
        Self::ToolNotFound {
            program: program.into(),
        }
    }

    /// Create a process spawn error
    pub fn process_spawn(msg: impl Into<String>) -> Self {
        Self::ProcessSpawn(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error means the adb executable is missing
    ///
    /// Callers use this to tell an environment problem (stop polling,
    /// show a remediation hint) apart from a transient failure.
    pub fn is_tool_not_found(&self) -> bool {
        matches!(self, Self::ToolNotFound { .. })
    }
}

/// Result type alias using AdbWifiError
pub type Result<T> = std::result::Result<T, AdbWifiError>;
