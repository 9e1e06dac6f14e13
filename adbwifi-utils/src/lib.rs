//! Common utilities for adbwifi
//!
//! Shared error type, logging setup, and filesystem paths used by the
//! core and CLI crates.

pub mod error;
pub mod logging;
pub mod paths;

pub use error::{AdbWifiError, Result};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};
pub use paths::{config_dir, config_file, log_dir};
