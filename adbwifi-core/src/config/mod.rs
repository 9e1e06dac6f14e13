//! Configuration management for adbwifi
//!
//! Provides hot-reloading configuration with lock-free snapshot access
//! using ArcSwap. Every operation loads one consistent snapshot at its
//! start and never re-reads mid-operation, so a concurrent edit can only
//! affect the next operation.

mod defaults;
mod watcher;

pub use defaults::DEFAULT_CONFIG_TOML;
pub use watcher::ConfigWatcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use adbwifi_utils::{config_file, AdbWifiError, Result};

/// Global configuration handle
pub type ConfigHandle = Arc<ArcSwap<AppConfig>>;

/// Create a new config handle holding the given configuration
pub fn config_handle(config: AppConfig) -> ConfigHandle {
    Arc::new(ArcSwap::from_pointee(config))
}

/// Create a new config handle with defaults
pub fn new_config_handle() -> ConfigHandle {
    config_handle(AppConfig::default())
}

/// Target device endpoint (address + port)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Device IP address
    pub address: String,
    /// Device TCP port
    pub port: String,
}

impl Endpoint {
    /// Create an endpoint from address and port
    pub fn new(address: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: port.into(),
        }
    }

    /// Render the `addr:port` serial adb uses to identify the device
    pub fn serial(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// True iff both fields are set
    pub fn is_complete(&self) -> bool {
        !self.address.is_empty() && !self.port.is_empty()
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target device
    pub device: DeviceConfig,
    /// adb executable and per-call bounds
    pub bridge: BridgeConfig,
    /// Polling cadences
    pub poll: PollConfig,
}

/// Target device section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Device IP address
    pub address: String,
    /// Device TCP port
    pub port: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: defaults::DEFAULT_PORT.into(),
        }
    }
}

impl DeviceConfig {
    /// Snapshot the configured endpoint
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.address.clone(), self.port.clone())
    }
}

/// adb executable section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Explicit path to adb; resolved from the search path when unset
    pub adb: Option<PathBuf>,
    /// Budget for a device to become ready after connect
    pub connect_timeout_ms: u64,
    /// Wall-clock bound for one status query
    pub status_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            adb: None,
            connect_timeout_ms: defaults::DEFAULT_CONNECT_TIMEOUT_MS,
            status_timeout_ms: defaults::DEFAULT_STATUS_TIMEOUT_MS,
        }
    }
}

impl BridgeConfig {
    /// Resolve the adb program to launch
    ///
    /// An unresolvable program is not an eager error: the bare name is
    /// returned and the runner reports `ToolNotFound` when a launch is
    /// actually attempted, so status queries degrade instead of refusing
    /// to start.
    pub fn program(&self) -> PathBuf {
        match &self.adb {
            Some(path) => path.clone(),
            None => which::which("adb").unwrap_or_else(|_| PathBuf::from("adb")),
        }
    }

    /// Readiness budget as a duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Status query bound as a duration
    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}

/// Polling cadence section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Interval between status queries
    pub status_interval_ms: u64,
    /// Interval between cancellation/timeout checks during a wait
    pub ready_interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            status_interval_ms: defaults::DEFAULT_STATUS_INTERVAL_MS,
            ready_interval_ms: defaults::DEFAULT_READY_INTERVAL_MS,
        }
    }
}

impl PollConfig {
    /// Status poll cadence as a duration
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    /// Readiness poll cadence as a duration
    pub fn ready_interval(&self) -> Duration {
        Duration::from_millis(self.ready_interval_ms)
    }
}

impl AppConfig {
    /// Load configuration from the default location
    ///
    /// A missing file yields the defaults; a present but invalid file is
    /// an error.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| AdbWifiError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&text).map_err(|e| AdbWifiError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate().map_err(|message| AdbWifiError::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        })?;

        Ok(config)
    }

    /// Check field constraints; returns the first violation
    fn validate(&self) -> std::result::Result<(), String> {
        if !self.device.port.is_empty() && self.device.port.parse::<u16>().is_err() {
            return Err(format!(
                "device.port must be a TCP port number, got {:?}",
                self.device.port
            ));
        }
        if self.bridge.connect_timeout_ms == 0 {
            return Err("bridge.connect_timeout_ms must be nonzero".into());
        }
        if self.bridge.status_timeout_ms == 0 {
            return Err("bridge.status_timeout_ms must be nonzero".into());
        }
        if self.poll.status_interval_ms == 0 {
            return Err("poll.status_interval_ms must be nonzero".into());
        }
        if self.poll.ready_interval_ms == 0 {
            return Err("poll.ready_interval_ms must be nonzero".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_endpoint_serial() {
        let endpoint = Endpoint::new("192.168.1.5", "5555");
        assert_eq!(endpoint.serial(), "192.168.1.5:5555");
    }

    #[test]
    fn test_endpoint_completeness() {
        assert!(Endpoint::new("192.168.1.5", "5555").is_complete());
        assert!(!Endpoint::new("", "5555").is_complete());
        assert!(!Endpoint::new("192.168.1.5", "").is_complete());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.device.address, "");
        assert_eq!(config.device.port, "5555");
        assert!(config.bridge.adb.is_none());
        assert_eq!(config.bridge.connect_timeout(), Duration::from_millis(5000));
        assert_eq!(config.poll.status_interval(), Duration::from_millis(1000));
        assert_eq!(config.poll.ready_interval(), Duration::from_millis(300));
    }

    #[test]
    fn test_default_toml_matches_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&tmp.path().join("config.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\naddress = \"192.168.1.5\"").unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();

        assert_eq!(config.device.address, "192.168.1.5");
        assert_eq!(config.device.port, "5555");
        assert_eq!(config.poll.status_interval_ms, 1000);
    }

    #[test]
    fn test_load_invalid_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, AdbWifiError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_load_non_numeric_port_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[device]\nport = \"tcp\"").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("device.port"));
    }

    #[test]
    fn test_load_zero_interval_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[poll]\nstatus_interval_ms = 0").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("status_interval_ms"));
    }

    #[test]
    fn test_explicit_adb_path_wins() {
        let config = BridgeConfig {
            adb: Some(PathBuf::from("/opt/sdk/platform-tools/adb")),
            ..BridgeConfig::default()
        };

        assert_eq!(
            config.program(),
            PathBuf::from("/opt/sdk/platform-tools/adb")
        );
    }

    #[test]
    fn test_handle_snapshot_reflects_store() {
        let handle = new_config_handle();
        assert_eq!(handle.load().device.endpoint(), Endpoint::new("", "5555"));

        let mut updated = AppConfig::default();
        updated.device.address = "10.0.0.9".into();
        handle.store(Arc::new(updated));

        assert_eq!(
            handle.load().device.endpoint(),
            Endpoint::new("10.0.0.9", "5555")
        );
    }
}
