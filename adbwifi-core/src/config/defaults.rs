//! Default configuration values

/// Default configuration as TOML (for reference/documentation)
pub const DEFAULT_CONFIG_TOML: &str = r##"
# adbwifi configuration

[device]
# IP address and port the device listens on for Wi-Fi debugging.
address = ""
port = "5555"

[bridge]
# Explicit path to the adb executable. When unset, "adb" is resolved
# from the search path.
# adb = "/opt/android-sdk/platform-tools/adb"
connect_timeout_ms = 5000
status_timeout_ms = 10000

[poll]
status_interval_ms = 1000
ready_interval_ms = 300
"##;

/// Default device port for Wi-Fi debugging
pub(crate) const DEFAULT_PORT: &str = "5555";

/// Default budget for a device to become ready after connect
pub(crate) const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Default wall-clock bound for one `adb devices` query
pub(crate) const DEFAULT_STATUS_TIMEOUT_MS: u64 = 10_000;

/// Default cadence of the status poll loop
pub(crate) const DEFAULT_STATUS_INTERVAL_MS: u64 = 1000;

/// Default cadence of cancellation/timeout checks during a readiness wait
pub(crate) const DEFAULT_READY_INTERVAL_MS: u64 = 300;
