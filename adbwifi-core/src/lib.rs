//! Connection lifecycle engine for adbwifi
//!
//! Drives the external `adb` tool to connect to an Android device over
//! Wi-Fi, confirms readiness with a bounded cancellable wait, and
//! publishes the live connection state to a subscriber.
//!
//! All operations launch subprocesses and are async; call them from a
//! background task, never from a context that must not block on I/O.

pub mod bridge;
pub mod config;
pub mod connection;
pub mod poller;
pub mod wait;

pub use bridge::{BridgeOutput, BridgeRunner, DeviceRecord, DeviceState};
pub use config::{config_handle, new_config_handle, AppConfig, ConfigHandle, ConfigWatcher, Endpoint};
pub use connection::ConnectionController;
pub use poller::StatusPoller;
pub use wait::{DeviceReadyWaiter, WaitOutcome};
