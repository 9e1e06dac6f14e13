//! Connection lifecycle operations against the adb tool
//!
//! Each operation takes an [`Endpoint`] snapshot at the call site; the
//! controller holds no per-device state and never caches a connection
//! answer between calls.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use adbwifi_utils::Result;

use crate::bridge::{parse_devices, BridgeRunner, DeviceState};
use crate::config::{AppConfig, Endpoint};
use crate::wait::{DeviceReadyWaiter, WaitOutcome, DEFAULT_READY_TIMEOUT};

/// Default wall-clock bound for one status query
pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Drives connect, disconnect, and status operations
#[derive(Debug, Clone)]
pub struct ConnectionController {
    runner: BridgeRunner,
    waiter: DeviceReadyWaiter,
    status_timeout: Duration,
}

impl ConnectionController {
    /// Create a controller with default bounds
    pub fn new(runner: BridgeRunner) -> Self {
        let waiter = DeviceReadyWaiter::new(runner.clone());
        Self {
            runner,
            waiter,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Create a controller wired from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let runner = BridgeRunner::new(config.bridge.program());
        let waiter =
            DeviceReadyWaiter::with_poll_interval(runner.clone(), config.poll.ready_interval());
        Self {
            runner,
            waiter,
            status_timeout: config.bridge.status_timeout(),
        }
    }

    /// True iff the endpoint appears in `adb devices` in the ready state
    ///
    /// Recomputed from a fresh device list on every call. Anomalies the
    /// parser tolerates never surface as errors here.
    pub async fn is_connected(&self, endpoint: &Endpoint) -> Result<bool> {
        let output = self
            .runner
            .run_with_timeout(&["devices"], self.status_timeout)
            .await?;

        let connected = parse_devices(&output.stdout).iter().any(|record| {
            record.address == endpoint.address
                && record.port == endpoint.port
                && record.state == DeviceState::Device
        });

        debug!(endpoint = %endpoint.serial(), connected, "Status query");
        Ok(connected)
    }

    /// Connect to the endpoint and wait for it to become ready
    ///
    /// Launch failure of the connect subcommand is an error; a device
    /// that never becomes ready is a [`WaitOutcome`], an expected
    /// recoverable result.
    pub async fn connect(
        &self,
        endpoint: &Endpoint,
        cancel: &CancellationToken,
        timeout: Option<Duration>,
    ) -> Result<WaitOutcome> {
        let serial = endpoint.serial();

        // The connect subcommand returns quickly whether or not the
        // device is reachable; readiness is confirmed separately.
        self.runner.spawn(&["connect", &serial])?;
        info!(endpoint = %serial, "Connect requested");

        let timeout = timeout.unwrap_or(DEFAULT_READY_TIMEOUT);
        let outcome = self.waiter.wait(&serial, cancel, timeout).await?;
        info!(endpoint = %serial, ?outcome, "Connect finished");
        Ok(outcome)
    }

    /// Request a disconnect, without waiting for or verifying the result
    ///
    /// Best-effort by design: the subcommand is spawned and left alone.
    /// Only a launch failure is reported.
    pub fn disconnect(&self, endpoint: &Endpoint) -> Result<()> {
        self.runner.spawn(&["disconnect"])?;
        info!(endpoint = %endpoint.serial(), "Disconnect requested");
        Ok(())
    }
}
