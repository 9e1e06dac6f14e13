//! Command execution for the adbwifi CLI
//!
//! Each command loads one configuration snapshot, builds a controller
//! from it, and reports the result on stdout. "Could not connect" is a
//! status message with exit code 1; only environment and configuration
//! problems become errors.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use adbwifi_core::{
    config_handle, AppConfig, ConfigWatcher, ConnectionController, Endpoint, StatusPoller,
    WaitOutcome,
};
use adbwifi_utils::{AdbWifiError, Result};

/// Exit code for "ran fine, device not connected or not ready"
const EXIT_NOT_CONNECTED: i32 = 1;

/// Snapshot the configured endpoint, requiring both fields to be set
fn require_endpoint(config: &AppConfig) -> Result<Endpoint> {
    let endpoint = config.device.endpoint();
    if !endpoint.is_complete() {
        return Err(AdbWifiError::config(
            "no target device configured; set [device] address and port in config.toml",
        ));
    }
    Ok(endpoint)
}

/// Connect if disconnected, disconnect if connected
pub async fn toggle(config: &AppConfig) -> Result<i32> {
    let endpoint = require_endpoint(config)?;
    let controller = ConnectionController::from_config(config);

    if controller.is_connected(&endpoint).await? {
        controller.disconnect(&endpoint)?;
        println!("disconnect requested");
        Ok(0)
    } else {
        connect_and_report(&controller, &endpoint, config).await
    }
}

/// Connect to the configured device and wait for readiness
pub async fn connect(config: &AppConfig) -> Result<i32> {
    let endpoint = require_endpoint(config)?;
    let controller = ConnectionController::from_config(config);
    connect_and_report(&controller, &endpoint, config).await
}

/// Run the connect flow with Ctrl-C wired to cancellation
async fn connect_and_report(
    controller: &ConnectionController,
    endpoint: &Endpoint,
    config: &AppConfig,
) -> Result<i32> {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let outcome = controller
        .connect(endpoint, &cancel, Some(config.bridge.connect_timeout()))
        .await?;

    match outcome {
        WaitOutcome::Ready => {
            println!("connected to {}", endpoint.serial());
            Ok(0)
        }
        WaitOutcome::Cancelled => {
            println!("connect cancelled");
            Ok(EXIT_NOT_CONNECTED)
        }
        WaitOutcome::TimedOut | WaitOutcome::ProcessFailed { .. } => {
            println!("unable to connect to {}", endpoint.serial());
            println!(
                "Is wireless debugging enabled on the device? \
                 Is the configured address and port correct?"
            );
            Ok(EXIT_NOT_CONNECTED)
        }
    }
}

/// Request a disconnect without waiting for the result
pub fn disconnect(config: &AppConfig) -> Result<i32> {
    let controller = ConnectionController::from_config(config);
    controller.disconnect(&config.device.endpoint())?;
    println!("disconnect requested");
    Ok(0)
}

/// Print the current connection status once
pub async fn status(config: &AppConfig, json: bool) -> Result<i32> {
    let endpoint = require_endpoint(config)?;
    let controller = ConnectionController::from_config(config);
    let connected = controller.is_connected(&endpoint).await?;

    if json {
        println!("{}", serde_json::json!({ "connected": connected }));
    } else {
        println!("{}", if connected { "connected" } else { "disconnected" });
    }

    Ok(if connected { 0 } else { EXIT_NOT_CONNECTED })
}

/// Continuously print status transitions until Ctrl-C
pub async fn watch(config: AppConfig, interval_ms: Option<u64>) -> Result<i32> {
    let endpoint = require_endpoint(&config)?;
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.poll.status_interval());

    let handle = config_handle(config);
    let controller = Arc::new(ConnectionController::from_config(&handle.load()));

    // Endpoint edits in config.toml apply from the next poll; the adb
    // path and bounds stay as sampled at startup.
    match ConfigWatcher::new() {
        Ok(watcher) => {
            tokio::spawn(watcher.run(Arc::clone(&handle)));
        }
        Err(e) => tracing::warn!(error = %e, "Config watcher unavailable"),
    }

    let (tx, mut rx) = mpsc::channel(8);
    let poller = Arc::new(StatusPoller::new());
    poller
        .start(controller, Arc::clone(&handle), tx, interval)
        .await?;

    println!("watching {} (Ctrl-C to stop)", endpoint.serial());

    let stopper = Arc::clone(&poller);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop().await;
        }
    });

    let mut last: Option<bool> = None;
    while let Some(connected) = rx.recv().await {
        if last != Some(connected) {
            println!("{}", if connected { "connected" } else { "disconnected" });
            last = Some(connected);
        }
    }

    // The channel closes when the poll loop ends: Ctrl-C, or the tool
    // went missing and the poller delivered its final "off".
    println!("watch stopped");
    Ok(0)
}
