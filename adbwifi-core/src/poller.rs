//! Background connection-status polling
//!
//! A long-lived task periodically queries the connection state and hands
//! each result to a subscriber over a channel. The subscriber consumes
//! updates on its own task; the poller never runs subscriber code and
//! never mutates configuration.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

use adbwifi_utils::{AdbWifiError, Result};

use crate::config::ConfigHandle;
use crate::connection::ConnectionController;

/// Poller lifecycle; once stopped it cannot be restarted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollerState {
    Idle,
    Running,
    Stopped,
}

/// Periodically publishes the connection state to one subscriber
pub struct StatusPoller {
    /// Lifecycle state, shared with the poll task
    state: Arc<Mutex<PollerState>>,
    /// Handle to cancel the running poll task
    cancel_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl StatusPoller {
    /// Create a new, idle poller
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PollerState::Idle)),
            cancel_tx: Mutex::new(None),
        }
    }

    /// Begin polling at `interval`
    ///
    /// Each tick takes a fresh endpoint snapshot from `config`, queries
    /// the connection state, and sends the boolean to `subscriber`. Can
    /// only be called once; a stopped poller stays stopped.
    pub async fn start(
        &self,
        controller: Arc<ConnectionController>,
        config: ConfigHandle,
        subscriber: mpsc::Sender<bool>,
        interval: Duration,
    ) -> Result<()> {
        let mut state = self.state.lock().await;
        match *state {
            PollerState::Idle => {}
            PollerState::Running => {
                return Err(AdbWifiError::internal("status poller already running"));
            }
            PollerState::Stopped => {
                return Err(AdbWifiError::internal("status poller already stopped"));
            }
        }
        *state = PollerState::Running;
        drop(state);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        *self.cancel_tx.lock().await = Some(cancel_tx);

        tokio::spawn(status_poll_task(
            controller,
            config,
            subscriber,
            interval,
            cancel_rx,
            Arc::clone(&self.state),
        ));

        info!(
            interval_ms = interval.as_millis() as u64,
            "Status poller started"
        );
        Ok(())
    }

    /// Stop polling
    ///
    /// The poll task observes the request within one interval and
    /// performs no further queries or deliveries afterwards. Returns
    /// true if a loop was running.
    pub async fn stop(&self) -> bool {
        let mut state = self.state.lock().await;
        let was_running = *state == PollerState::Running;
        *state = PollerState::Stopped;
        drop(state);

        if let Some(tx) = self.cancel_tx.lock().await.take() {
            let _ = tx.send(());
        }

        if was_running {
            info!("Status poller stopped");
        }
        was_running
    }

    /// Check if the poll task is running
    pub async fn is_running(&self) -> bool {
        *self.state.lock().await == PollerState::Running
    }
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that queries the connection state at a fixed cadence
async fn status_poll_task(
    controller: Arc<ConnectionController>,
    config: ConfigHandle,
    subscriber: mpsc::Sender<bool>,
    interval: Duration,
    mut cancel_rx: oneshot::Receiver<()>,
    state: Arc<Mutex<PollerState>>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let endpoint = config.load().device.endpoint();
                match controller.is_connected(&endpoint).await {
                    Ok(connected) => {
                        if subscriber.send(connected).await.is_err() {
                            debug!("Status subscriber dropped, poll task exiting");
                            break;
                        }
                    }
                    Err(e) if e.is_tool_not_found() => {
                        // Never spin against a missing tool: report one
                        // final "off" and stop.
                        warn!(error = %e, "adb missing, status polling stops");
                        let _ = subscriber.send(false).await;
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Status query failed");
                    }
                }
            }

            _ = &mut cancel_rx => {
                debug!("Status poll task cancelled");
                break;
            }
        }
    }

    *state.lock().await = PollerState::Stopped;
}
