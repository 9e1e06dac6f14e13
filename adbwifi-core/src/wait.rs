//! Bounded waiting for device readiness
//!
//! `adb wait-for-device` blocks until the target device is reachable and
//! authorized, and offers no timeout of its own. The waiter runs it as a
//! child process, records completion from a dedicated monitor task, and
//! polls cancellation and elapsed time at a fixed interval so the caller
//! always gets control back promptly.

use std::time::{Duration, Instant};

use tokio::process::Child;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use adbwifi_utils::Result;

use crate::bridge::BridgeRunner;

/// Default budget for a device to become ready
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default interval between cancellation/timeout checks
pub const DEFAULT_READY_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// Terminal result of one readiness wait
///
/// Exactly one condition is reported; "could not connect" outcomes are
/// ordinary values here, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The wait subcommand exited 0: the device is ready
    Ready,
    /// The wait subcommand exited nonzero
    ProcessFailed {
        /// Exit code reported by the subcommand
        exit_code: i32,
    },
    /// The budget elapsed before the subcommand returned
    TimedOut,
    /// The caller's cancellation signal fired
    Cancelled,
}

impl WaitOutcome {
    /// True iff the device became ready
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Supervises the blocking `wait-for-device` subcommand
#[derive(Debug, Clone)]
pub struct DeviceReadyWaiter {
    runner: BridgeRunner,
    poll_interval: Duration,
}

impl DeviceReadyWaiter {
    /// Create a waiter with the default poll interval
    pub fn new(runner: BridgeRunner) -> Self {
        Self::with_poll_interval(runner, DEFAULT_READY_POLL_INTERVAL)
    }

    /// Create a waiter with a custom poll interval
    pub fn with_poll_interval(runner: BridgeRunner, poll_interval: Duration) -> Self {
        Self {
            runner,
            poll_interval,
        }
    }

    /// Wait for `serial` to become ready, bounded by `timeout` and `cancel`
    ///
    /// Fails only when the wait subcommand cannot be launched; every other
    /// way the wait can end is a [`WaitOutcome`].
    pub async fn wait(
        &self,
        serial: &str,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> Result<WaitOutcome> {
        let child = self.runner.spawn(&["-s", serial, "wait-for-device"])?;
        info!(
            serial = %serial,
            timeout_ms = timeout.as_millis() as u64,
            "Waiting for device"
        );
        Ok(self.supervise(child, cancel, timeout).await)
    }

    /// Poll cancellation, completion, and elapsed time until one wins
    ///
    /// The monitor task owns the child and blocks solely on its exit. On
    /// timeout or cancellation the monitor is abandoned rather than
    /// awaited; the subprocess may be orphaned, but the caller regains
    /// control within one poll interval no matter what the subprocess
    /// does.
    async fn supervise(
        &self,
        mut child: Child,
        cancel: &CancellationToken,
        timeout: Duration,
    ) -> WaitOutcome {
        let (exit_tx, mut exit_rx) = oneshot::channel();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code().unwrap_or(-1),
                Err(e) => {
                    warn!(error = %e, "Readiness monitor failed");
                    -1
                }
            };
            let _ = exit_tx.send(code);
        });

        let start = Instant::now();
        loop {
            tokio::time::sleep(self.poll_interval).await;

            if cancel.is_cancelled() {
                debug!("Readiness wait cancelled");
                return WaitOutcome::Cancelled;
            }

            match exit_rx.try_recv() {
                Ok(0) => return WaitOutcome::Ready,
                Ok(exit_code) => return WaitOutcome::ProcessFailed { exit_code },
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    return WaitOutcome::ProcessFailed { exit_code: -1 };
                }
            }

            if start.elapsed() >= timeout {
                debug!("Readiness wait timed out");
                return WaitOutcome::TimedOut;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::process::Command;

    fn test_waiter() -> DeviceReadyWaiter {
        // Short interval keeps the tests fast; the runner is never
        // launched by supervise itself.
        DeviceReadyWaiter::with_poll_interval(
            BridgeRunner::new("adb"),
            Duration::from_millis(50),
        )
    }

    fn spawn_shell(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    }

    #[tokio::test]
    async fn test_exit_zero_within_timeout_is_ready() {
        let waiter = test_waiter();
        let child = spawn_shell("exit 0");

        let outcome = waiter
            .supervise(child, &CancellationToken::new(), Duration::from_secs(5))
            .await;

        assert_eq!(outcome, WaitOutcome::Ready);
        assert!(outcome.is_ready());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_process_failed() {
        let waiter = test_waiter();
        let child = spawn_shell("exit 7");

        let outcome = waiter
            .supervise(child, &CancellationToken::new(), Duration::from_secs(5))
            .await;

        assert_eq!(outcome, WaitOutcome::ProcessFailed { exit_code: 7 });
        assert!(!outcome.is_ready());
    }

    #[tokio::test]
    async fn test_never_exiting_process_times_out_within_bound() {
        let waiter = test_waiter();
        let child = spawn_shell("sleep 5");
        let start = Instant::now();

        let outcome = waiter
            .supervise(child, &CancellationToken::new(), Duration::from_millis(200))
            .await;

        assert_eq!(outcome, WaitOutcome::TimedOut);
        // Bounded by timeout plus one poll interval, with scheduling slack
        assert!(start.elapsed() < Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_cancellation_returns_within_one_interval() {
        let waiter = test_waiter();
        let child = spawn_shell("sleep 5");
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            canceller.cancel();
        });

        let start = Instant::now();
        let outcome = waiter
            .supervise(child, &cancel, Duration::from_secs(30))
            .await;

        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_cancellation_racing_completion_is_consistent() {
        let waiter = test_waiter();
        let child = spawn_shell("exit 0");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = waiter
            .supervise(child, &cancel, Duration::from_secs(5))
            .await;

        // Either resolution is acceptable; both are fully formed
        assert!(matches!(
            outcome,
            WaitOutcome::Cancelled | WaitOutcome::Ready
        ));
    }

    #[tokio::test]
    async fn test_wait_missing_tool_is_tool_not_found() {
        let waiter = DeviceReadyWaiter::new(BridgeRunner::new("adbwifi-no-such-tool"));

        let err = waiter
            .wait(
                "192.168.1.5:5555",
                &CancellationToken::new(),
                DEFAULT_READY_TIMEOUT,
            )
            .await
            .unwrap_err();

        assert!(err.is_tool_not_found());
    }
}
