//! Launcher for adb subprocesses
//!
//! Distinguishes "the executable is missing" from a normal nonzero exit:
//! the former is an environment error the user has to fix, the latter is
//! ordinary data for the caller to interpret. No retries happen here.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use adbwifi_utils::{AdbWifiError, Result};

/// Captured result of one completed adb invocation
#[derive(Debug, Clone)]
pub struct BridgeOutput {
    /// Full stdout text, drained before the call returns
    pub stdout: String,
    /// Process exit code (-1 if terminated by a signal)
    pub exit_code: i32,
}

impl BridgeOutput {
    /// True iff the process exited 0
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches the adb executable with argument lists
#[derive(Debug, Clone)]
pub struct BridgeRunner {
    /// Path or bare name of the adb executable
    program: PathBuf,
}

impl BridgeRunner {
    /// Create a runner for the given adb executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this runner launches
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run an adb subcommand to completion and capture its output
    ///
    /// Stdout is fully drained before this returns; stderr is discarded.
    /// A nonzero exit code is reported in the output, not as an error.
    pub async fn run(&self, args: &[&str]) -> Result<BridgeOutput> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.launch_error(e))?;

        Ok(BridgeOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Run an adb subcommand with a wall-clock bound
    ///
    /// When the bound elapses the in-flight invocation is dropped and
    /// `ToolTimeout` is returned.
    pub async fn run_with_timeout(&self, args: &[&str], timeout: Duration) -> Result<BridgeOutput> {
        tokio::time::timeout(timeout, self.run(args))
            .await
            .map_err(|_| AdbWifiError::ToolTimeout {
                seconds: timeout.as_secs(),
            })?
    }

    /// Launch an adb subcommand without waiting for it
    ///
    /// Used for fire-and-forget invocations and for the readiness wait,
    /// which supervises the child itself.
    pub fn spawn(&self, args: &[&str]) -> Result<Child> {
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.launch_error(e))
    }

    /// Map a launch failure to the error taxonomy
    fn launch_error(&self, err: std::io::Error) -> AdbWifiError {
        if err.kind() == std::io::ErrorKind::NotFound {
            AdbWifiError::tool_not_found(self.program.display().to_string())
        } else {
            AdbWifiError::process_spawn(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout_and_exit_code() {
        let runner = BridgeRunner::new("echo");
        let output = runner.run(&["hello"]).await.unwrap();

        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.exit_code, 0);
        assert!(output.success());
    }

    #[tokio::test]
    async fn test_run_nonzero_exit_is_not_an_error() {
        let runner = BridgeRunner::new("sh");
        let output = runner.run(&["-c", "exit 3"]).await.unwrap();

        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_run_missing_executable_is_tool_not_found() {
        let runner = BridgeRunner::new("adbwifi-no-such-tool");
        let err = runner.run(&["devices"]).await.unwrap_err();

        assert!(err.is_tool_not_found());
        assert!(err.to_string().contains("adbwifi-no-such-tool"));
    }

    #[tokio::test]
    async fn test_run_with_timeout_within_bound() {
        let runner = BridgeRunner::new("echo");
        let output = runner
            .run_with_timeout(&["ok"], Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(output.stdout, "ok\n");
    }

    #[tokio::test]
    async fn test_run_with_timeout_elapses() {
        let runner = BridgeRunner::new("sleep");
        let err = runner
            .run_with_timeout(&["5"], Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, AdbWifiError::ToolTimeout { .. }));
    }

    #[tokio::test]
    async fn test_spawn_missing_executable_is_tool_not_found() {
        let runner = BridgeRunner::new("adbwifi-no-such-tool");
        let err = runner.spawn(&["disconnect"]).unwrap_err();

        assert!(err.is_tool_not_found());
    }

    #[tokio::test]
    async fn test_spawn_returns_running_child() {
        let runner = BridgeRunner::new("true");
        let mut child = runner.spawn(&[]).unwrap();

        let status = child.wait().await.unwrap();
        assert!(status.success());
    }
}
