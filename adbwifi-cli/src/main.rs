//! adbwifi command-line interface
//!
//! Hosts the toggle/connect/disconnect commands and the status watch
//! loop on top of adbwifi-core. The core's operations all launch
//! subprocesses, so every command runs on the tokio runtime; the watch
//! loop only consumes channel hand-offs from the background poller.

use clap::{Parser, Subcommand};

use adbwifi_utils::{init_logging_with_config, AdbWifiError, LogConfig};

mod commands;

#[derive(Debug, Parser)]
#[command(
    name = "adbwifi",
    version,
    about = "Toggle and monitor a Wi-Fi adb connection to an Android device"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Connect if disconnected, disconnect if connected
    Toggle,
    /// Connect to the configured device and wait for it to become ready
    Connect,
    /// Request a disconnect (best effort)
    Disconnect,
    /// Print the current connection status
    Status {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Continuously print connection status transitions
    Watch {
        /// Poll interval in milliseconds (default from config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The watch loop owns the terminal; its logs go to a file
    let log_config = match cli.command {
        CliCommand::Watch { .. } => LogConfig::watch(),
        _ => LogConfig::cli(),
    };
    if let Err(e) = init_logging_with_config(log_config) {
        eprintln!("warning: {}", e);
    }

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            2
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> adbwifi_utils::Result<i32> {
    let config = adbwifi_core::AppConfig::load()?;

    match cli.command {
        CliCommand::Toggle => commands::toggle(&config).await,
        CliCommand::Connect => commands::connect(&config).await,
        CliCommand::Disconnect => commands::disconnect(&config),
        CliCommand::Status { json } => commands::status(&config, json).await,
        CliCommand::Watch { interval_ms } => commands::watch(config, interval_ms).await,
    }
}

/// Print an error with a remediation hint where one helps
fn report_error(err: &AdbWifiError) {
    eprintln!("error: {}", err);
    if err.is_tool_not_found() {
        eprintln!("Is the Android SDK installed? Is 'adb' on the search path?");
    }
}
