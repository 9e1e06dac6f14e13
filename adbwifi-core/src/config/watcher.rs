//! File watcher for configuration hot-reload

use std::path::PathBuf;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, FileIdMap};
use tokio::sync::mpsc;

use adbwifi_utils::{config_dir, AdbWifiError, Result};

use super::{AppConfig, ConfigHandle};

/// Watches the configuration file for changes
pub struct ConfigWatcher {
    /// Directory being watched
    config_dir: PathBuf,
    /// Channel receiver for events
    rx: mpsc::UnboundedReceiver<Result<Vec<Event>>>,
    /// Debouncer handle (kept alive)
    _debouncer: Debouncer<RecommendedWatcher, FileIdMap>,
}

impl ConfigWatcher {
    /// Create a new config watcher over the default config directory
    pub fn new() -> Result<Self> {
        let config_dir = config_dir();

        // Ensure directory exists
        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| AdbWifiError::FileWrite {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let (tx, rx) = mpsc::unbounded_channel();

        // Create debounced watcher
        let mut debouncer = new_debouncer(
            Duration::from_millis(100),
            None,
            move |result: DebounceEventResult| {
                let events = result
                    .map(|events| events.into_iter().map(|e| e.event).collect())
                    .map_err(|errs| AdbWifiError::config(format!("Watch error: {:?}", errs)));
                let _ = tx.send(events);
            },
        )
        .map_err(|e| AdbWifiError::config(format!("Failed to create watcher: {}", e)))?;

        // Watch the config directory
        debouncer
            .watcher()
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .map_err(|e| AdbWifiError::config(format!("Failed to watch: {}", e)))?;

        Ok(Self {
            config_dir,
            rx,
            _debouncer: debouncer,
        })
    }

    /// Run the watcher loop, updating config on changes
    pub async fn run(mut self, config: ConfigHandle) {
        tracing::info!("Config watcher started for {:?}", self.config_dir);

        while let Some(result) = self.rx.recv().await {
            match result {
                Ok(events) => {
                    if events.iter().any(Self::is_config_change) {
                        Self::handle_change(&config);
                    }
                }
                Err(e) => {
                    tracing::error!("Config watch error: {}", e);
                }
            }
        }
    }

    /// Check if an event is a config file change
    fn is_config_change(event: &Event) -> bool {
        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
            && event.paths.iter().any(|p| {
                p.file_name()
                    .map(|n| n == "config.toml")
                    .unwrap_or(false)
            })
    }

    /// Handle a configuration change
    fn handle_change(config: &ConfigHandle) {
        tracing::info!("Config file changed, reloading...");

        match AppConfig::load() {
            Ok(new_config) => {
                let old_config = config.load();

                if old_config.device.endpoint() != new_config.device.endpoint() {
                    tracing::info!(
                        endpoint = %new_config.device.endpoint().serial(),
                        "Target endpoint changed; applies from the next operation"
                    );
                }

                // Atomically swap config
                config.store(std::sync::Arc::new(new_config));
                tracing::info!("Configuration reloaded successfully");
            }
            Err(e) => {
                tracing::error!("Config reload failed (keeping previous): {}", e);
            }
        }
    }
}
