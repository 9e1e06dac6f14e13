//! Path utilities for adbwifi
//!
//! Handles XDG Base Directory specification compliance for config and
//! state directories.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "adbwifi";

/// Get project directories
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/adbwifi` or `~/.config/adbwifi`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| fallback_home_dir().join(".config").join(APP_NAME))
}

/// Get the main configuration file path
///
/// Location: `$XDG_CONFIG_HOME/adbwifi/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/adbwifi` or `~/.local/state/adbwifi`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| {
            fallback_home_dir()
                .join(".local")
                .join("state")
                .join(APP_NAME)
        })
}

/// Get the log directory
///
/// Location: `$XDG_STATE_HOME/adbwifi/log`
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// Last-resort base when no home directory can be determined
fn fallback_home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
