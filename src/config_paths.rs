//! Where keydispatch keeps its files
//!
//! ```text
//! <config dir>/
//!   config.yaml    dispatcher settings
//!   keymap.yaml    user keymap layered over the defaults
//!   logs/          daily rolling debug logs
//! ```
//!
//! The config dir is, in order of preference: `$KEYDISPATCH_CONFIG_DIR`,
//! `$XDG_CONFIG_HOME/keydispatch`, `~/.config/keydispatch` (Unix and macOS),
//! or `%APPDATA%\keydispatch` (Windows).

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "keydispatch";

/// Overrides the discovered config dir, mainly for tests and portable installs
pub const CONFIG_DIR_ENV: &str = "KEYDISPATCH_CONFIG_DIR";

/// File locations rooted at one config directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under an explicit directory
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Paths under the platform config directory
    pub fn discover() -> Option<Self> {
        if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Some(Self::at(dir));
        }
        platform_base().map(|base| Self::at(base.join(APP_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn settings(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn keymap(&self) -> PathBuf {
        self.root.join("keymap.yaml")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Create the logs directory if needed, returning it
    pub fn ensure_logs(&self) -> Result<PathBuf, String> {
        let logs = self.logs();
        fs::create_dir_all(&logs)
            .map_err(|e| format!("Failed to create directory {}: {}", logs.display(), e))?;
        Ok(logs)
    }
}

#[cfg(target_os = "windows")]
fn platform_base() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Option<PathBuf> {
    // dirs::config_dir() is ~/Library/Application Support on macOS; keep ~/.config
    env::var_os("XDG_CONFIG_HOME")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

pub fn config_dir() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.root)
}

/// `<config dir>/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.settings())
}

/// `<config dir>/keymap.yaml`
pub fn keymap_file() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.keymap())
}

/// `<config dir>/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.logs())
}

/// Ensure the logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    ConfigPaths::discover()
        .ok_or_else(|| "No config directory available".to_string())?
        .ensure_logs()
}
