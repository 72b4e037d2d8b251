//! Engine settings persistence
//!
//! Stores user preferences in `~/.config/keydispatch/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::{ChordTiming, DEFAULT_CHORD_TICK, DEFAULT_CHORD_TIMEOUT};

/// Dispatcher settings that persist across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Time allowed between the two keys of a chord
    #[serde(default = "default_chord_timeout_ms")]
    pub chord_timeout_ms: u64,
    /// Interval of the chord liveness check
    #[serde(default = "default_chord_tick_ms")]
    pub chord_tick_ms: u64,
    /// Load the embedded default keymap before project and user keymaps
    #[serde(default = "default_keymap")]
    pub default_keymap: bool,
}

fn default_chord_timeout_ms() -> u64 {
    DEFAULT_CHORD_TIMEOUT.as_millis() as u64
}

fn default_chord_tick_ms() -> u64 {
    DEFAULT_CHORD_TICK.as_millis() as u64
}

fn default_keymap() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chord_timeout_ms: default_chord_timeout_ms(),
            chord_tick_ms: default_chord_tick_ms(),
            default_keymap: default_keymap(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        Self::load_from(&path)
    }

    /// Load settings from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Loaded config from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Chord timing for the dispatcher; a zero tick is raised to 1ms
    pub fn chord_timing(&self) -> ChordTiming {
        ChordTiming {
            timeout: Duration::from_millis(self.chord_timeout_ms),
            tick: Duration::from_millis(self.chord_tick_ms.max(1)),
        }
    }
}
