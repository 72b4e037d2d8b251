//! Tracing infrastructure for dispatch diagnostics
//!
//! Provides structured logging with scoped filtering for debugging chord
//! transitions, rule resolution and keymap loading.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=keydispatch::dispatch=debug` - state machine transitions only
//! - `RUST_LOG=keydispatch::keymap=trace` - every resolver lookup
//!
//! # Log Files
//!
//! Logs are written to `~/.config/keydispatch/logs/keydispatch.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::dispatch::Dispatcher;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var for filtering and defaults to `warn`.
/// File logging writes to `~/.config/keydispatch/logs/keydispatch.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, "keydispatch.log");
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of dispatcher state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Prefix of the pending chord, if any
    pub chord: Option<String>,
    pub selection_active: bool,
}

impl DispatchSnapshot {
    pub fn from_dispatcher(dispatcher: &Dispatcher) -> Self {
        Self {
            chord: dispatcher.pending_chord().map(|s| s.prefix.clone()),
            selection_active: dispatcher.is_selection_active(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &DispatchSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.chord != other.chord {
            let describe = |c: &Option<String>| match c {
                Some(prefix) => format!("chord({})", prefix),
                None => "idle".to_string(),
            };
            changes.push(format!(
                "{} → {}",
                describe(&self.chord),
                describe(&other.chord)
            ));
        }
        if self.selection_active != other.selection_active {
            let status = if other.selection_active {
                "armed"
            } else {
                "cleared"
            };
            changes.push(format!("selection {}", status));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
