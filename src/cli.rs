//! Command-line argument parsing for the keydispatch tool
//!
//! Supports:
//! - Validating a keymap file and listing its rules
//! - Looking up the preferred binding for a command
//! - Replaying a scripted event sequence through the dispatcher

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect keymaps and replay input through the keybinding dispatcher
#[derive(Parser, Debug)]
#[command(name = "keydispatch", version, about = "Keybinding resolution and dispatch")]
pub struct CliArgs {
    /// Extra keymap layered on top of the defaults and user keymap
    #[arg(short = 'k', long, global = true, value_name = "FILE")]
    pub keymap: Option<PathBuf>,

    /// Skip the embedded default keymap
    #[arg(long, global = true)]
    pub no_defaults: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Validate a keymap file and list its rules
    Check {
        /// Keymap YAML to validate
        #[arg(value_name = "KEYMAP")]
        path: PathBuf,
    },
    /// Show the bindings for a command, preferred binding last
    Which {
        /// Command id, e.g. file.save
        #[arg(value_name = "COMMAND")]
        command: String,
    },
    /// Feed a YAML event script through a dispatcher and print each outcome
    Replay {
        #[arg(short, long, value_name = "FILE")]
        script: PathBuf,
    },
}

impl CliArgs {
    /// Whether the embedded default keymap should be loaded
    pub fn include_defaults(&self, settings_default: bool) -> bool {
        settings_default && !self.no_defaults
    }
}
