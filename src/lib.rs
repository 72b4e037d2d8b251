//! Keydispatch - keybinding resolution and dispatch
//!
//! This crate turns normalized input events (key presses, mouse clicks and
//! press-drag gestures) into command invocations through a context-sensitive
//! rule table and a two-key chord state machine.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod dispatch;
pub mod keymap;
pub mod replay;
pub mod tracing;

// Re-export commonly used types
pub use config::Settings;
pub use dispatch::{CommandExecutor, Dispatched, Dispatcher, EngineEvent, InputEvent};
pub use keymap::{ContextSnapshot, ResolveRule, Resolver};
