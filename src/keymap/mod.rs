//! Binding model and resolver table
//!
//! This module provides the data side of keybinding dispatch:
//! - Keyboard, mouse-click and drag-selection bindings with canonical dispatch strings
//! - Two-part keyboard chords (`ctrl+k ctrl+s`)
//! - Context conditions (`when`) evaluated against host state
//! - Layered YAML keymaps with user overrides
//!
//! # Architecture
//!
//! ```text
//! input event → Binding::dispatch_string() → Resolver::resolve() → ResolveOutcome
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Embedded defaults, project keymap.yaml, then the user keymap
//! let resolver = load_resolver(true);
//!
//! // Or a single YAML file
//! let resolver = Resolver::with_rules(load_keymap_file(Path::new("keymap.yaml"))?);
//! ```

mod binding;
mod config;
mod context;
mod defaults;
mod resolved;
mod resolver;
mod rule;
mod types;
#[cfg(feature = "winit")]
mod winit_adapter;

pub use binding::{
    parse_key_string, Binding, KeyBinding, MouseBinding, SelectionBinding, MOUSE_PREFIX,
    SELECTION_PREFIX,
};
pub use config::{load_keymap_file, parse_keymap_yaml, KeymapError};
pub use context::{CompareOp, ContextLookup, ContextSnapshot, ContextValue, WhenExpr};
pub use defaults::{
    default_rules, get_default_keymap_yaml, load_default_keymap, load_resolver, merge_rules,
};
pub use resolved::ResolvedBinding;
pub use resolver::{CommandMatch, ResolveOutcome, Resolver};
pub use rule::{ResolveRule, RuleSource};
pub use types::{KeyCode, Modifiers, MouseButton};
#[cfg(feature = "winit")]
pub use winit_adapter::{
    key_binding_from_winit, key_event_from_winit, modifiers_from_winit, mouse_button_from_winit,
    physical_key_id,
};

#[cfg(test)]
mod tests;
