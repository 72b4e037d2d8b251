//! Default rules and keymap layering
//!
//! These are the standard rules that ship with the engine. They are loaded from
//! the embedded keymap.yaml, falling back to a small hardcoded set.

use std::path::Path;

use super::binding::KeyBinding;
use super::config::parse_keymap_yaml;
use super::resolved::ResolvedBinding;
use super::resolver::Resolver;
use super::rule::{ResolveRule, RuleSource};
use super::types::{KeyCode, Modifiers};

/// Default keymap YAML embedded at compile time
const DEFAULT_KEYMAP_YAML: &str = include_str!("../../keymap.yaml");

/// Get the embedded default keymap YAML content
pub fn get_default_keymap_yaml() -> &'static str {
    DEFAULT_KEYMAP_YAML
}

/// Load and merge keymaps: defaults + user overrides
///
/// Loading order (each layer is registered after, and so wins over, the previous):
/// 1. Embedded default keymap (compiled into binary), unless `include_defaults` is false
/// 2. keymap.yaml in current directory (project-local overrides)
/// 3. User config at ~/.config/keydispatch/keymap.yaml
///
/// A layer file that fails to load is skipped with a warning. One whose content
/// is the embedded keymap is skipped when the defaults are already loaded.
pub fn load_default_keymap(include_defaults: bool) -> Vec<ResolveRule> {
    let mut rules = if include_defaults {
        match parse_keymap_yaml(DEFAULT_KEYMAP_YAML) {
            Ok(r) => {
                tracing::info!("Loaded embedded default keymap ({} rules)", r.len());
                r
            }
            Err(e) => {
                tracing::warn!("Failed to parse embedded keymap: {}, using hardcoded defaults", e);
                default_rules()
            }
        }
    } else {
        Vec::new()
    };

    if let Some(local_rules) = load_layer(Path::new("keymap.yaml"), "project", include_defaults) {
        rules = merge_rules(rules, local_rules);
    }

    if let Some(user_path) = crate::config_paths::keymap_file() {
        if let Some(user_rules) = load_layer(&user_path, "user", include_defaults) {
            rules = merge_rules(rules, user_rules);
        }
    }

    rules
}

/// Read one override layer; `None` when missing, unreadable, invalid, or a copy of
/// already-loaded defaults
fn load_layer(path: &Path, layer: &str, defaults_loaded: bool) -> Option<Vec<ResolveRule>> {
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read {} keymap from {}: {}", layer, path.display(), e);
            return None;
        }
    };
    if defaults_loaded && content == DEFAULT_KEYMAP_YAML {
        tracing::debug!(
            "Skipping {} keymap {}: same as embedded defaults",
            layer,
            path.display()
        );
        return None;
    }
    match parse_keymap_yaml(&content) {
        Ok(layer_rules) => {
            tracing::info!(
                "Merging {} keymap from {} ({} rules)",
                layer,
                path.display(),
                layer_rules.len()
            );
            Some(layer_rules)
        }
        Err(e) => {
            tracing::warn!("Failed to load {} keymap from {}: {}", layer, path.display(), e);
            None
        }
    }
}

/// Build a resolver from the layered keymaps
pub fn load_resolver(include_defaults: bool) -> Resolver {
    Resolver::with_rules(load_default_keymap(include_defaults))
}

/// Merge user rules after base rules
///
/// - A rule whose command is `-id` removes earlier rules bound to `id` with the
///   same pattern (and the same `when`, if it has one); it is not registered itself
/// - A rule with the same pattern and `when` as an earlier rule replaces it
/// - Everything is appended after the base rules, so user rules win lookups
pub fn merge_rules(base: Vec<ResolveRule>, user: Vec<ResolveRule>) -> Vec<ResolveRule> {
    let mut result = base;

    for user_rule in user {
        let user_rule = user_rule.from_source(RuleSource::User);

        if let Some(removed) = user_rule
            .command
            .as_deref()
            .and_then(|c| c.strip_prefix('-'))
        {
            let before = result.len();
            result.retain(|r| {
                let same_command = r.command.as_deref() == Some(removed);
                let same_when = user_rule.when.is_none() || r.when == user_rule.when;
                !(same_command && r.binding == user_rule.binding && same_when)
            });
            tracing::debug!(
                "Removed {} rule(s) for {} on {}",
                before - result.len(),
                removed,
                user_rule.binding
            );
            continue;
        }

        result.retain(|r| !(r.binding == user_rule.binding && r.when == user_rule.when));
        result.push(user_rule);
    }

    result
}

/// Helper to create a single-key rule
fn bind(key: KeyCode, mods: Modifiers, command: &str) -> ResolveRule {
    ResolveRule::new(KeyBinding::new(key, mods), command)
}

/// Hardcoded fallback rules for the current platform
///
/// Uses Cmd on macOS, Ctrl on Windows/Linux for the "command" modifier.
pub fn default_rules() -> Vec<ResolveRule> {
    let cmd = Modifiers::cmd();
    let cmd_shift = cmd | Modifiers::SHIFT;

    vec![
        // ====================================================================
        // File Operations
        // ====================================================================
        bind(KeyCode::Char('s'), cmd, "file.save"),
        bind(KeyCode::Char('s'), cmd_shift, "file.saveAs"),
        bind(KeyCode::Char('o'), cmd, "file.open"),
        ResolveRule::new(
            ResolvedBinding::chord(
                KeyBinding::new(KeyCode::Char('k'), cmd),
                KeyBinding::new(KeyCode::Char('s'), cmd),
            ),
            "file.saveAll",
        ),
        // ====================================================================
        // Clipboard
        // ====================================================================
        bind(KeyCode::Char('c'), cmd, "clipboard.copy"),
        bind(KeyCode::Char('x'), cmd, "clipboard.cut"),
        bind(KeyCode::Char('v'), cmd, "clipboard.paste"),
        // ====================================================================
        // Undo/Redo
        // ====================================================================
        bind(KeyCode::Char('z'), cmd, "edit.undo"),
        bind(KeyCode::Char('z'), cmd_shift, "edit.redo"),
    ]
}
