//! YAML configuration parsing for keymaps
//!
//! Parses keymap.yaml files into ResolveRule values.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::binding::MouseBinding;
use super::context::WhenExpr;
use super::resolved::ResolvedBinding;
use super::rule::ResolveRule;

/// Root structure of a keymap YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapConfig {
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub key: String,
    /// Missing or null marks the binding as removed
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub when: Option<WhenConfig>,
    #[serde(default)]
    pub args: Option<Value>,
    #[serde(default)]
    pub bubble: bool,
    /// Continue as a chord when the key also starts chord bindings
    #[serde(default)]
    pub chord: bool,
    /// Click count for `mouse` bindings
    #[serde(default)]
    pub times: Option<u8>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// `when` accepts a single expression or a list that must all hold
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WhenConfig {
    One(String),
    All(Vec<String>),
}

/// Load keymap rules from a YAML file
pub fn load_keymap_file(path: &Path) -> Result<Vec<ResolveRule>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymap_yaml(&content)
}

/// Parse keymap rules from YAML string
pub fn parse_keymap_yaml(yaml: &str) -> Result<Vec<ResolveRule>, KeymapError> {
    let config: KeymapConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let current_platform = get_current_platform();
    let mut rules = Vec::new();

    for entry in config.bindings {
        // Skip if platform-specific and doesn't match current platform
        if let Some(ref platform) = entry.platform {
            if platform != current_platform {
                continue;
            }
        }

        rules.push(parse_entry(entry)?);
    }

    Ok(rules)
}

fn parse_entry(entry: BindingConfig) -> Result<ResolveRule, KeymapError> {
    let binding = apply_times(ResolvedBinding::parse(&entry.key)?, entry.times, &entry.key)?;

    let mut rule = match entry.command {
        Some(command) if !command.trim().is_empty() => ResolveRule::new(binding, command.trim()),
        _ => ResolveRule::removal(binding),
    };

    if let Some(when) = entry.when {
        let expr = match when {
            WhenConfig::One(expr) => WhenExpr::parse(&expr)?,
            WhenConfig::All(exprs) => WhenExpr::parse_all(&exprs)?,
        };
        rule = rule.when(expr);
    }
    if let Some(args) = entry.args {
        rule = rule.with_args(args);
    }

    Ok(rule.bubble(entry.bubble).continue_as_chord(entry.chord))
}

/// Fold a separate `times` field into a mouse pattern
fn apply_times(
    binding: ResolvedBinding,
    times: Option<u8>,
    key: &str,
) -> Result<ResolvedBinding, KeymapError> {
    let Some(times) = times else {
        return Ok(binding);
    };
    match binding {
        ResolvedBinding::Mouse(m) if times >= 1 && (m.clicks == 1 || m.clicks == times) => Ok(
            ResolvedBinding::Mouse(MouseBinding::new(m.mods, m.button, times)),
        ),
        _ => Err(KeymapError::InvalidClickCount(format!(
            "times: {} does not apply to '{}'",
            times, key
        ))),
    }
}

/// Get the current platform identifier
fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Errors that can occur when parsing keymaps
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Invalid mouse button: {0}")]
    InvalidMouseButton(String),
    #[error("Invalid click count: {0}")]
    InvalidClickCount(String),
    #[error("Invalid chord: {0}")]
    InvalidChord(String),
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}
