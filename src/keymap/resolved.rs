//! Resolved bindings: a binding value that knows how to present itself
//!
//! A keyboard binding may be a two-part chord (`ctrl+k ctrl+s`); mouse and
//! selection bindings are always a single part.

use std::fmt;

use super::binding::{Binding, KeyBinding, MouseBinding, SelectionBinding};
use super::config::KeymapError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedBinding {
    Keyboard {
        first: KeyBinding,
        chord: Option<KeyBinding>,
    },
    Mouse(MouseBinding),
    Selection(SelectionBinding),
}

impl ResolvedBinding {
    /// A single keyboard part
    pub fn key(first: KeyBinding) -> Self {
        ResolvedBinding::Keyboard { first, chord: None }
    }

    /// A two-part keyboard chord
    pub fn chord(first: KeyBinding, second: KeyBinding) -> Self {
        ResolvedBinding::Keyboard {
            first,
            chord: Some(second),
        }
    }

    /// Parse a full pattern: one binding, or two keyboard parts separated by a space
    pub fn parse(pattern: &str) -> Result<Self, KeymapError> {
        let trimmed = pattern.trim();
        let lower = trimmed.to_lowercase();
        let prefixed = ["mouse ", "selection ", "sel "]
            .iter()
            .any(|p| lower.starts_with(p));
        if prefixed {
            return Binding::parse(trimmed).map(Self::from);
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts.as_slice() {
            [single] => Binding::parse(single).map(Self::from),
            [first, second] => match (Binding::parse(first)?, Binding::parse(second)?) {
                (Binding::Key(first), Binding::Key(second)) => Ok(Self::chord(first, second)),
                _ => Err(KeymapError::InvalidChord(format!(
                    "Only keyboard bindings can form chords: {}",
                    pattern
                ))),
            },
            [] => Err(KeymapError::InvalidKey("Empty binding".to_string())),
            _ => Err(KeymapError::InvalidChord(format!(
                "Chords have at most two parts: {}",
                pattern
            ))),
        }
    }

    /// The first (or only) part as a binding value
    pub fn first(&self) -> Binding {
        match self {
            ResolvedBinding::Keyboard { first, .. } => Binding::Key(*first),
            ResolvedBinding::Mouse(m) => Binding::Mouse(*m),
            ResolvedBinding::Selection(s) => Binding::Selection(*s),
        }
    }

    /// Whether this is a two-part chord
    pub fn is_chord(&self) -> bool {
        matches!(self, ResolvedBinding::Keyboard { chord: Some(_), .. })
    }

    /// Dispatch strings for each part, one for plain bindings and two for chords
    pub fn dispatch_parts(&self) -> Vec<String> {
        match self {
            ResolvedBinding::Keyboard { first, chord } => {
                let mut parts = vec![first.dispatch_string()];
                if let Some(second) = chord {
                    parts.push(second.dispatch_string());
                }
                parts
            }
            ResolvedBinding::Mouse(m) => vec![m.dispatch_string()],
            ResolvedBinding::Selection(s) => vec![s.dispatch_string()],
        }
    }

    /// Display label using platform-specific symbols
    pub fn label(&self) -> String {
        match self {
            ResolvedBinding::Keyboard { first, chord } => join_parts(
                first.display_string(),
                chord.map(|c| c.display_string()),
            ),
            ResolvedBinding::Mouse(m) => m.display_string(),
            ResolvedBinding::Selection(s) => s.display_string(),
        }
    }

    /// Label for assistive technology
    pub fn aria_label(&self) -> String {
        match self {
            ResolvedBinding::Keyboard { first, chord } => {
                join_parts(first.aria_string(), chord.map(|c| c.aria_string()))
            }
            ResolvedBinding::Mouse(m) => m.aria_string(),
            ResolvedBinding::Selection(s) => s.aria_string(),
        }
    }

    /// Text written back to user keymap files
    pub fn user_settings_label(&self) -> String {
        self.dispatch_parts().join(" ")
    }
}

fn join_parts(first: String, second: Option<String>) -> String {
    match second {
        Some(second) => format!("{} {}", first, second),
        None => first,
    }
}

impl From<Binding> for ResolvedBinding {
    fn from(value: Binding) -> Self {
        match value {
            Binding::Key(k) => ResolvedBinding::key(k),
            Binding::Mouse(m) => ResolvedBinding::Mouse(m),
            Binding::Selection(s) => ResolvedBinding::Selection(s),
        }
    }
}

impl From<KeyBinding> for ResolvedBinding {
    fn from(value: KeyBinding) -> Self {
        ResolvedBinding::key(value)
    }
}

impl From<MouseBinding> for ResolvedBinding {
    fn from(value: MouseBinding) -> Self {
        ResolvedBinding::Mouse(value)
    }
}

impl From<SelectionBinding> for ResolvedBinding {
    fn from(value: SelectionBinding) -> Self {
        ResolvedBinding::Selection(value)
    }
}

impl fmt::Display for ResolvedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_settings_label())
    }
}
