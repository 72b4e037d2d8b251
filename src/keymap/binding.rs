//! Binding values: one chord component from the keyboard, a mouse click, or a drag
//!
//! Every binding has a canonical dispatch string:
//!
//! ```text
//! [prefix ][ctrl+][shift+][alt+][meta+]<key-or-button>
//! ```
//!
//! The prefix is empty for keyboard bindings, `mouse ` for clicks and `selection `
//! for press-and-drag gestures. Click counts above one are written as a `*N` suffix
//! (`mouse ctrl+LMB*2`) so that two bindings encode equally exactly when they are equal.

use std::fmt;
use std::str::FromStr;

use super::config::KeymapError;
use super::types::{KeyCode, Modifiers, MouseButton};

pub const MOUSE_PREFIX: &str = "mouse ";
pub const SELECTION_PREFIX: &str = "selection ";
const SELECTION_ALIAS: &str = "sel ";

/// A single keyboard chord component: a key with modifiers
///
/// Only constructible through [`KeyBinding::new`], which lower-cases characters and
/// folds `' '` into [`KeyCode::Space`], so equal dispatch strings mean equal values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    key: KeyCode,
    mods: Modifiers,
}

impl KeyBinding {
    /// Create a new key binding, normalizing character keys to lowercase
    pub fn new(key: KeyCode, mods: Modifiers) -> Self {
        let key = match key {
            KeyCode::Char(' ') => KeyCode::Space,
            KeyCode::Char(c) => KeyCode::Char(c.to_lowercase().next().unwrap_or(c)),
            other => other,
        };
        Self { key, mods }
    }

    /// Create a key binding with no modifiers
    pub fn bare(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn mods(&self) -> Modifiers {
        self.mods
    }

    /// Create a key binding with a character and modifiers
    pub fn char_with_mods(c: char, mods: Modifiers) -> Self {
        Self::new(KeyCode::Char(c), mods)
    }

    /// Canonical dispatch string, e.g. `ctrl+shift+k`
    pub fn dispatch_string(&self) -> String {
        format!("{}{}", self.mods.dispatch_prefix(), self.key.dispatch_name())
    }

    /// Display the binding using platform-specific symbols
    pub fn display_string(&self) -> String {
        format!("{}{}", self.mods.display_prefix(), self.key)
    }

    /// Spelled-out label for screen readers
    pub fn aria_string(&self) -> String {
        let key = match self.key {
            KeyCode::Up => "UpArrow".to_string(),
            KeyCode::Down => "DownArrow".to_string(),
            KeyCode::Left => "LeftArrow".to_string(),
            KeyCode::Right => "RightArrow".to_string(),
            other => other.to_string(),
        };
        format!("{}{}", self.mods.aria_prefix(), key)
    }
}

/// A mouse click with a button and a click count (1 = single, 2 = double, ...)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MouseBinding {
    pub mods: Modifiers,
    pub button: MouseButton,
    pub clicks: u8,
}

impl MouseBinding {
    pub fn new(mods: Modifiers, button: MouseButton, clicks: u8) -> Self {
        Self {
            mods,
            button,
            clicks: clicks.max(1),
        }
    }

    /// Canonical dispatch string, e.g. `mouse ctrl+LMB*2`
    pub fn dispatch_string(&self) -> String {
        let mut out = format!(
            "{}{}{}",
            MOUSE_PREFIX,
            self.mods.dispatch_prefix(),
            self.button.dispatch_name()
        );
        if self.clicks > 1 {
            out.push_str(&format!("*{}", self.clicks));
        }
        out
    }

    fn click_word(&self) -> String {
        match self.clicks {
            1 => String::new(),
            2 => "Double ".to_string(),
            3 => "Triple ".to_string(),
            n => format!("{}x ", n),
        }
    }

    pub fn display_string(&self) -> String {
        format!(
            "{}{}{}",
            self.mods.display_prefix(),
            self.click_word(),
            self.button
        )
    }

    pub fn aria_string(&self) -> String {
        format!(
            "{}{}{}",
            self.mods.aria_prefix(),
            self.click_word(),
            self.button
        )
    }
}

/// A press-and-drag gesture with a mouse button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SelectionBinding {
    pub mods: Modifiers,
    pub button: MouseButton,
}

impl SelectionBinding {
    pub const fn new(mods: Modifiers, button: MouseButton) -> Self {
        Self { mods, button }
    }

    /// Canonical dispatch string, e.g. `selection alt+LMB`
    pub fn dispatch_string(&self) -> String {
        format!(
            "{}{}{}",
            SELECTION_PREFIX,
            self.mods.dispatch_prefix(),
            self.button.dispatch_name()
        )
    }

    pub fn display_string(&self) -> String {
        format!("{}{} Drag", self.mods.display_prefix(), self.button)
    }

    pub fn aria_string(&self) -> String {
        format!("{}{} Drag", self.mods.aria_prefix(), self.button)
    }
}

/// One binding value of any input kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Key(KeyBinding),
    Mouse(MouseBinding),
    Selection(SelectionBinding),
}

impl Binding {
    /// Canonical dispatch string used for resolver lookup and persistence
    pub fn dispatch_string(&self) -> String {
        match self {
            Binding::Key(k) => k.dispatch_string(),
            Binding::Mouse(m) => m.dispatch_string(),
            Binding::Selection(s) => s.dispatch_string(),
        }
    }

    pub fn mods(&self) -> Modifiers {
        match self {
            Binding::Key(k) => k.mods(),
            Binding::Mouse(m) => m.mods,
            Binding::Selection(s) => s.mods,
        }
    }

    /// Parse a single (non-chord) dispatch string, prefixes included
    pub fn parse(s: &str) -> Result<Binding, KeymapError> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        if lower.starts_with(MOUSE_PREFIX) {
            let rest = trimmed[MOUSE_PREFIX.len()..].trim();
            let (body, clicks) = split_click_count(rest)?;
            let (mods, button) = parse_button_combo(body)?;
            return Ok(Binding::Mouse(MouseBinding::new(mods, button, clicks)));
        }

        for prefix in [SELECTION_PREFIX, SELECTION_ALIAS] {
            if lower.starts_with(prefix) {
                let body = trimmed[prefix.len()..].trim();
                if body.contains('*') {
                    return Err(KeymapError::InvalidClickCount(format!(
                        "Selection bindings have no click count: {}",
                        s
                    )));
                }
                let (mods, button) = parse_button_combo(body)?;
                return Ok(Binding::Selection(SelectionBinding::new(mods, button)));
            }
        }

        if trimmed.split_whitespace().count() > 1 {
            return Err(KeymapError::InvalidChord(format!(
                "Expected a single binding, got a sequence: {}",
                s
            )));
        }

        parse_key_string(trimmed).map(Binding::Key)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dispatch_string())
    }
}

impl FromStr for Binding {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Binding::parse(s)
    }
}

impl From<KeyBinding> for Binding {
    fn from(value: KeyBinding) -> Self {
        Binding::Key(value)
    }
}

impl From<MouseBinding> for Binding {
    fn from(value: MouseBinding) -> Self {
        Binding::Mouse(value)
    }
}

impl From<SelectionBinding> for Binding {
    fn from(value: SelectionBinding) -> Self {
        Binding::Selection(value)
    }
}

/// Parse a key string like "cmd+shift+s" into a KeyBinding
pub fn parse_key_string(key_str: &str) -> Result<KeyBinding, KeymapError> {
    let (mods, key_part) = split_modifiers(key_str)?;
    let key = KeyCode::from_name(key_part)
        .ok_or_else(|| KeymapError::InvalidKey(format!("Unknown key: {}", key_part)))?;
    Ok(KeyBinding::new(key, mods))
}

/// Split leading modifier tokens from the final key/button token
fn split_modifiers(combo: &str) -> Result<(Modifiers, &str), KeymapError> {
    // A trailing '+' is the plus key itself ("ctrl++")
    let (head, tail_plus) = match combo.strip_suffix("++") {
        Some(head) => (head, true),
        None => (combo, combo == "+"),
    };
    if combo == "+" {
        return Ok((Modifiers::NONE, "+"));
    }

    let mut parts: Vec<&str> = head.split('+').collect();
    let key_part = if tail_plus {
        "+"
    } else {
        parts
            .pop()
            .ok_or_else(|| KeymapError::InvalidKey(combo.to_string()))?
    };
    if key_part.is_empty() {
        return Err(KeymapError::InvalidKey(format!(
            "No key found in binding: {}",
            combo
        )));
    }

    let mut mods = Modifiers::NONE;
    for part in parts {
        match part.to_lowercase().as_str() {
            // Platform command key
            "cmd" | "mod" => mods = mods | Modifiers::cmd(),
            "ctrl" | "control" => mods = mods | Modifiers::CTRL,
            "shift" => mods = mods | Modifiers::SHIFT,
            "alt" | "option" | "opt" => mods = mods | Modifiers::ALT,
            "meta" | "super" | "win" => mods = mods | Modifiers::META,
            _ => {
                return Err(KeymapError::InvalidKey(format!(
                    "Multiple keys in binding: {}",
                    combo
                )))
            }
        }
    }

    Ok((mods, key_part))
}

fn parse_button_combo(combo: &str) -> Result<(Modifiers, MouseButton), KeymapError> {
    let (mods, button) = split_modifiers(combo)?;
    let button = MouseButton::from_name(button)
        .ok_or_else(|| KeymapError::InvalidMouseButton(button.to_string()))?;
    Ok((mods, button))
}

fn split_click_count(body: &str) -> Result<(&str, u8), KeymapError> {
    match body.rsplit_once('*') {
        Some((combo, count)) => {
            let clicks = count
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| KeymapError::InvalidClickCount(body.to_string()))?;
            Ok((combo.trim(), clicks))
        }
        None => Ok((body, 1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let stroke = parse_key_string("a").unwrap();
        assert_eq!(stroke.key(), KeyCode::Char('a'));
        assert!(stroke.mods().is_empty());
    }

    #[test]
    fn test_parse_key_with_multiple_modifiers() {
        let stroke = parse_key_string("ctrl+shift+s").unwrap();
        assert_eq!(stroke.key(), KeyCode::Char('s'));
        assert!(stroke.mods().ctrl());
        assert!(stroke.mods().shift());
    }

    #[test]
    fn test_parse_cmd_modifier() {
        let stroke = parse_key_string("cmd+s").unwrap();
        assert_eq!(stroke.mods(), Modifiers::cmd());
    }

    #[test]
    fn test_parse_plus_key() {
        let stroke = parse_key_string("ctrl++").unwrap();
        assert_eq!(stroke.key(), KeyCode::Char('+'));
        assert!(stroke.mods().ctrl());
        assert_eq!(stroke.dispatch_string(), "ctrl+plus");
        assert_eq!(parse_key_string("ctrl+plus").unwrap(), stroke);
    }

    #[test]
    fn test_parse_rejects_two_keys() {
        assert!(parse_key_string("a+b").is_err());
        assert!(parse_key_string("ctrl+").is_err());
        assert!(parse_key_string("ctrl+nokey").is_err());
    }

    #[test]
    fn test_uppercase_char_normalized() {
        let a = KeyBinding::char_with_mods('K', Modifiers::CTRL);
        let b = KeyBinding::char_with_mods('k', Modifiers::CTRL);
        assert_eq!(a, b);
        assert_eq!(a.dispatch_string(), "ctrl+k");
    }

    #[test]
    fn test_equal_dispatch_strings_mean_equal_bindings() {
        let variants = [
            KeyBinding::new(KeyCode::Char('S'), Modifiers::CTRL),
            KeyBinding::new(KeyCode::Char('s'), Modifiers::CTRL),
            parse_key_string("CTRL+S").unwrap(),
        ];
        for binding in variants {
            assert_eq!(binding, variants[1]);
            assert_eq!(binding.key(), KeyCode::Char('s'));
            assert_eq!(binding.mods(), Modifiers::CTRL);
        }

        let space = KeyBinding::new(KeyCode::Char(' '), Modifiers::NONE);
        assert_eq!(space, KeyBinding::bare(KeyCode::Space));
        assert_eq!(space.dispatch_string(), "space");
    }

    #[test]
    fn test_modifier_order_in_dispatch_string() {
        let binding = parse_key_string("meta+alt+shift+ctrl+x").unwrap();
        assert_eq!(binding.dispatch_string(), "ctrl+shift+alt+meta+x");
    }

    #[test]
    fn test_parse_mouse_binding() {
        let binding = Binding::parse("mouse ctrl+LMB").unwrap();
        assert_eq!(
            binding,
            Binding::Mouse(MouseBinding::new(Modifiers::CTRL, MouseButton::Left, 1))
        );
        assert_eq!(binding.dispatch_string(), "mouse ctrl+LMB");
    }

    #[test]
    fn test_mouse_click_count_is_part_of_identity() {
        let single = MouseBinding::new(Modifiers::CTRL, MouseButton::Left, 1);
        let double = MouseBinding::new(Modifiers::CTRL, MouseButton::Left, 2);
        assert_ne!(single, double);
        assert_ne!(single.dispatch_string(), double.dispatch_string());
        assert_eq!(double.dispatch_string(), "mouse ctrl+LMB*2");
        assert_eq!(
            Binding::parse("mouse ctrl+lmb*2").unwrap(),
            Binding::Mouse(double)
        );
    }

    #[test]
    fn test_parse_selection_binding_and_alias() {
        let full = Binding::parse("selection alt+LMB").unwrap();
        let alias = Binding::parse("sel alt+lmb").unwrap();
        assert_eq!(full, alias);
        assert_eq!(alias.dispatch_string(), "selection alt+LMB");
    }

    #[test]
    fn test_selection_rejects_click_count() {
        assert!(matches!(
            Binding::parse("selection LMB*2"),
            Err(KeymapError::InvalidClickCount(_))
        ));
    }

    #[test]
    fn test_mouse_rejects_zero_clicks_and_unknown_button() {
        assert!(Binding::parse("mouse LMB*0").is_err());
        assert!(matches!(
            Binding::parse("mouse ctrl+x"),
            Err(KeymapError::InvalidMouseButton(_))
        ));
    }

    #[test]
    fn test_parse_rejects_sequence_as_single() {
        assert!(matches!(
            Binding::parse("ctrl+k ctrl+s"),
            Err(KeymapError::InvalidChord(_))
        ));
    }

    #[test]
    fn test_kinds_never_collide() {
        let key = Binding::parse("ctrl+k").unwrap();
        let click = Binding::parse("mouse ctrl+LMB").unwrap();
        let drag = Binding::parse("selection ctrl+LMB").unwrap();
        assert_ne!(click, drag);
        assert_ne!(click.dispatch_string(), drag.dispatch_string());
        assert_ne!(key.dispatch_string(), click.dispatch_string());
    }

    #[test]
    fn test_dispatch_string_round_trip() {
        for s in [
            "ctrl+shift+k",
            "f5",
            "alt+up",
            "mouse RMB",
            "mouse shift+MMB*3",
            "selection ctrl+alt+LMB",
        ] {
            let binding = Binding::parse(s).unwrap();
            assert_eq!(binding.dispatch_string(), s);
            assert_eq!(Binding::parse(&binding.dispatch_string()).unwrap(), binding);
        }
    }
}
