//! Core input types for the keymap system: Modifiers, KeyCode, MouseButton

use std::fmt;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Check if this contains all modifiers in other
    #[inline]
    pub const fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Get the platform-specific "command" modifier (Cmd on macOS, Ctrl elsewhere)
    pub fn cmd() -> Modifiers {
        if cfg!(target_os = "macos") {
            Modifiers::META
        } else {
            Modifiers::CTRL
        }
    }

    /// Canonical dispatch prefix, e.g. `ctrl+shift+`.
    ///
    /// Order is fixed (ctrl, shift, alt, meta) so equal sets always encode equally.
    pub fn dispatch_prefix(self) -> String {
        let mut out = String::new();
        if self.ctrl() {
            out.push_str("ctrl+");
        }
        if self.shift() {
            out.push_str("shift+");
        }
        if self.alt() {
            out.push_str("alt+");
        }
        if self.meta() {
            out.push_str("meta+");
        }
        out
    }

    /// Platform display prefix: symbols on macOS, `Ctrl+` style words elsewhere
    pub fn display_prefix(self) -> String {
        let mut parts = Vec::new();

        if cfg!(target_os = "macos") {
            // macOS uses symbols: ⌃ ⌥ ⇧ ⌘
            if self.ctrl() {
                parts.push("⌃");
            }
            if self.alt() {
                parts.push("⌥");
            }
            if self.shift() {
                parts.push("⇧");
            }
            if self.meta() {
                parts.push("⌘");
            }
        } else {
            if self.ctrl() {
                parts.push("Ctrl+");
            }
            if self.alt() {
                parts.push("Alt+");
            }
            if self.shift() {
                parts.push("Shift+");
            }
            if self.meta() {
                parts.push("Win+");
            }
        }

        parts.concat()
    }

    /// Spelled-out prefix for screen readers, e.g. `Control+Shift+`
    pub fn aria_prefix(self) -> String {
        let mut out = String::new();
        if self.ctrl() {
            out.push_str("Control+");
        }
        if self.shift() {
            out.push_str("Shift+");
        }
        if self.alt() {
            out.push_str(if cfg!(target_os = "macos") {
                "Option+"
            } else {
                "Alt+"
            });
        }
        if self.meta() {
            out.push_str(if cfg!(target_os = "macos") {
                "Command+"
            } else {
                "Windows+"
            });
        }
        out
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push(if cfg!(target_os = "macos") {
                "Option"
            } else {
                "Alt"
            });
        }
        if self.meta() {
            parts.push(if cfg!(target_os = "macos") {
                "Cmd"
            } else {
                "Win"
            });
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A key code representing a logical key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A character key (normalized to lowercase)
    Char(char),

    // Named keys
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,

    // Arrow keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,

    // Function keys
    F(u8), // F1-F24

    // Numpad (physical keys)
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
    NumpadDecimal,
}

impl KeyCode {
    /// Canonical lowercase name used in dispatch strings
    pub fn dispatch_name(self) -> String {
        let name = match self {
            KeyCode::Char('+') => "plus",
            KeyCode::Char(' ') => "space",
            KeyCode::Char(c) => return c.to_lowercase().to_string(),
            KeyCode::Enter => "enter",
            KeyCode::Escape => "escape",
            KeyCode::Tab => "tab",
            KeyCode::Backspace => "backspace",
            KeyCode::Delete => "delete",
            KeyCode::Space => "space",
            KeyCode::Up => "up",
            KeyCode::Down => "down",
            KeyCode::Left => "left",
            KeyCode::Right => "right",
            KeyCode::Home => "home",
            KeyCode::End => "end",
            KeyCode::PageUp => "pageup",
            KeyCode::PageDown => "pagedown",
            KeyCode::Insert => "insert",
            KeyCode::F(n) => return format!("f{}", n),
            KeyCode::Numpad0 => "numpad0",
            KeyCode::Numpad1 => "numpad1",
            KeyCode::Numpad2 => "numpad2",
            KeyCode::Numpad3 => "numpad3",
            KeyCode::Numpad4 => "numpad4",
            KeyCode::Numpad5 => "numpad5",
            KeyCode::Numpad6 => "numpad6",
            KeyCode::Numpad7 => "numpad7",
            KeyCode::Numpad8 => "numpad8",
            KeyCode::Numpad9 => "numpad9",
            KeyCode::NumpadAdd => "numpad_add",
            KeyCode::NumpadSubtract => "numpad_subtract",
            KeyCode::NumpadMultiply => "numpad_multiply",
            KeyCode::NumpadDivide => "numpad_divide",
            KeyCode::NumpadEnter => "numpad_enter",
            KeyCode::NumpadDecimal => "numpad_decimal",
        };
        name.to_string()
    }

    /// Parse a key name (canonical or alias) into a key code
    pub fn from_name(key: &str) -> Option<KeyCode> {
        let lower = key.to_lowercase();

        // Single character
        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.clone().next()) {
            return Some(match c {
                ' ' => KeyCode::Space,
                c => KeyCode::Char(c),
            });
        }

        // Function keys
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            return (1..=24).contains(&n).then_some(KeyCode::F(n));
        }

        let code = match lower.as_str() {
            "plus" => KeyCode::Char('+'),
            "enter" | "return" => KeyCode::Enter,
            "escape" | "esc" => KeyCode::Escape,
            "tab" => KeyCode::Tab,
            "backspace" | "back" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "space" => KeyCode::Space,

            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,

            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdown" | "pgdn" => KeyCode::PageDown,
            "insert" | "ins" => KeyCode::Insert,

            "numpad0" | "num0" => KeyCode::Numpad0,
            "numpad1" | "num1" => KeyCode::Numpad1,
            "numpad2" | "num2" => KeyCode::Numpad2,
            "numpad3" | "num3" => KeyCode::Numpad3,
            "numpad4" | "num4" => KeyCode::Numpad4,
            "numpad5" | "num5" => KeyCode::Numpad5,
            "numpad6" | "num6" => KeyCode::Numpad6,
            "numpad7" | "num7" => KeyCode::Numpad7,
            "numpad8" | "num8" => KeyCode::Numpad8,
            "numpad9" | "num9" => KeyCode::Numpad9,
            "numpad_add" | "numadd" | "numplus" => KeyCode::NumpadAdd,
            "numpad_subtract" | "numsub" | "numminus" => KeyCode::NumpadSubtract,
            "numpad_multiply" | "nummul" => KeyCode::NumpadMultiply,
            "numpad_divide" | "numdiv" => KeyCode::NumpadDivide,
            "numpad_enter" | "numenter" => KeyCode::NumpadEnter,
            "numpad_decimal" | "numdot" => KeyCode::NumpadDecimal,

            _ => return None,
        };
        Some(code)
    }

    /// Letters a-z and digits 0-9
    pub fn is_alphanumeric(self) -> bool {
        matches!(self, KeyCode::Char(c) if c.is_ascii_alphanumeric())
    }

    /// The key as typed without shift: lowercase letters, and the digit or
    /// symbol under a shifted US-layout symbol (`!` → `1`, `?` → `/`)
    pub fn unshifted(self) -> KeyCode {
        let KeyCode::Char(c) = self else {
            return self;
        };
        let base = match c {
            ' ' => return KeyCode::Space,
            '!' => '1',
            '@' => '2',
            '#' => '3',
            '$' => '4',
            '%' => '5',
            '^' => '6',
            '&' => '7',
            '*' => '8',
            '(' => '9',
            ')' => '0',
            '_' => '-',
            '+' => '=',
            '{' => '[',
            '}' => ']',
            '|' => '\\',
            ':' => ';',
            '"' => '\'',
            '<' => ',',
            '>' => '.',
            '?' => '/',
            '~' => '`',
            c => c.to_lowercase().next().unwrap_or(c),
        };
        KeyCode::Char(base)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char('+') => write!(f, "Plus"),
            KeyCode::Char(c) => write!(f, "{}", c.to_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Up => write!(f, "↑"),
            KeyCode::Down => write!(f, "↓"),
            KeyCode::Left => write!(f, "←"),
            KeyCode::Right => write!(f, "→"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Numpad0 => write!(f, "Num0"),
            KeyCode::Numpad1 => write!(f, "Num1"),
            KeyCode::Numpad2 => write!(f, "Num2"),
            KeyCode::Numpad3 => write!(f, "Num3"),
            KeyCode::Numpad4 => write!(f, "Num4"),
            KeyCode::Numpad5 => write!(f, "Num5"),
            KeyCode::Numpad6 => write!(f, "Num6"),
            KeyCode::Numpad7 => write!(f, "Num7"),
            KeyCode::Numpad8 => write!(f, "Num8"),
            KeyCode::Numpad9 => write!(f, "Num9"),
            KeyCode::NumpadAdd => write!(f, "Num+"),
            KeyCode::NumpadSubtract => write!(f, "Num-"),
            KeyCode::NumpadMultiply => write!(f, "Num*"),
            KeyCode::NumpadDivide => write!(f, "Num/"),
            KeyCode::NumpadEnter => write!(f, "NumEnter"),
            KeyCode::NumpadDecimal => write!(f, "Num."),
        }
    }
}

/// Mouse buttons that can appear in click and selection bindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Canonical dispatch token (`LMB`, `MMB`, `RMB`)
    pub const fn dispatch_name(self) -> &'static str {
        match self {
            MouseButton::Left => "LMB",
            MouseButton::Middle => "MMB",
            MouseButton::Right => "RMB",
        }
    }

    /// Parse a button token, case-insensitive
    pub fn from_name(name: &str) -> Option<MouseButton> {
        match name.to_lowercase().as_str() {
            "lmb" | "left" => Some(MouseButton::Left),
            "mmb" | "middle" => Some(MouseButton::Middle),
            "rmb" | "right" => Some(MouseButton::Right),
            _ => None,
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "Left Click"),
            MouseButton::Middle => write!(f, "Middle Click"),
            MouseButton::Right => write!(f, "Right Click"),
        }
    }
}
