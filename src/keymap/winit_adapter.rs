//! Adapter to convert winit input data to our binding and event types

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use winit::event::MouseButton as WinitMouseButton;
use winit::keyboard::{Key, KeyCode as WinitKeyCode, ModifiersState, NamedKey, PhysicalKey};

use super::binding::KeyBinding;
use super::types::{KeyCode, Modifiers, MouseButton};
use crate::dispatch::KeyEvent;

/// Convert winit modifier state to our Modifiers
pub fn modifiers_from_winit(state: ModifiersState) -> Modifiers {
    Modifiers::new(
        state.control_key(),
        state.shift_key(),
        state.alt_key(),
        state.super_key(),
    )
}

/// Convert a winit mouse button; extra buttons are not bindable
pub fn mouse_button_from_winit(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

/// Convert winit key event data to a KeyBinding
///
/// Returns None if the key cannot be mapped (e.g., bare modifier presses)
pub fn key_binding_from_winit(
    logical_key: &Key,
    physical_key: PhysicalKey,
    mods: Modifiers,
) -> Option<KeyBinding> {
    // Numpad keys are identified physically so they stay distinct from the digit row
    let numpad = match physical_key {
        PhysicalKey::Code(code) => match code {
            WinitKeyCode::Numpad0 => Some(KeyCode::Numpad0),
            WinitKeyCode::Numpad1 => Some(KeyCode::Numpad1),
            WinitKeyCode::Numpad2 => Some(KeyCode::Numpad2),
            WinitKeyCode::Numpad3 => Some(KeyCode::Numpad3),
            WinitKeyCode::Numpad4 => Some(KeyCode::Numpad4),
            WinitKeyCode::Numpad5 => Some(KeyCode::Numpad5),
            WinitKeyCode::Numpad6 => Some(KeyCode::Numpad6),
            WinitKeyCode::Numpad7 => Some(KeyCode::Numpad7),
            WinitKeyCode::Numpad8 => Some(KeyCode::Numpad8),
            WinitKeyCode::Numpad9 => Some(KeyCode::Numpad9),
            WinitKeyCode::NumpadAdd => Some(KeyCode::NumpadAdd),
            WinitKeyCode::NumpadSubtract => Some(KeyCode::NumpadSubtract),
            WinitKeyCode::NumpadMultiply => Some(KeyCode::NumpadMultiply),
            WinitKeyCode::NumpadDivide => Some(KeyCode::NumpadDivide),
            WinitKeyCode::NumpadEnter => Some(KeyCode::NumpadEnter),
            WinitKeyCode::NumpadDecimal => Some(KeyCode::NumpadDecimal),
            _ => None,
        },
        PhysicalKey::Unidentified(_) => None,
    };

    let key_code = numpad.or_else(|| match logical_key {
        Key::Named(named) => named_key(*named),
        Key::Character(s) => s.chars().next().map(KeyCode::Char),
        _ => None,
    })?;

    Some(KeyBinding::new(key_code, mods))
}

/// Stable id of a physical key for pairing presses with releases
pub fn physical_key_id(physical_key: PhysicalKey) -> u64 {
    let mut hasher = DefaultHasher::new();
    physical_key.hash(&mut hasher);
    hasher.finish()
}

/// Convert winit key event data to a dispatcher event tagged with its physical key
pub fn key_event_from_winit(
    logical_key: &Key,
    physical_key: PhysicalKey,
    mods: Modifiers,
    repeat: bool,
) -> Option<KeyEvent> {
    let binding = key_binding_from_winit(logical_key, physical_key, mods)?;
    let mut event = KeyEvent::new(binding.key(), binding.mods())
        .with_physical(physical_key_id(physical_key));
    event.repeat = repeat;
    Some(event)
}

fn named_key(named: NamedKey) -> Option<KeyCode> {
    let code = match named {
        NamedKey::Enter => KeyCode::Enter,
        NamedKey::Escape => KeyCode::Escape,
        NamedKey::Tab => KeyCode::Tab,
        NamedKey::Backspace => KeyCode::Backspace,
        NamedKey::Delete => KeyCode::Delete,
        NamedKey::Space => KeyCode::Space,

        NamedKey::ArrowUp => KeyCode::Up,
        NamedKey::ArrowDown => KeyCode::Down,
        NamedKey::ArrowLeft => KeyCode::Left,
        NamedKey::ArrowRight => KeyCode::Right,

        NamedKey::Home => KeyCode::Home,
        NamedKey::End => KeyCode::End,
        NamedKey::PageUp => KeyCode::PageUp,
        NamedKey::PageDown => KeyCode::PageDown,
        NamedKey::Insert => KeyCode::Insert,

        NamedKey::F1 => KeyCode::F(1),
        NamedKey::F2 => KeyCode::F(2),
        NamedKey::F3 => KeyCode::F(3),
        NamedKey::F4 => KeyCode::F(4),
        NamedKey::F5 => KeyCode::F(5),
        NamedKey::F6 => KeyCode::F(6),
        NamedKey::F7 => KeyCode::F(7),
        NamedKey::F8 => KeyCode::F(8),
        NamedKey::F9 => KeyCode::F(9),
        NamedKey::F10 => KeyCode::F(10),
        NamedKey::F11 => KeyCode::F(11),
        NamedKey::F12 => KeyCode::F(12),
        NamedKey::F13 => KeyCode::F(13),
        NamedKey::F14 => KeyCode::F(14),
        NamedKey::F15 => KeyCode::F(15),
        NamedKey::F16 => KeyCode::F(16),
        NamedKey::F17 => KeyCode::F(17),
        NamedKey::F18 => KeyCode::F(18),
        NamedKey::F19 => KeyCode::F(19),
        NamedKey::F20 => KeyCode::F(20),
        NamedKey::F21 => KeyCode::F(21),
        NamedKey::F22 => KeyCode::F(22),
        NamedKey::F23 => KeyCode::F(23),
        NamedKey::F24 => KeyCode::F(24),

        _ => return None,
    };
    Some(code)
}
