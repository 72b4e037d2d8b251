//! Dispatch string encoding tests
//!
//! Two bindings must encode to the same dispatch string exactly when they are
//! equal, and every encoding must parse back to the binding it came from.

use std::collections::HashMap;

use keydispatch::dispatch::{might_produce_printable_character, KeyEvent};
use keydispatch::keymap::{
    Binding, KeyBinding, KeyCode, Modifiers, MouseBinding, MouseButton, ResolvedBinding,
    SelectionBinding,
};

fn all_modifiers() -> Vec<Modifiers> {
    (0..16u8)
        .map(|bits| Modifiers::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0))
        .collect()
}

fn sample_keys() -> Vec<KeyCode> {
    vec![
        KeyCode::Char('a'),
        KeyCode::Char('z'),
        KeyCode::Char('1'),
        KeyCode::Char('+'),
        KeyCode::Char('/'),
        KeyCode::Enter,
        KeyCode::Escape,
        KeyCode::Tab,
        KeyCode::Space,
        KeyCode::Up,
        KeyCode::PageDown,
        KeyCode::F(1),
        KeyCode::F(12),
        KeyCode::Numpad0,
        KeyCode::NumpadAdd,
        KeyCode::NumpadEnter,
    ]
}

fn sample_bindings() -> Vec<Binding> {
    let mut out = Vec::new();
    let buttons = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];
    for mods in all_modifiers() {
        for key in sample_keys() {
            out.push(Binding::Key(KeyBinding::new(key, mods)));
        }
        for button in buttons {
            for clicks in 1..=4 {
                out.push(Binding::Mouse(MouseBinding::new(mods, button, clicks)));
            }
            out.push(Binding::Selection(SelectionBinding::new(mods, button)));
        }
    }
    out
}

#[test]
fn test_dispatch_strings_round_trip() {
    for binding in sample_bindings() {
        let encoded = binding.dispatch_string();
        let parsed = Binding::parse(&encoded)
            .unwrap_or_else(|e| panic!("{} failed to parse: {}", encoded, e));
        assert_eq!(parsed, binding, "round trip of {}", encoded);
    }
}

#[test]
fn test_dispatch_strings_are_unique() {
    let mut seen: HashMap<String, Binding> = HashMap::new();
    for binding in sample_bindings() {
        if let Some(previous) = seen.insert(binding.dispatch_string(), binding) {
            assert_eq!(previous, binding, "collision on {}", binding.dispatch_string());
        }
    }
}

#[test]
fn test_modifier_order_is_canonical() {
    let all = Modifiers::CTRL | Modifiers::SHIFT | Modifiers::ALT | Modifiers::META;
    let binding = KeyBinding::new(KeyCode::Char('x'), all);
    assert_eq!(binding.dispatch_string(), "ctrl+shift+alt+meta+x");

    let parsed = Binding::parse("meta+alt+shift+ctrl+x").unwrap();
    assert_eq!(parsed, Binding::Key(binding));
}

#[test]
fn test_prefixes_and_click_suffix() {
    let click = MouseBinding::new(Modifiers::CTRL, MouseButton::Left, 2);
    assert_eq!(click.dispatch_string(), "mouse ctrl+LMB*2");

    let single = MouseBinding::new(Modifiers::NONE, MouseButton::Right, 1);
    assert_eq!(single.dispatch_string(), "mouse RMB");

    let drag = SelectionBinding::new(Modifiers::ALT, MouseButton::Left);
    assert_eq!(drag.dispatch_string(), "selection alt+LMB");
    assert_eq!(
        Binding::parse("sel alt+LMB").unwrap(),
        Binding::Selection(drag)
    );
}

#[test]
fn test_chord_value_parts() {
    let chord = ResolvedBinding::parse("ctrl+k ctrl+s").unwrap();
    assert!(chord.is_chord());
    assert_eq!(chord.dispatch_parts(), vec!["ctrl+k", "ctrl+s"]);
    assert_eq!(chord.user_settings_label(), "ctrl+k ctrl+s");

    // Only keyboard bindings chord
    assert!(ResolvedBinding::parse("mouse LMB mouse RMB").is_err());
}

#[test]
fn test_printable_guess() {
    let printable = |key, mods| might_produce_printable_character(&KeyEvent::new(key, mods));

    assert!(printable(KeyCode::Char('a'), Modifiers::NONE));
    assert!(printable(KeyCode::Char('7'), Modifiers::SHIFT));
    assert!(printable(KeyCode::Char('a'), Modifiers::ALT));
    assert!(!printable(KeyCode::Char('a'), Modifiers::CTRL));
    assert!(!printable(KeyCode::Char('a'), Modifiers::META));
    assert!(!printable(KeyCode::Enter, Modifiers::NONE));
    assert!(!printable(KeyCode::F(5), Modifiers::NONE));
}
