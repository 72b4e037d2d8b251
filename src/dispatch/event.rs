//! Events flowing into and out of the dispatcher
//!
//! Hosts normalize raw platform input into [`InputEvent`]s. The dispatcher
//! reports what the host should show or record as [`EngineEvent`]s.

use crate::keymap::{KeyBinding, KeyCode, Modifiers, MouseBinding, MouseButton, SelectionBinding};

/// A key press or release
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub mods: Modifiers,
    /// Set by hosts that report OS auto-repeat
    pub repeat: bool,
    /// Scan code or other layout-independent id of the physical key, if known
    pub physical: Option<u64>,
}

impl KeyEvent {
    pub fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self {
            key,
            mods,
            repeat: false,
            physical: None,
        }
    }

    /// Attach the physical key id, so a press pairs with its release even when
    /// the two report different characters
    pub fn with_physical(mut self, id: u64) -> Self {
        self.physical = Some(id);
        self
    }

    /// Shorthand for a character key
    pub fn char(c: char, mods: Modifiers) -> Self {
        Self::new(KeyCode::Char(c), mods)
    }

    /// Mark this event as an auto-repeat
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn binding(&self) -> KeyBinding {
        KeyBinding::new(self.key, self.mods)
    }

    /// Which key on the keyboard this is, independent of shift state
    pub(crate) fn identity(&self) -> KeyIdentity {
        match self.physical {
            Some(id) => KeyIdentity::Physical(id),
            None => KeyIdentity::Logical(self.key.unshifted()),
        }
    }
}

/// Identity used to pair key presses with releases
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum KeyIdentity {
    Physical(u64),
    /// Fallback for hosts without scan codes; assumes a US layout for shifted symbols
    Logical(KeyCode),
}

/// A completed mouse click; `click_count` is 1 for single, 2 for double, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClickEvent {
    pub button: MouseButton,
    pub mods: Modifiers,
    pub click_count: u8,
}

impl ClickEvent {
    pub fn new(button: MouseButton, mods: Modifiers, click_count: u8) -> Self {
        Self {
            button,
            mods,
            click_count,
        }
    }

    pub fn binding(&self) -> MouseBinding {
        MouseBinding::new(self.mods, self.button, self.click_count)
    }
}

/// Phase of a press-drag-release gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    /// Button pressed and the pointer started moving
    Start,
    /// Button released after dragging
    End,
    /// Gesture aborted (escape, capture lost, ...)
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragEvent {
    pub phase: GesturePhase,
    pub button: MouseButton,
    pub mods: Modifiers,
}

impl DragEvent {
    pub fn new(phase: GesturePhase, button: MouseButton, mods: Modifiers) -> Self {
        Self {
            phase,
            button,
            mods,
        }
    }

    pub fn binding(&self) -> SelectionBinding {
        SelectionBinding::new(self.mods, self.button)
    }
}

/// A normalized input event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    Click(ClickEvent),
    Drag(DragEvent),
}

impl From<ClickEvent> for InputEvent {
    fn from(value: ClickEvent) -> Self {
        InputEvent::Click(value)
    }
}

impl From<DragEvent> for InputEvent {
    fn from(value: DragEvent) -> Self {
        InputEvent::Drag(value)
    }
}

/// What triggered an executed action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionSource {
    Keybinding,
}

/// Notifications and observability records emitted by the dispatcher
///
/// The dispatcher never talks to a UI; the host drains these with
/// [`Dispatcher::take_events`](super::Dispatcher::take_events) and renders them.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Chord mode entered; show "(label) was pressed. Waiting for second key..."
    ChordStarted { label: String },
    /// Chord mode left; hide the chord status
    ChordCleared,
    /// The second key did not complete any chord
    NotACommand { first: String, second: String },
    /// The executor rejected the command
    CommandFailed { command: String, message: String },
    /// Arguments could not be composed; the command was not run
    ArgumentsRejected { command: String, message: String },
    /// One per successful invocation
    ActionExecuted {
        command: String,
        source: ActionSource,
    },
}

/// Conservative guess whether a key press types a character
///
/// False whenever ctrl or meta is held; otherwise true only for letters and
/// digits. Not layout-aware, so callers must not treat it as authoritative.
pub fn might_produce_printable_character(event: &KeyEvent) -> bool {
    if event.mods.ctrl() || event.mods.meta() {
        return false;
    }
    event.key.is_alphanumeric()
}
