//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use keydispatch::dispatch::{
    ClickEvent, CommandError, CommandExecutor, Dispatched, Dispatcher, DragEvent, GesturePhase,
    InputEvent, KeyEvent,
};
use keydispatch::keymap::{
    parse_keymap_yaml, ContextSnapshot, KeyCode, Modifiers, MouseButton, Resolver,
};
use serde_json::Value;

/// Executor that records every command it receives
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<(String, Vec<Value>)>,
    /// Commands that report failure
    pub failing: Vec<String>,
}

impl Recorder {
    pub fn failing(commands: &[&str]) -> Self {
        Self {
            calls: Vec::new(),
            failing: commands.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn commands(&self) -> Vec<&str> {
        self.calls.iter().map(|(c, _)| c.as_str()).collect()
    }
}

impl CommandExecutor for Recorder {
    fn execute(&mut self, command: &str, args: Vec<Value>) -> Result<(), CommandError> {
        self.calls.push((command.to_string(), args));
        if self.failing.iter().any(|c| c == command) {
            return Err(CommandError::Failed(format!("{} failed", command)));
        }
        Ok(())
    }
}

/// Build a resolver from inline keymap YAML
pub fn resolver(yaml: &str) -> Arc<Resolver> {
    let rules = parse_keymap_yaml(yaml).expect("test keymap should parse");
    Arc::new(Resolver::with_rules(rules))
}

pub fn empty_ctx() -> ContextSnapshot {
    ContextSnapshot::new()
}

pub fn editor_ctx() -> ContextSnapshot {
    ContextSnapshot::new().with("editorFocus", true)
}

pub fn ctrl(c: char) -> InputEvent {
    InputEvent::KeyDown(KeyEvent::char(c, Modifiers::CTRL))
}

pub fn plain(c: char) -> InputEvent {
    InputEvent::KeyDown(KeyEvent::char(c, Modifiers::NONE))
}

pub fn key(code: KeyCode, mods: Modifiers) -> InputEvent {
    InputEvent::KeyDown(KeyEvent::new(code, mods))
}

pub fn click(button: MouseButton, mods: Modifiers, count: u8) -> InputEvent {
    InputEvent::Click(ClickEvent::new(button, mods, count))
}

pub fn drag(phase: GesturePhase, button: MouseButton, mods: Modifiers) -> InputEvent {
    InputEvent::Drag(DragEvent::new(phase, button, mods))
}

/// A start instant plus a millisecond offset
pub fn at(start: Instant, ms: u64) -> Instant {
    start + Duration::from_millis(ms)
}

/// Key down followed by key up, as a host sends for a tapped key
pub fn press(
    dispatcher: &mut Dispatcher,
    event: InputEvent,
    ctx: &ContextSnapshot,
    executor: &mut Recorder,
    now: Instant,
) -> Dispatched {
    let result = dispatcher.handle(&event, ctx, executor, now);
    if let InputEvent::KeyDown(key) = event {
        dispatcher.handle(&InputEvent::KeyUp(key), ctx, executor, now);
    }
    result
}
