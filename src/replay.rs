//! Scripted replay of input events through a dispatcher
//!
//! Scripts are YAML and run on a virtual clock, so chord timeouts can be
//! exercised without sleeping:
//!
//! ```yaml
//! context:
//!   editorFocus: true
//! fail: [file.saveAll]          # commands the executor rejects
//! track_key_up: true            # a held key filters presses until released
//! steps:
//!   - key: "ctrl+k"             # press and release
//!   - wait: 6000                # milliseconds; liveness ticks fire on the way
//!   - key: "ctrl+s"
//!   - click: "ctrl+LMB*2"       # "mouse " prefix optional
//!   - drag: "alt+LMB"           # "selection " prefix optional
//!   - drop
//!   - focus: false
//!   - set: { hasSelection: true }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::{
    ChordTiming, ClickEvent, CommandError, CommandExecutor, Dispatched, Dispatcher, DragEvent,
    EngineEvent, GesturePhase, InputEvent, KeyEvent,
};
use crate::keymap::{parse_key_string, Binding, ContextSnapshot, Resolver};
use crate::tracing::DispatchSnapshot;

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub context: ContextSnapshot,
    /// Commands the replay executor reports as failed
    #[serde(default)]
    pub fail: Vec<String>,
    /// Every key step reports its release, so held keys can be tracked
    #[serde(default = "default_track_key_up")]
    pub track_key_up: bool,
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

fn default_track_key_up() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Press and release a key
    Key(String),
    /// Press a key without releasing it
    Hold(String),
    /// An OS auto-repeat of a key
    Repeat(String),
    Release(String),
    Click(String),
    /// Start a drag gesture
    Drag(String),
    /// Finish the drag gesture
    Drop,
    CancelDrag,
    /// Advance the clock by this many milliseconds
    Wait(u64),
    Focus(bool),
    Set(ContextSnapshot),
    Unset(String),
}

/// One printed line of replay output
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayLine {
    pub step: String,
    pub at_ms: u128,
    pub outcome: Option<Dispatched>,
    pub events: Vec<EngineEvent>,
    pub state_change: Option<String>,
}

/// Executor that records every invocation and rejects a configured set
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub invoked: Vec<(String, Vec<Value>)>,
    pub fail: Vec<String>,
}

impl CommandExecutor for RecordingExecutor {
    fn execute(&mut self, command: &str, args: Vec<Value>) -> Result<(), CommandError> {
        self.invoked.push((command.to_string(), args));
        if self.fail.iter().any(|c| c == command) {
            return Err(CommandError::Failed(format!("{} rejected by replay", command)));
        }
        Ok(())
    }
}

pub fn load_script(path: &Path) -> Result<ReplayScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script {}", path.display()))?;
    parse_script(&content)
}

pub fn parse_script(yaml: &str) -> Result<ReplayScript> {
    serde_yaml::from_str(yaml).context("Failed to parse replay script")
}

/// Run a script and collect one line per step
pub fn run_script(
    script: ReplayScript,
    resolver: Arc<Resolver>,
    timing: ChordTiming,
) -> Result<(Vec<ReplayLine>, RecordingExecutor)> {
    let mut dispatcher =
        Dispatcher::with_timing(resolver, timing).tracking_key_up(script.track_key_up);
    let mut executor = RecordingExecutor {
        invoked: Vec::new(),
        fail: script.fail,
    };
    let mut ctx = script.context;
    let start = Instant::now();
    let mut now = start;
    let mut has_focus = true;
    let mut lines = Vec::with_capacity(script.steps.len());

    for step in script.steps {
        let before = DispatchSnapshot::from_dispatcher(&dispatcher);
        let label = describe(&step);

        let outcome = match step {
            Step::Key(key) => {
                let event = key_event(&key)?;
                let result =
                    dispatcher.handle(&InputEvent::KeyDown(event), &ctx, &mut executor, now);
                dispatcher.handle_key_up(&event);
                Some(result)
            }
            Step::Hold(key) => {
                let event = key_event(&key)?;
                Some(dispatcher.handle(&InputEvent::KeyDown(event), &ctx, &mut executor, now))
            }
            Step::Repeat(key) => {
                let event = key_event(&key)?.repeated();
                Some(dispatcher.handle(&InputEvent::KeyDown(event), &ctx, &mut executor, now))
            }
            Step::Release(key) => Some(dispatcher.handle_key_up(&key_event(&key)?)),
            Step::Click(pattern) => {
                let event = InputEvent::Click(click_event(&pattern)?);
                Some(dispatcher.handle(&event, &ctx, &mut executor, now))
            }
            Step::Drag(pattern) => {
                let event = InputEvent::Drag(drag_event(&pattern)?);
                Some(dispatcher.handle(&event, &ctx, &mut executor, now))
            }
            Step::Drop => Some(dispatcher.complete_selection(&mut executor)),
            Step::CancelDrag => Some(dispatcher.cancel_selection()),
            Step::Wait(ms) => {
                let target = now + Duration::from_millis(ms);
                while let Some(wakeup) = dispatcher.next_wakeup() {
                    if wakeup > target {
                        break;
                    }
                    dispatcher.tick(wakeup, has_focus);
                }
                now = target;
                None
            }
            Step::Focus(focused) => {
                has_focus = focused;
                dispatcher.tick(now, has_focus);
                None
            }
            Step::Set(values) => {
                ctx.merge(values);
                None
            }
            Step::Unset(key) => {
                ctx.remove(&key);
                None
            }
        };

        let after = DispatchSnapshot::from_dispatcher(&dispatcher);
        lines.push(ReplayLine {
            step: label,
            at_ms: now.duration_since(start).as_millis(),
            outcome,
            events: dispatcher.take_events(),
            state_change: before.diff(&after),
        });
    }

    Ok((lines, executor))
}

fn describe(step: &Step) -> String {
    match step {
        Step::Key(k) => format!("key {}", k),
        Step::Hold(k) => format!("hold {}", k),
        Step::Repeat(k) => format!("repeat {}", k),
        Step::Release(k) => format!("release {}", k),
        Step::Click(p) => format!("click {}", p),
        Step::Drag(p) => format!("drag {}", p),
        Step::Drop => "drop".to_string(),
        Step::CancelDrag => "cancel drag".to_string(),
        Step::Wait(ms) => format!("wait {}ms", ms),
        Step::Focus(f) => format!("focus {}", f),
        Step::Set(_) => "set context".to_string(),
        Step::Unset(k) => format!("unset {}", k),
    }
}

fn key_event(key: &str) -> Result<KeyEvent> {
    let binding = parse_key_string(key).with_context(|| format!("Bad key in script: {}", key))?;
    Ok(KeyEvent::new(binding.key(), binding.mods()))
}

fn click_event(pattern: &str) -> Result<ClickEvent> {
    let full = with_prefix(pattern, crate::keymap::MOUSE_PREFIX);
    match Binding::parse(&full).with_context(|| format!("Bad click in script: {}", pattern))? {
        Binding::Mouse(m) => Ok(ClickEvent::new(m.button, m.mods, m.clicks)),
        other => bail!("Expected a click, got {}", other),
    }
}

fn drag_event(pattern: &str) -> Result<DragEvent> {
    let full = with_prefix(pattern, crate::keymap::SELECTION_PREFIX);
    match Binding::parse(&full).with_context(|| format!("Bad drag in script: {}", pattern))? {
        Binding::Selection(s) => Ok(DragEvent::new(GesturePhase::Start, s.button, s.mods)),
        other => bail!("Expected a drag, got {}", other),
    }
}

fn with_prefix(pattern: &str, prefix: &str) -> String {
    let lower = pattern.trim().to_lowercase();
    if lower.starts_with("mouse ") || lower.starts_with("selection ") || lower.starts_with("sel ")
    {
        pattern.trim().to_string()
    } else {
        format!("{}{}", prefix, pattern.trim())
    }
}

/// Render a replay line for terminal output
pub fn format_line(line: &ReplayLine) -> String {
    let mut out = format!("[{:>6}ms] {:<28}", line.at_ms, line.step);
    if let Some(outcome) = &line.outcome {
        out.push_str(&format!(" {:?}", outcome));
    }
    if let Some(change) = &line.state_change {
        out.push_str(&format!("  ({})", change));
    }
    for event in &line.events {
        out.push_str(&format!("\n{:>12}{:?}", "", event));
    }
    out
}
