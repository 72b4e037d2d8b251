//! The dispatch engine: one input event in, at most one command out
//!
//! The dispatcher owns chord mode and the selection tracker. It has no threads
//! and no timers of its own; hosts pass the current [`Instant`] with every call
//! and call [`Dispatcher::tick`] at [`Dispatcher::next_wakeup`] while a chord is
//! pending.
//!
//! Auto-repeat is recognized by [`KeyEvent::repeat`]. Hosts that also report key
//! releases can turn on [`Dispatcher::tracking_key_up`]; a press of a key still
//! held down is then treated as a repeat too.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::chord::{ChordExit, ChordMode, ChordState, ChordTiming};
use super::event::{
    ClickEvent, DragEvent, EngineEvent, GesturePhase, InputEvent, KeyEvent, KeyIdentity,
};
use super::execute::{run_command, CommandExecutor, ExecOutcome};
use super::selection::SelectionTracker;
use crate::keymap::{
    CommandMatch, ContextLookup, Modifiers, MouseButton, ResolveOutcome,
    ResolvedBinding, Resolver,
};

/// What the dispatcher did with one input event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatched {
    /// No rule applies; the host's default handling runs
    Unhandled,
    /// Auto-repeat of a held key, dropped before resolution
    Filtered { prevent_default: bool },
    /// First key of a chord; waiting for the second
    ChordPending,
    /// The second key completed nothing; the key is still consumed
    ChordAborted,
    /// A command ran
    Executed { command: String, bubble: bool },
    /// A command matched but was rejected (by the executor or its arguments)
    Failed { command: String, bubble: bool },
    /// A drag began on a selection binding; its command runs when the drag ends
    SelectionArmed,
}

impl Dispatched {
    /// Whether the host should suppress its default handling of the input
    pub fn prevents_default(&self) -> bool {
        match self {
            Dispatched::Unhandled => false,
            Dispatched::Filtered { prevent_default } => *prevent_default,
            Dispatched::ChordPending | Dispatched::ChordAborted | Dispatched::SelectionArmed => {
                true
            }
            Dispatched::Executed { bubble, .. } | Dispatched::Failed { bubble, .. } => !bubble,
        }
    }
}

/// Keybinding dispatch engine
pub struct Dispatcher {
    resolver: Arc<Resolver>,
    timing: ChordTiming,
    chord: ChordMode,
    selection: SelectionTracker,
    /// Whether each key's last dispatched press was consumed; repeats inherit it
    consumed: HashMap<KeyIdentity, bool>,
    /// Keys pressed and not yet released; only filled when tracking key-ups
    held: HashSet<KeyIdentity>,
    track_key_up: bool,
    events: Vec<EngineEvent>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self::with_timing(resolver, ChordTiming::default())
    }

    pub fn with_timing(resolver: Arc<Resolver>, timing: ChordTiming) -> Self {
        Self {
            resolver,
            timing,
            chord: ChordMode::Idle,
            selection: SelectionTracker::new(),
            consumed: HashMap::new(),
            held: HashSet::new(),
            track_key_up: false,
            events: Vec::new(),
        }
    }

    /// Filter presses of keys that were never released
    ///
    /// Only for hosts that deliver every key-up; a lost release would swallow
    /// the key until focus is lost.
    pub fn tracking_key_up(mut self, enabled: bool) -> Self {
        self.track_key_up = enabled;
        self
    }

    pub fn tracks_key_up(&self) -> bool {
        self.track_key_up
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Swap in a rebuilt rule table; any chord or gesture in progress is dropped
    pub fn set_resolver(&mut self, resolver: Arc<Resolver>) {
        self.reset();
        self.resolver = resolver;
    }

    pub fn timing(&self) -> ChordTiming {
        self.timing
    }

    /// Handle any input event
    pub fn handle(
        &mut self,
        event: &InputEvent,
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        self.handle_with_args(event, &[], ctx, executor, now)
    }

    /// Handle an input event, passing caller arguments to any command it runs
    pub fn handle_with_args(
        &mut self,
        event: &InputEvent,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        match event {
            InputEvent::KeyDown(key) => self.key_down(key, args, ctx, executor, now),
            InputEvent::KeyUp(key) => self.handle_key_up(key),
            InputEvent::Click(click) => self.click(click, args, ctx, executor, now),
            InputEvent::Drag(drag) => self.drag(drag, args, ctx, executor, now),
        }
    }

    pub fn handle_key_down(
        &mut self,
        event: &KeyEvent,
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        self.key_down(event, &[], ctx, executor, now)
    }

    /// Release a held key so its next press is dispatched again
    pub fn handle_key_up(&mut self, event: &KeyEvent) -> Dispatched {
        self.held.remove(&event.identity());
        Dispatched::Unhandled
    }

    pub fn handle_click(
        &mut self,
        event: &ClickEvent,
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        self.click(event, &[], ctx, executor, now)
    }

    /// Start a drag gesture; returns [`Dispatched::SelectionArmed`] when a
    /// selection rule matched
    pub fn begin_selection(
        &mut self,
        mods: Modifiers,
        button: MouseButton,
        ctx: &dyn ContextLookup,
        now: Instant,
    ) -> Dispatched {
        self.expire_stale_chord(now);
        if self.selection.begin(&self.resolver, ctx, mods, button) {
            Dispatched::SelectionArmed
        } else {
            Dispatched::Unhandled
        }
    }

    /// Abort the drag gesture; its command never runs
    pub fn cancel_selection(&mut self) -> Dispatched {
        if let Some(pending) = self.selection.cancel() {
            tracing::debug!(
                "Selection gesture {} cancelled",
                pending.binding.dispatch_string()
            );
        }
        Dispatched::Unhandled
    }

    /// Finish the drag gesture, running the command captured at its start
    pub fn complete_selection(&mut self, executor: &mut dyn CommandExecutor) -> Dispatched {
        self.finish_selection(&[], executor)
    }

    /// Dispatch a binding the host has already built
    ///
    /// Events only ever produce single-part bindings; a chord value here is a
    /// broken precondition and is logged and left unhandled.
    pub fn handle_binding(
        &mut self,
        binding: &ResolvedBinding,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        if binding.is_chord() {
            tracing::warn!(
                "Refusing to dispatch chord value {} as a single input",
                binding
            );
            return Dispatched::Unhandled;
        }

        self.expire_stale_chord(now);

        let dispatch = binding.first().dispatch_string();
        let is_keyboard = matches!(binding, ResolvedBinding::Keyboard { .. });

        // Clicks and drags never take part in chords
        if is_keyboard {
            if let Some(state) = self.chord.take() {
                return self.finish_chord(state, &dispatch, binding, args, ctx, executor);
            }
        }

        match self.resolver.resolve(ctx, None, &dispatch) {
            None => Dispatched::Unhandled,
            Some(ResolveOutcome::Removed) => {
                tracing::debug!("{} is unbound", dispatch);
                Dispatched::Unhandled
            }
            Some(ResolveOutcome::EnterChord) if is_keyboard => {
                self.enter_chord(dispatch, binding.label(), now);
                Dispatched::ChordPending
            }
            Some(ResolveOutcome::EnterChord) => {
                tracing::debug!("{} cannot start a chord", dispatch);
                Dispatched::Unhandled
            }
            Some(ResolveOutcome::Execute(matched)) => self.execute(&matched, args, executor),
        }
    }

    /// Liveness check; call at [`Dispatcher::next_wakeup`] while a chord is pending
    ///
    /// Leaves chord mode when the host lost focus or the chord timed out.
    pub fn tick(&mut self, now: Instant, has_focus: bool) -> Option<ChordExit> {
        if !has_focus {
            // Key-up events are lost while unfocused
            self.held.clear();
        }

        let timing = self.timing;
        let state = self.chord.pending_mut()?;
        let exit = if !has_focus {
            ChordExit::FocusLost
        } else if state.is_expired(now, timing.timeout) {
            ChordExit::TimedOut
        } else {
            state.schedule_tick(now, timing.tick);
            return None;
        };

        self.leave_chord(exit);
        Some(exit)
    }

    /// When the host should next call [`Dispatcher::tick`], if at all
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.chord.pending().map(|state| state.next_tick())
    }

    /// Drop chord mode, any gesture in progress and held-key tracking
    pub fn reset(&mut self) {
        if self.chord.is_pending() {
            self.leave_chord(ChordExit::Reset);
        }
        self.selection.cancel();
        self.held.clear();
        self.consumed.clear();
    }

    pub fn is_chord_pending(&self) -> bool {
        self.chord.is_pending()
    }

    /// The chord in progress, if any
    pub fn pending_chord(&self) -> Option<&ChordState> {
        self.chord.pending()
    }

    pub fn is_selection_active(&self) -> bool {
        self.selection.is_active()
    }

    /// Drain notifications emitted since the last call
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn key_down(
        &mut self,
        event: &KeyEvent,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        let id = event.identity();
        if event.repeat || self.held.contains(&id) {
            tracing::trace!(key = %event.key, repeat = event.repeat, "dropping key repeat");
            return Dispatched::Filtered {
                prevent_default: self.consumed.get(&id).copied().unwrap_or(false),
            };
        }

        let binding = ResolvedBinding::key(event.binding());
        let result = self.handle_binding(&binding, args, ctx, executor, now);
        self.consumed.insert(id, result.prevents_default());
        if self.track_key_up {
            self.held.insert(id);
        }
        result
    }

    fn click(
        &mut self,
        event: &ClickEvent,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        let binding = ResolvedBinding::Mouse(event.binding());
        self.handle_binding(&binding, args, ctx, executor, now)
    }

    fn drag(
        &mut self,
        event: &DragEvent,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
        now: Instant,
    ) -> Dispatched {
        match event.phase {
            GesturePhase::Start => self.begin_selection(event.mods, event.button, ctx, now),
            GesturePhase::End => self.finish_selection(args, executor),
            GesturePhase::Cancel => self.cancel_selection(),
        }
    }

    fn finish_selection(
        &mut self,
        args: &[Value],
        executor: &mut dyn CommandExecutor,
    ) -> Dispatched {
        match self.selection.take_pending() {
            Some(pending) => self.execute(&pending.command, args, executor),
            None => Dispatched::Unhandled,
        }
    }

    fn finish_chord(
        &mut self,
        state: ChordState,
        dispatch: &str,
        binding: &ResolvedBinding,
        args: &[Value],
        ctx: &dyn ContextLookup,
        executor: &mut dyn CommandExecutor,
    ) -> Dispatched {
        tracing::debug!(prefix = %state.prefix, exit = ?ChordExit::SecondKey, "leaving chord mode");
        self.events.push(EngineEvent::ChordCleared);

        match self.resolver.resolve(ctx, Some(&state.prefix), dispatch) {
            Some(ResolveOutcome::Execute(matched)) => self.execute(&matched, args, executor),
            _ => {
                tracing::debug!("{} {} is not a command", state.prefix, dispatch);
                self.events.push(EngineEvent::NotACommand {
                    first: state.label,
                    second: binding.label(),
                });
                Dispatched::ChordAborted
            }
        }
    }

    /// Enter chord mode, replacing any attempt already in progress
    fn enter_chord(&mut self, prefix: String, label: String, now: Instant) {
        tracing::debug!(%prefix, "entering chord mode");
        let state = ChordState::new(prefix, label.clone(), now, self.timing);
        if let Some(previous) = self.chord.enter(state) {
            tracing::debug!(prefix = %previous.prefix, "replaced pending chord");
        }
        self.events.push(EngineEvent::ChordStarted { label });
    }

    fn leave_chord(&mut self, exit: ChordExit) {
        if let Some(state) = self.chord.take() {
            tracing::debug!(prefix = %state.prefix, ?exit, "leaving chord mode");
            self.events.push(EngineEvent::ChordCleared);
        }
    }

    /// Lazily apply the timeout so a late tick cannot let an expired chord
    /// swallow the next key
    fn expire_stale_chord(&mut self, now: Instant) {
        let expired = self
            .chord
            .pending()
            .is_some_and(|state| state.is_expired(now, self.timing.timeout));
        if expired {
            self.leave_chord(ChordExit::TimedOut);
        }
    }

    fn execute(
        &mut self,
        matched: &CommandMatch,
        args: &[Value],
        executor: &mut dyn CommandExecutor,
    ) -> Dispatched {
        let outcome = run_command(matched, args, executor, &mut self.events);
        let command = matched.command.clone();
        let bubble = matched.bubble;
        match outcome {
            ExecOutcome::Executed => Dispatched::Executed { command, bubble },
            ExecOutcome::Failed | ExecOutcome::ArgumentsRejected => {
                Dispatched::Failed { command, bubble }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::execute::CommandError;
    use crate::keymap::{ContextSnapshot, KeyBinding, ResolveRule};
    use std::time::Duration;

    fn ctrl(c: char) -> KeyBinding {
        KeyBinding::char_with_mods(c, Modifiers::CTRL)
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(Resolver::with_rules(vec![
            ResolveRule::new(ResolvedBinding::chord(ctrl('k'), ctrl('s')), "saveAll"),
            ResolveRule::new(ctrl('s'), "save"),
        ])))
    }

    fn noop() -> impl FnMut(&str, Vec<Value>) -> Result<(), CommandError> {
        |_: &str, _: Vec<Value>| Ok(())
    }

    #[test]
    fn test_enter_chord_twice_replaces() {
        let mut d = dispatcher();
        let start = Instant::now();
        let later = start + Duration::from_millis(4000);

        d.enter_chord("ctrl+k".to_string(), "Ctrl+K".to_string(), start);
        d.enter_chord("ctrl+k".to_string(), "Ctrl+K".to_string(), later);

        let state = d.pending_chord().unwrap();
        assert_eq!(state.entered_at, later);
        assert_eq!(d.next_wakeup(), Some(later + d.timing().tick));

        // Timed from the second entry, not the first
        assert_eq!(d.tick(start + Duration::from_millis(5500), true), None);
        assert!(d.is_chord_pending());

        // A single clear leaves nothing behind
        d.reset();
        assert!(!d.is_chord_pending());
        assert_eq!(d.next_wakeup(), None);
    }

    #[test]
    fn test_chord_value_is_not_dispatched() {
        let mut d = dispatcher();
        let mut exec = noop();
        let result = d.handle_binding(
            &ResolvedBinding::chord(ctrl('k'), ctrl('s')),
            &[],
            &ContextSnapshot::new(),
            &mut exec,
            Instant::now(),
        );
        assert_eq!(result, Dispatched::Unhandled);
        assert!(!d.is_chord_pending());
        assert!(d.take_events().is_empty());
    }

    #[test]
    fn test_prevents_default() {
        assert!(!Dispatched::Unhandled.prevents_default());
        assert!(Dispatched::ChordPending.prevents_default());
        assert!(Dispatched::ChordAborted.prevents_default());
        assert!(Dispatched::Executed {
            command: "x".into(),
            bubble: false
        }
        .prevents_default());
        assert!(!Dispatched::Executed {
            command: "x".into(),
            bubble: true
        }
        .prevents_default());
        assert!(!Dispatched::Filtered {
            prevent_default: false
        }
        .prevents_default());
    }

    #[test]
    fn test_repeat_flag_keeps_first_press_handling() {
        let mut d = dispatcher();
        let mut exec = noop();
        let ctx = ContextSnapshot::new();
        let now = Instant::now();
        let save = KeyEvent::char('s', Modifiers::CTRL);

        assert!(matches!(
            d.handle_key_down(&save, &ctx, &mut exec, now),
            Dispatched::Executed { .. }
        ));
        assert_eq!(
            d.handle_key_down(&save.repeated(), &ctx, &mut exec, now),
            Dispatched::Filtered {
                prevent_default: true
            }
        );

        // Unbound keys repeat through to the host
        let plain = KeyEvent::char('a', Modifiers::NONE);
        d.handle_key_down(&plain, &ctx, &mut exec, now);
        assert!(!d
            .handle_key_down(&plain.repeated(), &ctx, &mut exec, now)
            .prevents_default());
    }

    #[test]
    fn test_presses_without_key_up_all_dispatch() {
        let mut d = dispatcher();
        assert!(!d.tracks_key_up());
        let mut exec = noop();
        let ctx = ContextSnapshot::new();
        let now = Instant::now();
        let save = KeyEvent::char('s', Modifiers::CTRL);

        for _ in 0..3 {
            assert!(matches!(
                d.handle_key_down(&save, &ctx, &mut exec, now),
                Dispatched::Executed { .. }
            ));
        }
    }

    #[test]
    fn test_tracked_held_key_is_filtered_until_released() {
        let mut d = dispatcher().tracking_key_up(true);
        let mut exec = noop();
        let ctx = ContextSnapshot::new();
        let now = Instant::now();
        let save = KeyEvent::char('s', Modifiers::CTRL);

        d.handle_key_down(&save, &ctx, &mut exec, now);
        assert_eq!(
            d.handle_key_down(&save, &ctx, &mut exec, now),
            Dispatched::Filtered {
                prevent_default: true
            }
        );

        d.handle_key_up(&save);
        assert!(matches!(
            d.handle_key_down(&save, &ctx, &mut exec, now),
            Dispatched::Executed { .. }
        ));
    }

    #[test]
    fn test_release_with_other_shift_state_frees_key() {
        let mut d = Dispatcher::new(Arc::new(Resolver::with_rules(vec![ResolveRule::new(
            KeyBinding::char_with_mods('!', Modifiers::SHIFT),
            "bang",
        )])))
        .tracking_key_up(true);
        let mut exec = noop();
        let ctx = ContextSnapshot::new();
        let now = Instant::now();

        d.handle_key_down(&KeyEvent::char('!', Modifiers::SHIFT), &ctx, &mut exec, now);
        // Shift let go first, so the release reports the unshifted key
        d.handle_key_up(&KeyEvent::char('1', Modifiers::NONE));
        assert!(matches!(
            d.handle_key_down(&KeyEvent::char('!', Modifiers::SHIFT), &ctx, &mut exec, now),
            Dispatched::Executed { .. }
        ));
    }

    #[test]
    fn test_focus_loss_releases_held_keys() {
        let mut d = dispatcher().tracking_key_up(true);
        let mut exec = noop();
        let ctx = ContextSnapshot::new();
        let now = Instant::now();
        let save = KeyEvent::char('s', Modifiers::CTRL);

        d.handle_key_down(&save, &ctx, &mut exec, now);
        assert_eq!(d.tick(now, false), None);
        assert!(matches!(
            d.handle_key_down(&save, &ctx, &mut exec, now),
            Dispatched::Executed { .. }
        ));
    }
}
