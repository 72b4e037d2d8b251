//! Chord mode: the state held between the first and second key of a chord
//!
//! ```text
//! ┌──────┐  first key resolves to a chord   ┌────────────────────────┐
//! │ Idle │ ────────────────────────────────▶ │ AwaitingChordSecondKey │
//! └──────┘ ◀──────────────────────────────── └────────────────────────┘
//!            second key, timeout, focus loss,
//!            or reset
//! ```
//!
//! The liveness deadline lives inside [`ChordState`], so leaving chord mode
//! drops the timer along with the state.

use std::time::{Duration, Instant};

/// Default time allowed between the two keys of a chord
pub const DEFAULT_CHORD_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default interval of the chord liveness check
pub const DEFAULT_CHORD_TICK: Duration = Duration::from_millis(500);

/// Timing parameters for chord mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChordTiming {
    pub timeout: Duration,
    pub tick: Duration,
}

impl Default for ChordTiming {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CHORD_TIMEOUT,
            tick: DEFAULT_CHORD_TICK,
        }
    }
}

/// One in-progress chord attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordState {
    /// Dispatch string of the first key
    pub prefix: String,
    /// Display label of the first key
    pub label: String,
    pub entered_at: Instant,
    next_tick: Instant,
}

impl ChordState {
    pub fn new(prefix: String, label: String, now: Instant, timing: ChordTiming) -> Self {
        Self {
            prefix,
            label,
            entered_at: now,
            next_tick: now + timing.tick,
        }
    }

    /// Elapsed time strictly exceeds the timeout
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.entered_at) > timeout
    }

    /// When the host should next call `tick`
    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }

    pub(crate) fn schedule_tick(&mut self, now: Instant, tick: Duration) {
        self.next_tick = now + tick;
    }
}

/// Why chord mode was left without running a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChordExit {
    /// The second key completed (or failed to complete) the chord
    SecondKey,
    TimedOut,
    FocusLost,
    Reset,
}

/// Dispatcher chord state; each variant carries only the data valid in it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChordMode {
    #[default]
    Idle,
    AwaitingChordSecondKey(ChordState),
}

impl ChordMode {
    /// Enter chord mode, returning the attempt it replaced, if any
    pub fn enter(&mut self, state: ChordState) -> Option<ChordState> {
        match std::mem::replace(self, ChordMode::AwaitingChordSecondKey(state)) {
            ChordMode::Idle => None,
            ChordMode::AwaitingChordSecondKey(previous) => Some(previous),
        }
    }

    /// Leave chord mode, returning the attempt in progress, if any
    pub fn take(&mut self) -> Option<ChordState> {
        match std::mem::take(self) {
            ChordMode::Idle => None,
            ChordMode::AwaitingChordSecondKey(state) => Some(state),
        }
    }

    pub fn pending(&self) -> Option<&ChordState> {
        match self {
            ChordMode::Idle => None,
            ChordMode::AwaitingChordSecondKey(state) => Some(state),
        }
    }

    pub fn pending_mut(&mut self) -> Option<&mut ChordState> {
        match self {
            ChordMode::Idle => None,
            ChordMode::AwaitingChordSecondKey(state) => Some(state),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ChordMode::AwaitingChordSecondKey(_))
    }
}
