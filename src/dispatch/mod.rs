//! Dispatch engine: turns normalized input events into command invocations
//!
//! # Architecture
//!
//! ```text
//! InputEvent → Dispatcher ─┬─ ChordMode (Idle | AwaitingChordSecondKey)
//!                          ├─ SelectionTracker (NoGesture | ActiveGesture)
//!                          └─ Resolver::resolve() → CommandExecutor::execute()
//!                                                 → EngineEvent (host renders)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut dispatcher = Dispatcher::new(Arc::new(load_resolver(true)));
//! let result = dispatcher.handle(&event, &context, &mut executor, Instant::now());
//! if result.prevents_default() {
//!     // swallow the platform event
//! }
//! for event in dispatcher.take_events() {
//!     // show chord status, "not a command" toasts, failures
//! }
//! ```

mod chord;
mod dispatcher;
mod event;
mod execute;
mod selection;

pub use chord::{
    ChordExit, ChordMode, ChordState, ChordTiming, DEFAULT_CHORD_TICK, DEFAULT_CHORD_TIMEOUT,
};
pub use dispatcher::{Dispatched, Dispatcher};
pub use event::{
    might_produce_printable_character, ActionSource, ClickEvent, DragEvent, EngineEvent,
    GesturePhase, InputEvent, KeyEvent,
};
pub use execute::{merge_args, ArgsError, CommandError, CommandExecutor, ExecOutcome};
pub use selection::{PendingSelection, SelectionTracker};
