//! Selection-gesture tracker for press-drag-release mouse shortcuts
//!
//! A selection binding is resolved when the drag starts, but its command only
//! runs once the gesture completes. Cancelling the gesture discards it.

use crate::keymap::{
    CommandMatch, ContextLookup, Modifiers, MouseButton, ResolveOutcome, Resolver,
    SelectionBinding,
};

/// The command captured at gesture start
#[derive(Clone, Debug, PartialEq)]
pub struct PendingSelection {
    pub binding: SelectionBinding,
    pub command: CommandMatch,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum GestureState {
    #[default]
    NoGesture,
    ActiveGesture(PendingSelection),
}

#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    state: GestureState,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture; returns whether a selection rule matched
    ///
    /// Selection bindings never chord, so only a rule with a command counts.
    /// Starting a new gesture discards one still in progress.
    pub fn begin(
        &mut self,
        resolver: &Resolver,
        ctx: &dyn ContextLookup,
        mods: Modifiers,
        button: MouseButton,
    ) -> bool {
        if let GestureState::ActiveGesture(stale) = std::mem::take(&mut self.state) {
            tracing::debug!(
                "Discarding unfinished selection gesture {}",
                stale.binding.dispatch_string()
            );
        }

        let binding = SelectionBinding::new(mods, button);
        match resolver.resolve(ctx, None, &binding.dispatch_string()) {
            Some(ResolveOutcome::Execute(command)) => {
                tracing::debug!(
                    "Selection gesture {} armed for {}",
                    binding.dispatch_string(),
                    command.command
                );
                self.state = GestureState::ActiveGesture(PendingSelection { binding, command });
                true
            }
            _ => false,
        }
    }

    /// Abort the gesture without running anything
    pub fn cancel(&mut self) -> Option<PendingSelection> {
        self.take_pending()
    }

    /// Finish the gesture, handing back the command to run, if any
    pub fn take_pending(&mut self) -> Option<PendingSelection> {
        match std::mem::take(&mut self.state) {
            GestureState::NoGesture => None,
            GestureState::ActiveGesture(pending) => Some(pending),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, GestureState::ActiveGesture(_))
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        match &self.state {
            GestureState::NoGesture => None,
            GestureState::ActiveGesture(pending) => Some(pending),
        }
    }
}
