//! ResolveRule: one entry of the resolver table mapping a binding pattern to a command

use serde_json::Value;

use super::binding::Binding;
use super::context::{ContextLookup, WhenExpr};
use super::resolved::ResolvedBinding;

/// Which layer a rule was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleSource {
    #[default]
    Default,
    User,
}

/// A single rule mapping a binding (or chord) to a command
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRule {
    /// The binding pattern (one part, or two for keyboard chords)
    pub binding: ResolvedBinding,
    /// Condition that must hold for this rule to apply; `None` always matches
    pub when: Option<WhenExpr>,
    /// Command to run; `None` marks an explicit removal
    pub command: Option<String>,
    /// Argument payload passed along with the command
    pub args: Option<Value>,
    /// Let the host's default handling run even when this rule matches
    pub bubble: bool,
    /// When this single-part rule shares its key with chord rules, wait for a second key
    pub continue_as_chord: bool,
    pub source: RuleSource,
    first_part: String,
    chord_part: Option<String>,
}

impl ResolveRule {
    /// Create a rule bound to a command
    pub fn new(binding: impl Into<ResolvedBinding>, command: &str) -> Self {
        Self::with_command(binding.into(), Some(command.to_string()))
    }

    /// Create an explicit removal marker for a binding
    pub fn removal(binding: impl Into<ResolvedBinding>) -> Self {
        Self::with_command(binding.into(), None)
    }

    /// Create a single-part rule that only opens a chord
    pub fn chord_prefix(binding: impl Into<ResolvedBinding>) -> Self {
        let mut rule = Self::with_command(binding.into(), None);
        rule.continue_as_chord = true;
        rule
    }

    fn with_command(binding: ResolvedBinding, command: Option<String>) -> Self {
        let mut parts = binding.dispatch_parts().into_iter();
        let first_part = parts.next().unwrap_or_default();
        let chord_part = parts.next();
        Self {
            binding,
            when: None,
            command,
            args: None,
            bubble: false,
            continue_as_chord: false,
            source: RuleSource::Default,
            first_part,
            chord_part,
        }
    }

    /// Add a condition to this rule (builder pattern)
    pub fn when(mut self, expr: WhenExpr) -> Self {
        self.when = Some(expr);
        self
    }

    /// Attach an argument payload
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    pub fn continue_as_chord(mut self, continue_as_chord: bool) -> Self {
        self.continue_as_chord = continue_as_chord;
        self
    }

    pub fn from_source(mut self, source: RuleSource) -> Self {
        self.source = source;
        self
    }

    /// Dispatch string of the first (or only) part
    pub fn first_part(&self) -> &str {
        &self.first_part
    }

    /// Dispatch string of the second chord part, if any
    pub fn chord_part(&self) -> Option<&str> {
        self.chord_part.as_deref()
    }

    /// Check if this is a two-part chord rule
    pub fn is_chord(&self) -> bool {
        self.chord_part.is_some()
    }

    /// Check if this rule removes a binding instead of running a command
    pub fn is_removal(&self) -> bool {
        self.command.is_none()
    }

    /// First part as a binding value
    pub fn first_binding(&self) -> Binding {
        self.binding.first()
    }

    /// Check the rule's condition against the given context
    pub fn applies(&self, ctx: &dyn ContextLookup) -> bool {
        self.when.as_ref().is_none_or(|expr| expr.evaluate(ctx))
    }

    /// Get display string for this rule's binding
    pub fn display_string(&self) -> String {
        self.binding.label()
    }
}
