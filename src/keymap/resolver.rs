//! Resolver table: ordered rules plus lookup indexes
//!
//! Later rules win over earlier ones, so user rules are registered after the
//! defaults they override.

use std::collections::HashMap;

use serde_json::Value;

use super::context::ContextLookup;
use super::rule::ResolveRule;

/// A command chosen by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMatch {
    pub command: String,
    pub args: Option<Value>,
    pub bubble: bool,
}

/// Result of resolving one dispatch string
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// Dispatch string is the first half of a chord; await the second key
    EnterChord,
    /// Execute this command
    Execute(CommandMatch),
    /// The winning rule removes the binding; no fallback to earlier rules
    Removed,
}

/// The resolver stores all rules and answers lookups against a context
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    /// All registered rules, in registration order
    rules: Vec<ResolveRule>,
    /// First dispatch part -> indices into rules, ascending
    by_first: HashMap<String, Vec<usize>>,
    /// Command id -> indices into rules, ascending
    by_command: HashMap<String, Vec<usize>>,
}

impl Resolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with the given rules, in priority order (last wins)
    pub fn with_rules(rules: Vec<ResolveRule>) -> Self {
        let mut resolver = Self::new();
        for rule in rules {
            resolver.add_rule(rule);
        }
        resolver
    }

    /// Register a rule with higher priority than every rule before it
    pub fn add_rule(&mut self, rule: ResolveRule) {
        let idx = self.rules.len();
        self.by_first
            .entry(rule.first_part().to_string())
            .or_default()
            .push(idx);
        if let Some(command) = &rule.command {
            self.by_command.entry(command.clone()).or_default().push(idx);
        }
        self.rules.push(rule);
    }

    /// Resolve a dispatch string, optionally as the second half of a chord
    ///
    /// With no prefix, rules whose first part equals `dispatch` compete; a winning
    /// chord rule (or a single-part rule asking to continue as a chord) yields
    /// [`ResolveOutcome::EnterChord`]. With a prefix, only chord rules
    /// `prefix dispatch` compete.
    pub fn resolve(
        &self,
        ctx: &dyn ContextLookup,
        prefix: Option<&str>,
        dispatch: &str,
    ) -> Option<ResolveOutcome> {
        let outcome = match prefix {
            None => self.resolve_first(ctx, dispatch),
            Some(prefix) => self.resolve_chord(ctx, prefix, dispatch),
        };
        tracing::trace!(?prefix, dispatch, ?outcome, "resolve");
        outcome
    }

    fn resolve_first(&self, ctx: &dyn ContextLookup, dispatch: &str) -> Option<ResolveOutcome> {
        let indices = self.by_first.get(dispatch)?;
        let winner = self.live_rules(indices, ctx).next()?;

        if winner.is_chord() {
            return Some(ResolveOutcome::EnterChord);
        }

        if winner.continue_as_chord && self.has_live_chord(indices, ctx) {
            return Some(ResolveOutcome::EnterChord);
        }

        Some(Self::outcome_for(winner))
    }

    /// Applicable rules, highest priority first, without chord rules that a
    /// later chord removal unbinds
    ///
    /// Chord removals only act on the second key, so they never surface here.
    fn live_rules<'a>(
        &'a self,
        indices: &'a [usize],
        ctx: &'a dyn ContextLookup,
    ) -> impl Iterator<Item = &'a ResolveRule> + 'a {
        let mut removed: Vec<&'a str> = Vec::new();
        indices
            .iter()
            .rev()
            .map(move |&idx| &self.rules[idx])
            .filter(move |rule| rule.applies(ctx))
            .filter(move |&rule| match rule.chord_part() {
                Some(part) if rule.is_removal() => {
                    removed.push(part);
                    false
                }
                Some(part) => !removed.contains(&part),
                None => true,
            })
    }

    fn resolve_chord(
        &self,
        ctx: &dyn ContextLookup,
        prefix: &str,
        dispatch: &str,
    ) -> Option<ResolveOutcome> {
        let indices = self.by_first.get(prefix)?;
        indices
            .iter()
            .rev()
            .map(|&idx| &self.rules[idx])
            .find(|rule| rule.chord_part() == Some(dispatch) && rule.applies(ctx))
            .map(Self::outcome_for)
    }

    /// Whether any applicable, unremoved chord rule starts with this key
    fn has_live_chord(&self, indices: &[usize], ctx: &dyn ContextLookup) -> bool {
        self.live_rules(indices, ctx).any(|rule| rule.is_chord())
    }

    fn outcome_for(rule: &ResolveRule) -> ResolveOutcome {
        match &rule.command {
            Some(command) => ResolveOutcome::Execute(CommandMatch {
                command: command.clone(),
                args: rule.args.clone(),
                bubble: rule.bubble,
            }),
            None => ResolveOutcome::Removed,
        }
    }

    /// Get all rules
    pub fn rules(&self) -> &[ResolveRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules bound to a command, in registration order
    pub fn bindings_for(&self, command: &str) -> Vec<&ResolveRule> {
        self.by_command
            .get(command)
            .map(|indices| indices.iter().map(|&idx| &self.rules[idx]).collect())
            .unwrap_or_default()
    }

    /// The highest-priority (last registered) rule for a command
    pub fn preferred_binding_for(&self, command: &str) -> Option<&ResolveRule> {
        let idx = *self.by_command.get(command)?.last()?;
        self.rules.get(idx)
    }

    /// Get display label for a command's preferred binding
    pub fn label_for(&self, command: &str) -> Option<String> {
        self.preferred_binding_for(command)
            .map(|rule| rule.display_string())
    }
}
