//! Command execution: argument composition and the executor contract

use serde_json::Value;
use thiserror::Error;

use super::event::{ActionSource, EngineEvent};
use crate::keymap::CommandMatch;

/// Receives resolved commands
///
/// `execute` is a submit: it must not block on the command finishing. Errors are
/// reported back to the dispatcher, which logs them and carries on.
pub trait CommandExecutor {
    fn execute(&mut self, command: &str, args: Vec<Value>) -> Result<(), CommandError>;
}

impl<F> CommandExecutor for F
where
    F: FnMut(&str, Vec<Value>) -> Result<(), CommandError>,
{
    fn execute(&mut self, command: &str, args: Vec<Value>) -> Result<(), CommandError> {
        self(command, args)
    }
}

/// Failure reported by a command executor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
    #[error("Command failed: {0}")]
    Failed(String),
}

/// Failure composing caller arguments with a rule payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("Placeholder ${{{index}}} has no caller argument ({given} given)")]
    MissingArgument { index: usize, given: usize },
}

/// Compose caller arguments with a rule's stored payload
///
/// - No payload: the caller arguments unchanged
/// - Payload with `"${N}"` placeholders: the payload with each placeholder
///   replaced by caller argument N; caller arguments are not prepended
/// - Otherwise: caller arguments, then the payload
///
/// An array payload contributes its elements as separate arguments.
pub fn merge_args(caller: &[Value], payload: Option<&Value>) -> Result<Vec<Value>, ArgsError> {
    let Some(payload) = payload else {
        return Ok(caller.to_vec());
    };

    if has_placeholder(payload) {
        let substituted = substitute(payload, caller)?;
        return Ok(spread(substituted));
    }

    let mut args = caller.to_vec();
    args.extend(spread(payload.clone()));
    Ok(args)
}

fn spread(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Index named by a whole-string placeholder like `"${0}"`
fn placeholder_index(s: &str) -> Option<usize> {
    s.strip_prefix("${")?.strip_suffix('}')?.parse().ok()
}

fn has_placeholder(value: &Value) -> bool {
    match value {
        Value::String(s) => placeholder_index(s).is_some(),
        Value::Array(items) => items.iter().any(has_placeholder),
        Value::Object(map) => map.values().any(has_placeholder),
        _ => false,
    }
}

fn substitute(value: &Value, caller: &[Value]) -> Result<Value, ArgsError> {
    match value {
        Value::String(s) => match placeholder_index(s) {
            Some(index) => caller.get(index).cloned().ok_or(ArgsError::MissingArgument {
                index,
                given: caller.len(),
            }),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|v| substitute(v, caller))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| substitute(v, caller).map(|v| (k.clone(), v)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object),
        _ => Ok(value.clone()),
    }
}

/// How one execution attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    Executed,
    Failed,
    ArgumentsRejected,
}

/// Run a matched command through the executor
///
/// Callers clear chord and selection state before calling this, so a
/// re-entrant executor sees the engine idle.
pub(crate) fn run_command(
    matched: &CommandMatch,
    caller_args: &[Value],
    executor: &mut dyn CommandExecutor,
    events: &mut Vec<EngineEvent>,
) -> ExecOutcome {
    let args = match merge_args(caller_args, matched.args.as_ref()) {
        Ok(args) => args,
        Err(e) => {
            tracing::warn!("Not running {}: {}", matched.command, e);
            events.push(EngineEvent::ArgumentsRejected {
                command: matched.command.clone(),
                message: e.to_string(),
            });
            return ExecOutcome::ArgumentsRejected;
        }
    };

    match executor.execute(&matched.command, args) {
        Ok(()) => {
            tracing::debug!(command = %matched.command, "executed");
            events.push(EngineEvent::ActionExecuted {
                command: matched.command.clone(),
                source: ActionSource::Keybinding,
            });
            ExecOutcome::Executed
        }
        Err(e) => {
            tracing::warn!("Command {} failed: {}", matched.command, e);
            events.push(EngineEvent::CommandFailed {
                command: matched.command.clone(),
                message: e.to_string(),
            });
            ExecOutcome::Failed
        }
    }
}
