//! Mouse click and drag-selection dispatch tests

mod common;

use std::time::Instant;

use common::{at, click, ctrl, drag, editor_ctx, empty_ctx, press, resolver, Recorder};
use keydispatch::dispatch::{Dispatched, Dispatcher, GesturePhase};
use keydispatch::keymap::{ContextSnapshot, Modifiers, MouseButton};

const KEYMAP: &str = r#"
bindings:
  - key: "ctrl+k ctrl+s"
    command: file.saveAll
  - key: "mouse LMB"
    times: 2
    command: editor.selectWord
  - key: "mouse LMB*3"
    command: editor.selectLine
  - key: "mouse ctrl+LMB"
    command: editor.addCursor
    when: editorFocus
  - key: "mouse MMB"
    command: ~
  - key: "selection alt+LMB"
    command: editor.columnSelect
  - key: "selection shift+LMB"
    command: editor.extendSelection
    when: hasSelection
"#;

fn dispatcher() -> Dispatcher {
    Dispatcher::new(resolver(KEYMAP))
}

// ========================================================================
// Clicks
// ========================================================================

#[test]
fn test_double_click_matches_click_count() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let now = Instant::now();
    let ctx = empty_ctx();

    let single = d.handle(&click(MouseButton::Left, Modifiers::NONE, 1), &ctx, &mut exec, now);
    assert_eq!(single, Dispatched::Unhandled);

    d.handle(&click(MouseButton::Left, Modifiers::NONE, 2), &ctx, &mut exec, now);
    d.handle(&click(MouseButton::Left, Modifiers::NONE, 3), &ctx, &mut exec, now);
    assert_eq!(exec.commands(), vec!["editor.selectWord", "editor.selectLine"]);

    // Four clicks is its own binding and nothing claims it
    let quad = d.handle(&click(MouseButton::Left, Modifiers::NONE, 4), &ctx, &mut exec, now);
    assert_eq!(quad, Dispatched::Unhandled);
}

#[test]
fn test_click_modifiers_and_condition() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let now = Instant::now();
    let event = click(MouseButton::Left, Modifiers::CTRL, 1);

    assert_eq!(d.handle(&event, &empty_ctx(), &mut exec, now), Dispatched::Unhandled);
    d.handle(&event, &editor_ctx(), &mut exec, now);

    assert_eq!(exec.commands(), vec!["editor.addCursor"]);
}

#[test]
fn test_removed_click_is_unhandled() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();

    let result = d.handle(
        &click(MouseButton::Middle, Modifiers::NONE, 1),
        &empty_ctx(),
        &mut exec,
        Instant::now(),
    );

    assert_eq!(result, Dispatched::Unhandled);
    assert!(exec.calls.is_empty());
}

#[test]
fn test_clicks_do_not_affect_chord_mode() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let start = Instant::now();
    let ctx = empty_ctx();

    press(&mut d, ctrl('k'), &ctx, &mut exec, start);
    assert!(d.is_chord_pending());

    d.handle(&click(MouseButton::Left, Modifiers::NONE, 2), &ctx, &mut exec, at(start, 10));
    assert!(d.is_chord_pending());

    press(&mut d, ctrl('s'), &ctx, &mut exec, at(start, 20));
    assert_eq!(exec.commands(), vec!["editor.selectWord", "file.saveAll"]);
}

// ========================================================================
// Selection gestures
// ========================================================================

#[test]
fn test_selection_runs_once_on_release() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let now = Instant::now();
    let ctx = empty_ctx();

    let start = d.handle(
        &drag(GesturePhase::Start, MouseButton::Left, Modifiers::ALT),
        &ctx,
        &mut exec,
        now,
    );
    assert_eq!(start, Dispatched::SelectionArmed);
    assert!(start.prevents_default());
    assert!(d.is_selection_active());
    assert!(exec.calls.is_empty());

    let end = drag(GesturePhase::End, MouseButton::Left, Modifiers::ALT);
    assert_eq!(
        d.handle(&end, &ctx, &mut exec, at(now, 300)),
        Dispatched::Executed {
            command: "editor.columnSelect".to_string(),
            bubble: false
        }
    );
    assert!(!d.is_selection_active());

    // A stray second release does nothing
    assert_eq!(d.handle(&end, &ctx, &mut exec, at(now, 310)), Dispatched::Unhandled);
    assert_eq!(exec.commands(), vec!["editor.columnSelect"]);
}

#[test]
fn test_cancelled_selection_never_runs() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let now = Instant::now();
    let ctx = empty_ctx();

    d.handle(
        &drag(GesturePhase::Start, MouseButton::Left, Modifiers::ALT),
        &ctx,
        &mut exec,
        now,
    );
    d.handle(
        &drag(GesturePhase::Cancel, MouseButton::Left, Modifiers::ALT),
        &ctx,
        &mut exec,
        now,
    );
    d.handle(
        &drag(GesturePhase::End, MouseButton::Left, Modifiers::ALT),
        &ctx,
        &mut exec,
        now,
    );

    assert!(exec.calls.is_empty());
    assert!(!d.is_selection_active());
}

#[test]
fn test_selection_condition_captured_at_start() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();
    let now = Instant::now();
    let with_selection = ContextSnapshot::new().with("hasSelection", true);

    // No match without a selection
    assert_eq!(
        d.begin_selection(Modifiers::SHIFT, MouseButton::Left, &empty_ctx(), now),
        Dispatched::Unhandled
    );

    assert_eq!(
        d.begin_selection(Modifiers::SHIFT, MouseButton::Left, &with_selection, now),
        Dispatched::SelectionArmed
    );
    // The context changing mid-drag does not matter
    d.complete_selection(&mut exec);
    assert_eq!(exec.commands(), vec!["editor.extendSelection"]);
}

#[test]
fn test_unmatched_drag_is_unhandled() {
    let mut d = dispatcher();
    let mut exec = Recorder::default();

    let result = d.handle(
        &drag(GesturePhase::Start, MouseButton::Right, Modifiers::NONE),
        &empty_ctx(),
        &mut exec,
        Instant::now(),
    );

    assert_eq!(result, Dispatched::Unhandled);
    assert!(!d.is_selection_active());
    assert_eq!(d.complete_selection(&mut exec), Dispatched::Unhandled);
    assert!(exec.calls.is_empty());
}
