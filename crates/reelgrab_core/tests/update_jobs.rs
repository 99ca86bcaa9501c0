use reelgrab_core::{
    update, AppState, Effect, LogLine, Msg, ProgressEvent, SessionState, STATUS_DONE,
};

fn running_state() -> AppState {
    let (state, _) = update(AppState::new(), Msg::ItemsChanged("https://x/a\n".to_string()));
    let (mut state, effects) = update(state, Msg::StartClicked);
    assert!(matches!(effects.as_slice(), [Effect::StartBatch(_)]));
    assert!(state.consume_dirty());
    state
}

fn progress(state: AppState, event: ProgressEvent) -> AppState {
    let (state, effects) = update(state, Msg::Progress(event));
    assert!(effects.is_empty());
    state
}

#[test]
fn log_events_accumulate_in_order() {
    let mut state = running_state();
    state = progress(state, ProgressEvent::Log(LogLine::info("Output: .")));
    state = progress(state, ProgressEvent::Log(LogLine::error("boom")));
    state = progress(state, ProgressEvent::Log(LogLine::info("[1/1] https://x/a")));

    let view = state.view();
    let texts: Vec<_> = view.logs.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["Start", "Output: .", "boom", "[1/1] https://x/a"]);
    assert_eq!(view.error_count, 1);
}

#[test]
fn status_events_replace_status_text() {
    let mut state = running_state();
    state = progress(state, ProgressEvent::Status("downloading… 1.0MiB/s".into()));
    assert_eq!(state.view().status, "downloading… 1.0MiB/s");
    assert!(state.consume_dirty());

    state = progress(state, ProgressEvent::Status(STATUS_DONE.into()));
    assert_eq!(state.view().status, STATUS_DONE);
}

#[test]
fn done_clears_busy_exactly_once() {
    let mut state = running_state();
    assert!(state.view().busy);

    state = progress(state, ProgressEvent::Done);
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.session, SessionState::Idle);
    assert_eq!(view.batches_finished, 1);
    assert!(state.consume_dirty());

    state = progress(state, ProgressEvent::Done);
    assert_eq!(state.view().batches_finished, 1);
    assert!(!state.consume_dirty());
}

#[test]
fn done_after_cancel_returns_to_idle() {
    let state = running_state();
    let (state, _) = update(state, Msg::CancelClicked);
    assert_eq!(state.session(), SessionState::Cancelling);

    let state = progress(state, ProgressEvent::Done);
    assert_eq!(state.session(), SessionState::Idle);
    assert!(!state.view().busy);
}
