use std::path::PathBuf;

use reelgrab_core::{
    update, AppState, Effect, Job, Msg, QualitySelection, SessionState, Target, STATUS_CANCELLING,
};

fn apply(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    let mut all = Vec::new();
    let mut state = state;
    for msg in msgs {
        let (next, effects) = update(state, msg);
        state = next;
        all.extend(effects);
    }
    (state, all)
}

fn started_job(effects: &[Effect]) -> &Job {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartBatch(job) => Some(job),
            _ => None,
        })
        .expect("start effect")
}

#[test]
fn start_without_targets_sets_notice_and_stays_idle() {
    let (mut state, effects) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("  \n\n".to_string()), Msg::StartClicked],
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert!(!view.busy);
    assert!(view.notice.is_some());
    assert!(state.consume_dirty());
}

#[test]
fn start_freezes_form_into_a_job() {
    let (state, effects) = apply(
        AppState::new(),
        vec![
            Msg::CollectionRefChanged(" https://x/@c ".to_string()),
            Msg::ItemsChanged("https://x/a \n\n https://x/b\n".to_string()),
            Msg::OutputDirChanged("/data/clips".to_string()),
            Msg::QualityChanged(QualitySelection::Mp4Only),
            Msg::MaxItemsChanged(10),
            Msg::CredentialFileChanged("cookies.txt".to_string()),
            Msg::StartClicked,
        ],
    );

    assert_eq!(effects.len(), 1);
    let job = started_job(&effects);
    assert_eq!(
        job.targets(),
        &[
            Target::Collection("https://x/@c".to_string()),
            Target::Item("https://x/a".to_string()),
            Target::Item("https://x/b".to_string()),
        ]
    );
    let config = job.config();
    assert_eq!(config.output_dir(), PathBuf::from("/data/clips").as_path());
    assert_eq!(config.quality(), QualitySelection::Mp4Only);
    assert_eq!(config.item_ceiling(), Some(10));
    assert_eq!(
        config.effective_archive_path(),
        Some(PathBuf::from("/data/clips/downloaded_archive.txt"))
    );
    assert_eq!(
        config.credential_file(),
        Some(PathBuf::from("cookies.txt").as_path())
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert!(view.busy);
    assert_eq!(view.logs[0].text, "Start");
}

#[test]
fn blank_output_dir_defaults_to_current_dir() {
    let (_, effects) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("https://x/a".to_string()), Msg::StartClicked],
    );
    assert_eq!(started_job(&effects).config().output_dir(), PathBuf::from(".").as_path());
}

#[test]
fn archive_toggle_off_disables_archive() {
    let (_, effects) = apply(
        AppState::new(),
        vec![
            Msg::ItemsChanged("https://x/a".to_string()),
            Msg::ArchiveToggled(false),
            Msg::StartClicked,
        ],
    );
    assert_eq!(started_job(&effects).config().effective_archive_path(), None);
}

#[test]
fn second_start_while_running_is_noop() {
    let (state, effects) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("https://x/a".to_string()), Msg::StartClicked],
    );
    assert_eq!(effects.len(), 1);

    let before = state.view();
    let (state, effects) = update(state, Msg::StartClicked);
    assert!(effects.is_empty());
    assert_eq!(state.view().logs, before.logs);
    assert_eq!(state.session(), SessionState::Running);
}

#[test]
fn form_edits_after_start_do_not_touch_the_running_job() {
    let (state, effects) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("https://x/a".to_string()), Msg::StartClicked],
    );
    let job = started_job(&effects).clone();

    let (state, effects) = update(state, Msg::QualityChanged(QualitySelection::Max720p));
    assert!(effects.is_empty());
    assert_eq!(job.config().quality(), QualitySelection::Best);
    assert_eq!(state.form().quality, QualitySelection::Max720p);
}

#[test]
fn cancel_while_running_requests_cancel_once() {
    let (state, _) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("https://x/a".to_string()), Msg::StartClicked],
    );

    let (state, effects) = update(state, Msg::CancelClicked);
    assert_eq!(effects, vec![Effect::RequestCancel]);
    assert_eq!(state.session(), SessionState::Cancelling);
    assert_eq!(state.view().status, STATUS_CANCELLING);

    let (state, effects) = update(state, Msg::CancelClicked);
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Cancelling);
}

#[test]
fn cancel_while_idle_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::CancelClicked);
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn start_failure_returns_to_idle_with_error_log() {
    let (state, _) = apply(
        AppState::new(),
        vec![Msg::ItemsChanged("https://x/a".to_string()), Msg::StartClicked],
    );
    let (state, _) = update(
        state,
        Msg::StartFailed("output directory missing or not writable".to_string()),
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert!(!view.busy);
    assert_eq!(view.error_count, 1);

    // A new batch can be started afterwards.
    let (_, effects) = update(state, Msg::StartClicked);
    assert_eq!(effects.len(), 1);
}
