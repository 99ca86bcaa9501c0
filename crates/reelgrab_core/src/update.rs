use crate::{AppState, Effect, Msg, ProgressEvent, SessionState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::CollectionRefChanged(text) => {
            state.form_mut().collection_ref = text;
            Vec::new()
        }
        Msg::ItemsChanged(text) => {
            state.form_mut().items_text = text;
            Vec::new()
        }
        Msg::OutputDirChanged(dir) => {
            state.form_mut().output_dir = dir;
            Vec::new()
        }
        Msg::QualityChanged(quality) => {
            state.form_mut().quality = quality;
            Vec::new()
        }
        Msg::MaxItemsChanged(max_items) => {
            state.form_mut().max_items = max_items;
            Vec::new()
        }
        Msg::ArchiveToggled(enabled) => {
            state.form_mut().archive_disabled = !enabled;
            Vec::new()
        }
        Msg::ArchivePathChanged(path) => {
            state.form_mut().archive_path = path;
            Vec::new()
        }
        Msg::CredentialFileChanged(path) => {
            state.form_mut().credential_file = path;
            Vec::new()
        }
        Msg::StartClicked => {
            // A second runner against the same output dir/archive is never spawned.
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            match state.build_job() {
                Ok(job) => {
                    state.start_session();
                    vec![Effect::StartBatch(job)]
                }
                Err(err) => {
                    state.set_notice(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::CancelClicked => {
            if state.session() == SessionState::Running {
                state.begin_cancel();
                vec![Effect::RequestCancel]
            } else {
                Vec::new()
            }
        }
        Msg::StartFailed(message) => {
            state.abort_start(message);
            Vec::new()
        }
        Msg::Progress(event) => {
            apply_progress(&mut state, event);
            Vec::new()
        }
    };

    (state, effects)
}

fn apply_progress(state: &mut AppState, event: ProgressEvent) {
    match event {
        ProgressEvent::Log(line) => state.push_log(line),
        ProgressEvent::Status(status) => state.set_status(status),
        ProgressEvent::Done => state.finish_session(),
    }
}
