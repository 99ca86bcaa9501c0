use std::path::PathBuf;

use crate::config::{ArchiveSetting, JobConfig};
use crate::event::LogLine;
use crate::format::QualitySelection;
use crate::target::{parse_item_lines, resolve, NoTargetsError};
use crate::view_model::{AppViewModel, FormView};
use crate::Job;

pub const STATUS_READY: &str = "ready";
pub const STATUS_STARTING: &str = "starting…";
pub const STATUS_CANCELLING: &str = "cancelling after the current item…";

/// Controller-side batch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// Cancel requested; waiting for the runner's `Done`.
    Cancelling,
}

/// Raw form input, exactly as typed. Only turned into a `JobConfig` on start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormInput {
    pub collection_ref: String,
    pub items_text: String,
    pub output_dir: String,
    pub quality: QualitySelection,
    pub max_items: u32,
    pub archive_disabled: bool,
    pub archive_path: String,
    pub credential_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    form: FormInput,
    session: SessionState,
    status: String,
    logs: Vec<LogLine>,
    busy: bool,
    notice: Option<String>,
    batches_finished: u32,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            form: FormInput::default(),
            session: SessionState::Idle,
            status: STATUS_READY.to_string(),
            logs: Vec::new(),
            busy: false,
            notice: None,
            batches_finished: 0,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            status: self.status.clone(),
            busy: self.busy,
            logs: self.logs.clone(),
            error_count: self.logs.iter().filter(|line| line.is_error()).count(),
            notice: self.notice.clone(),
            batches_finished: self.batches_finished,
            form: FormView {
                collection_ref: self.form.collection_ref.clone(),
                item_count: parse_item_lines(&self.form.items_text).len(),
                output_dir: self.form.output_dir.clone(),
                quality_label: self.form.quality.label(),
                max_items: self.form.max_items,
                archive_enabled: !self.form.archive_disabled,
            },
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn form(&self) -> &FormInput {
        &self.form
    }

    pub(crate) fn form_mut(&mut self) -> &mut FormInput {
        self.dirty = true;
        &mut self.form
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Resolve targets and freeze the form into a job.
    pub(crate) fn build_job(&self) -> Result<Job, NoTargetsError> {
        let items = parse_item_lines(&self.form.items_text);
        let targets = resolve(Some(self.form.collection_ref.as_str()), &items)?;
        Ok(Job::new(targets, self.build_config()))
    }

    fn build_config(&self) -> JobConfig {
        let form = &self.form;
        let output_dir = non_blank(&form.output_dir).unwrap_or_else(|| PathBuf::from("."));
        JobConfig::new(output_dir)
            .with_quality(form.quality)
            .with_max_items(form.max_items)
            .with_archive(ArchiveSetting {
                enabled: !form.archive_disabled,
                path: non_blank(&form.archive_path),
            })
            .with_credential_file(non_blank(&form.credential_file))
    }

    pub(crate) fn start_session(&mut self) {
        self.session = SessionState::Running;
        self.busy = true;
        self.notice = None;
        self.status = STATUS_STARTING.to_string();
        self.push_log(LogLine::info("Start"));
    }

    pub(crate) fn begin_cancel(&mut self) {
        self.session = SessionState::Cancelling;
        self.status = STATUS_CANCELLING.to_string();
        self.push_log(LogLine::info("Stop requested; finishing after the current item…"));
    }

    /// Clears the busy indicator; only the first `Done` of a batch counts.
    pub(crate) fn finish_session(&mut self) {
        if !self.busy {
            return;
        }
        self.busy = false;
        self.session = SessionState::Idle;
        self.batches_finished += 1;
        self.dirty = true;
    }

    pub(crate) fn abort_start(&mut self, message: String) {
        self.busy = false;
        self.session = SessionState::Idle;
        self.status = "failed to start".to_string();
        self.push_log(LogLine::error(message));
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: String) {
        self.status = status;
        self.dirty = true;
    }

    pub(crate) fn push_log(&mut self, line: LogLine) {
        self.logs.push(line);
        self.dirty = true;
    }
}

fn non_blank(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
