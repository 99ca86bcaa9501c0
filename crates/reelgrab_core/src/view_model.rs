use crate::{LogLine, SessionState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormView {
    pub collection_ref: String,
    pub item_count: usize,
    pub output_dir: String,
    pub quality_label: &'static str,
    pub max_items: u32,
    pub archive_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub status: String,
    /// Drives the "in progress" indicator.
    pub busy: bool,
    pub logs: Vec<LogLine>,
    pub error_count: usize,
    /// One-shot user message (e.g. nothing to download).
    pub notice: Option<String>,
    pub batches_finished: u32,
    pub form: FormView,
    pub dirty: bool,
}
