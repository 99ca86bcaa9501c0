//! Reelgrab core: batch vocabulary, format policy, target resolution and the
//! pure controller state machine. No IO happens here.
mod config;
mod effect;
mod event;
mod format;
mod job;
mod msg;
mod state;
mod target;
mod update;
mod view_model;

pub use config::{
    default_archive_path, ArchiveSetting, JobConfig, DEFAULT_ARCHIVE_FILENAME, OUTPUT_TEMPLATE,
};
pub use effect::Effect;
pub use event::{
    LogKind, LogLine, ProgressEvent, STATUS_CANCELLED, STATUS_DONE, STATUS_POST_PROCESSING,
};
pub use format::{selector, FormatExpression, QualitySelection, UnknownQuality};
pub use job::Job;
pub use msg::Msg;
pub use state::{
    AppState, FormInput, SessionState, STATUS_CANCELLING, STATUS_READY, STATUS_STARTING,
};
pub use target::{parse_item_lines, resolve, NoTargetsError, Target};
pub use update::update;
pub use view_model::{AppViewModel, FormView};
