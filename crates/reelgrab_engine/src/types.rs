use std::fmt;
use std::path::PathBuf;

use reelgrab_core::{FormatExpression, JobConfig, Target};

/// Transient-failure retries handed to the engine; never reimplemented here.
pub const ENGINE_RETRIES: u32 = 5;
pub const CONCURRENT_FRAGMENTS: u32 = 5;
pub const REMUX_CONTAINER: &str = "mp4";

/// Everything the engine needs for one target, derived once per batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub output_template: String,
    pub format: FormatExpression,
    pub archive_path: Option<PathBuf>,
    pub credential_file: Option<PathBuf>,
    /// Only applied to collection targets.
    pub item_ceiling: Option<u32>,
    pub retries: u32,
    pub concurrent_fragments: u32,
    pub remux_container: String,
}

impl EngineConfig {
    pub fn from_job(config: &JobConfig) -> Self {
        Self {
            output_template: config.output_template(),
            format: config.format_expression(),
            archive_path: config.effective_archive_path(),
            credential_file: config.credential_file().map(PathBuf::from),
            item_ceiling: config.item_ceiling(),
            retries: ENGINE_RETRIES,
            concurrent_fragments: CONCURRENT_FRAGMENTS,
            remux_container: REMUX_CONTAINER.to_string(),
        }
    }

    /// Expansion ceiling for this target; explicit items are never capped.
    pub fn ceiling_for(&self, target: &Target) -> Option<u32> {
        match target {
            Target::Collection(_) => self.item_ceiling,
            Target::Item(_) => None,
        }
    }
}

/// Transfer state reported by the engine's progress callback.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferState {
    Downloading {
        percent: Option<f64>,
        speed: Option<String>,
        eta_secs: Option<u64>,
    },
    /// Transfer portion done; engine is merging/remuxing/moving.
    PostProcessing,
}

/// Returned by the progress observer to tell the engine whether to go on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackVerdict {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed,
    /// The observer returned `Stop`; not a failure.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: FailureKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Engine executable missing or not runnable.
    Spawn,
    Io,
    Network,
    Extraction,
    Permission,
    ExitStatus(Option<i32>),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Spawn => write!(f, "engine not runnable"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Extraction => write!(f, "extraction error"),
            FailureKind::Permission => write!(f, "permission denied"),
            FailureKind::ExitStatus(Some(code)) => write!(f, "engine exited with code {code}"),
            FailureKind::ExitStatus(None) => write!(f, "engine terminated by signal"),
        }
    }
}

/// Lifecycle of one runner, `Idle -> Running -> {Completing, Cancelling} -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerPhase {
    #[default]
    Idle,
    Running,
    Completing,
    Cancelling,
    Done,
}

/// What happened during one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    /// Targets handed to the engine.
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    /// Interrupted mid-transfer by cancellation.
    pub stopped: usize,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn not_started(&self) -> usize {
        self.total - self.attempted
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} target(s) completed, {} failed",
            self.completed, self.total, self.failed
        )?;
        if self.cancelled {
            write!(
                f,
                ", cancelled ({} stopped, {} not started)",
                self.stopped,
                self.not_started()
            )?;
        }
        Ok(())
    }
}
