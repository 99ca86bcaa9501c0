use reelgrab_core::{
    Job, JobConfig, NoTargetsError, ProgressEvent, STATUS_CANCELLED, STATUS_DONE,
    STATUS_POST_PROCESSING,
};
use reelgrab_logging::{rg_debug, rg_info, rg_warn};

use crate::{
    CallbackVerdict, CancellationController, EngineConfig, EventSink, FetchOutcome, MediaEngine,
    RunSummary, RunnerPhase, TransferObserver, TransferState,
};

/// Drives one batch through the engine, one target at a time.
pub struct JobRunner<'a> {
    engine: &'a dyn MediaEngine,
    sink: &'a dyn EventSink,
    cancel: &'a CancellationController,
    phase: RunnerPhase,
}

impl<'a> JobRunner<'a> {
    pub fn new(
        engine: &'a dyn MediaEngine,
        sink: &'a dyn EventSink,
        cancel: &'a CancellationController,
    ) -> Self {
        Self {
            engine,
            sink,
            cancel,
            phase: RunnerPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    /// Runs the batch to completion. Per-target failures never escape; the
    /// last event emitted is always `ProgressEvent::Done`.
    pub async fn run(&mut self, job: &Job) -> RunSummary {
        self.enter(RunnerPhase::Running);
        let targets = job.targets();
        let mut summary = RunSummary {
            total: targets.len(),
            ..RunSummary::default()
        };

        if targets.is_empty() {
            self.sink.log_error(NoTargetsError.to_string());
            self.enter(RunnerPhase::Done);
            self.sink.emit(ProgressEvent::Done);
            return summary;
        }

        let engine_config = EngineConfig::from_job(job.config());
        self.announce(job.config(), &engine_config);

        let observer = StatusObserver {
            sink: self.sink,
            cancel: self.cancel,
        };
        for (index, target) in targets.iter().enumerate() {
            if self.cancel.is_cancel_requested() {
                self.mark_cancelled(&mut summary);
                break;
            }

            self.sink.log(format!("[{}/{}] {}", index + 1, summary.total, target));
            summary.attempted += 1;

            match self.engine.fetch(target, &engine_config, &observer).await {
                Ok(FetchOutcome::Completed) => summary.completed += 1,
                Ok(FetchOutcome::Stopped) => {
                    summary.stopped += 1;
                    rg_info!("{} stopped mid-transfer", target);
                    self.mark_cancelled(&mut summary);
                    break;
                }
                // A transfer killed from outside after a cancel request is a stop.
                Err(err) if self.cancel.is_cancel_requested() => {
                    summary.stopped += 1;
                    rg_info!("{} ended after cancel request: {}", target, err);
                    self.mark_cancelled(&mut summary);
                    break;
                }
                Err(err) => {
                    summary.failed += 1;
                    rg_warn!("{} failed: {}", target, err);
                    self.sink.log_error(format!("{}: {}", target.reference(), err));
                }
            }
        }

        if !summary.cancelled {
            self.enter(RunnerPhase::Completing);
        }
        self.sink.log(format!("Finished: {summary}"));
        self.sink.status(STATUS_DONE);
        self.enter(RunnerPhase::Done);
        self.sink.emit(ProgressEvent::Done);
        summary
    }

    fn announce(&self, config: &JobConfig, engine_config: &EngineConfig) {
        self.sink.log(format!("Output: {}", config.output_dir().display()));
        self.sink.log(format!("Format: {}", engine_config.format));
        if let Some(path) = &engine_config.credential_file {
            self.sink.log(format!("Using cookies: {}", path.display()));
        }
        if let Some(path) = &engine_config.archive_path {
            self.sink.log(format!("Using archive: {}", path.display()));
        }
        if let Some(limit) = engine_config.item_ceiling {
            self.sink.log(format!("Collection limit: {limit} item(s)"));
        }
    }

    fn mark_cancelled(&mut self, summary: &mut RunSummary) {
        summary.cancelled = true;
        self.enter(RunnerPhase::Cancelling);
        self.sink.status(STATUS_CANCELLED);
    }

    fn enter(&mut self, phase: RunnerPhase) {
        rg_debug!("runner {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

/// Turns engine callbacks into status events and answers with the cancel flag.
struct StatusObserver<'a> {
    sink: &'a dyn EventSink,
    cancel: &'a CancellationController,
}

impl TransferObserver for StatusObserver<'_> {
    fn on_transfer(&self, state: TransferState) -> CallbackVerdict {
        self.sink.emit(ProgressEvent::Status(describe_transfer(&state)));
        if self.cancel.is_cancel_requested() {
            CallbackVerdict::Stop
        } else {
            CallbackVerdict::Continue
        }
    }
}

/// Human-readable status line for one transfer tick.
pub fn describe_transfer(state: &TransferState) -> String {
    match state {
        TransferState::Downloading {
            percent,
            speed,
            eta_secs,
        } => {
            let mut text = String::from("downloading…");
            if let Some(percent) = percent {
                text.push_str(&format!(" {percent:.1}%"));
            }
            if let Some(speed) = speed {
                text.push_str(&format!(" {speed}"));
            }
            if let Some(eta) = eta_secs {
                text.push_str(&format!(" ETA {eta}s"));
            }
            text
        }
        TransferState::PostProcessing => STATUS_POST_PROCESSING.to_string(),
    }
}
