use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use reelgrab_core::{Job, LogLine, ProgressEvent};
use reelgrab_logging::{rg_error, rg_info, rg_warn};

use crate::channel::{progress_channel, EventSink, ProgressReceiver, ProgressSender};
use crate::persist::{ensure_output_dir, OutputDirectoryError};
use crate::{CancellationController, JobRunner, MediaEngine, RunSummary};

#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error(transparent)]
    OutputDirectory(#[from] OutputDirectoryError),
    #[error("failed to spawn runner thread: {0}")]
    Worker(io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A batch is already running; nothing was spawned.
    AlreadyRunning,
}

struct ActiveBatch {
    cancel: CancellationController,
    events: ProgressReceiver,
    worker: JoinHandle<RunSummary>,
}

/// Controller-side owner of the single background runner.
///
/// Never blocks on the worker except in [`BatchController::wait_idle`].
pub struct BatchController {
    engine: Arc<dyn MediaEngine>,
    active: Option<ActiveBatch>,
    retiring: Option<JoinHandle<RunSummary>>,
    last_summary: Option<RunSummary>,
    pending: VecDeque<ProgressEvent>,
}

impl BatchController {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            engine,
            active: None,
            retiring: None,
            last_summary: None,
            pending: VecDeque::new(),
        }
    }

    /// True until the consumer has seen the batch's `Done`.
    pub fn is_running(&self) -> bool {
        self.active.is_some() || !self.pending.is_empty()
    }

    /// Prepare the output directory and start the runner on a worker thread.
    ///
    /// Directory problems are reported here, before any target is attempted.
    pub fn start(&mut self, job: Job) -> Result<StartOutcome, StartError> {
        if self.is_running() {
            rg_warn!("start ignored: a batch is already running");
            return Ok(StartOutcome::AlreadyRunning);
        }
        ensure_output_dir(job.config().output_dir())?;

        let cancel = CancellationController::new();
        let (sender, events) = progress_channel();
        let engine = Arc::clone(&self.engine);
        let worker_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name("reelgrab-runner".to_string())
            .spawn(move || run_on_worker(engine, job, worker_cancel, sender))
            .map_err(StartError::Worker)?;

        rg_info!("batch started");
        self.active = Some(ActiveBatch {
            cancel,
            events,
            worker,
        });
        Ok(StartOutcome::Started)
    }

    /// Idempotent; a no-op when nothing is running.
    pub fn request_cancel(&self) {
        if let Some(active) = &self.active {
            active.cancel.request_cancel();
        }
    }

    /// Everything the runner has emitted since the last poll, in order.
    pub fn poll(&mut self) -> Vec<ProgressEvent> {
        self.reap();
        let mut events: Vec<ProgressEvent> = self.pending.drain(..).collect();
        if let Some(active) = self.active.as_mut() {
            let mut fresh = active.events.drain();
            let disconnected = active.events.is_disconnected();
            self.settle(&mut fresh, disconnected);
            events.append(&mut fresh);
        }
        events
    }

    /// Block up to `timeout` for the next event.
    pub fn next_event(&mut self, timeout: Duration) -> Option<ProgressEvent> {
        self.reap();
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        let active = self.active.as_mut()?;
        let event = active.events.recv_timeout(timeout);
        let disconnected = active.events.is_disconnected();
        let mut events: Vec<ProgressEvent> = event.into_iter().collect();
        self.settle(&mut events, disconnected);
        self.pending.extend(events);
        self.pending.pop_front()
    }

    /// Drain until the running batch ends or `timeout` elapses, then join
    /// the worker. Returns every event seen on the way.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<ProgressEvent> {
        let deadline = Instant::now() + timeout;
        let mut seen = Vec::new();
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if let Some(event) = self.next_event(deadline - now) {
                seen.push(event);
            }
        }
        if let Some(handle) = self.retiring.take() {
            self.collect_summary(handle);
        }
        seen
    }

    /// Summary of the most recent finished batch whose worker has exited.
    pub fn last_summary(&mut self) -> Option<RunSummary> {
        self.reap();
        self.last_summary
    }

    /// Retire the active batch once `Done` is seen. A worker that vanished
    /// without `Done` gets one synthesized so the consumer always stops.
    fn settle(&mut self, events: &mut Vec<ProgressEvent>, disconnected: bool) {
        let done = events.contains(&ProgressEvent::Done);
        if !done && !disconnected {
            return;
        }
        if !done {
            rg_error!("runner ended without completion signal");
            events.push(ProgressEvent::Log(LogLine::error("runner stopped unexpectedly")));
            events.push(ProgressEvent::Done);
        }
        if let Some(active) = self.active.take() {
            self.retiring = Some(active.worker);
        }
    }

    fn reap(&mut self) {
        if self
            .retiring
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
        {
            if let Some(handle) = self.retiring.take() {
                self.collect_summary(handle);
            }
        }
    }

    fn collect_summary(&mut self, handle: JoinHandle<RunSummary>) {
        match handle.join() {
            Ok(summary) => self.last_summary = Some(summary),
            Err(_) => rg_error!("runner thread panicked"),
        }
    }
}

fn run_on_worker(
    engine: Arc<dyn MediaEngine>,
    job: Job,
    cancel: CancellationController,
    sender: ProgressSender,
) -> RunSummary {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            rg_error!("failed to build runner runtime: {}", err);
            sender.log_error(format!("failed to start runner: {err}"));
            sender.emit(ProgressEvent::Done);
            return RunSummary {
                total: job.targets().len(),
                ..RunSummary::default()
            };
        }
    };
    runtime.block_on(async {
        let mut runner = JobRunner::new(engine.as_ref(), &sender, &cancel);
        runner.run(&job).await
    })
}
