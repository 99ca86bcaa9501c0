#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reelgrab_core::{ArchiveSetting, Job, JobConfig, LogLine, ProgressEvent, Target};
use reelgrab_engine::{
    CallbackVerdict, CancellationController, EngineConfig, EngineError, EventSink, FailureKind,
    FetchOutcome, MediaEngine, TransferObserver, TransferState,
};

/// Collects everything the runner emits.
#[derive(Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn error_lines(events: &[ProgressEvent]) -> Vec<LogLine> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Log(line) if line.is_error() => Some(line.clone()),
            _ => None,
        })
        .collect()
}

pub fn statuses(events: &[ProgressEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Status(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// How the scripted engine behaves for one target reference.
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Fail(FailureKind, &'static str),
    /// Report `ticks` progress callbacks, then complete unless told to stop.
    Ticks(usize),
    /// Tick once, request cancellation, tick again and expect `Stop`.
    CancelMidTransfer,
    /// Keep ticking every few milliseconds until the observer says `Stop`.
    TickUntilStopped,
    /// Request cancellation, then fail the way an interrupted child does.
    CancelThenFail,
    /// Request cancellation mid-call but report no progress, then complete.
    CancelSilently,
}

/// In-memory stand-in for the media engine. Collections expand to the ids
/// registered with [`ScriptedEngine::with_collection`]; the archive file
/// holds one id per line, like the real engine's download archive.
#[derive(Default)]
pub struct ScriptedEngine {
    scripts: HashMap<String, Script>,
    collections: HashMap<String, Vec<String>>,
    cancel: Option<CancellationController>,
    cancel_after_calls: Option<usize>,
    calls: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
    configs: Mutex<Vec<EngineConfig>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        reelgrab_logging::initialize_for_tests();
        Self::default()
    }

    pub fn with_script(mut self, reference: &str, script: Script) -> Self {
        self.scripts.insert(reference.to_string(), script);
        self
    }

    pub fn with_collection(mut self, reference: &str, ids: &[&str]) -> Self {
        self.collections.insert(
            reference.to_string(),
            ids.iter().map(|id| id.to_string()).collect(),
        );
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationController) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Request cancellation right after the `calls`-th fetch returns.
    pub fn cancel_after(mut self, calls: usize, cancel: CancellationController) -> Self {
        self.cancel_after_calls = Some(calls);
        self.cancel = Some(cancel);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<EngineConfig> {
        self.configs.lock().unwrap().clone()
    }

    fn request_cancel(&self) {
        if let Some(cancel) = &self.cancel {
            cancel.request_cancel();
        }
    }

    fn expand(&self, target: &Target, config: &EngineConfig) -> Vec<String> {
        match target {
            Target::Item(url) => vec![url.clone()],
            Target::Collection(reference) => {
                let ids = self.collections.get(reference).cloned().unwrap_or_default();
                match config.ceiling_for(target) {
                    Some(limit) => ids.into_iter().take(limit as usize).collect(),
                    None => ids,
                }
            }
        }
    }

    fn store(&self, ids: Vec<String>, archive: Option<&Path>) {
        let seen = archive.map(read_archive).unwrap_or_default();
        for id in ids {
            if seen.contains(&id) {
                continue;
            }
            if let Some(path) = archive {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .unwrap();
                writeln!(file, "{id}").unwrap();
            }
            self.downloaded.lock().unwrap().push(id);
        }
    }
}

pub fn read_archive(path: &Path) -> HashSet<String> {
    fs::read_to_string(path)
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

fn tick(percent: f64) -> TransferState {
    TransferState::Downloading {
        percent: Some(percent),
        speed: Some("1.00MiB/s".into()),
        eta_secs: Some(1),
    }
}

#[async_trait::async_trait]
impl MediaEngine for ScriptedEngine {
    async fn fetch(
        &self,
        target: &Target,
        config: &EngineConfig,
        observer: &dyn TransferObserver,
    ) -> Result<FetchOutcome, EngineError> {
        let call_index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(target.reference().to_string());
            calls.len()
        };
        self.configs.lock().unwrap().push(config.clone());

        let script = self
            .scripts
            .get(target.reference())
            .cloned()
            .unwrap_or(Script::Succeed);
        let silent = matches!(script, Script::CancelSilently);
        let outcome = match script {
            Script::Succeed => Ok(FetchOutcome::Completed),
            Script::Fail(kind, message) => Err(EngineError::new(kind, message)),
            Script::Ticks(count) => {
                let mut outcome = Ok(FetchOutcome::Completed);
                for i in 0..count {
                    if observer.on_transfer(tick(i as f64 * 10.0)) == CallbackVerdict::Stop {
                        outcome = Ok(FetchOutcome::Stopped);
                        break;
                    }
                }
                outcome
            }
            Script::CancelMidTransfer => {
                assert_eq!(observer.on_transfer(tick(10.0)), CallbackVerdict::Continue);
                self.request_cancel();
                match observer.on_transfer(tick(20.0)) {
                    CallbackVerdict::Stop => Ok(FetchOutcome::Stopped),
                    CallbackVerdict::Continue => Ok(FetchOutcome::Completed),
                }
            }
            Script::CancelSilently => {
                self.request_cancel();
                Ok(FetchOutcome::Completed)
            }
            Script::CancelThenFail => {
                self.request_cancel();
                Err(EngineError::new(
                    FailureKind::ExitStatus(Some(130)),
                    "Interrupted by user",
                ))
            }
            Script::TickUntilStopped => {
                let mut outcome = Ok(FetchOutcome::Completed);
                for i in 0..2_000 {
                    if observer.on_transfer(tick((i % 100) as f64)) == CallbackVerdict::Stop {
                        outcome = Ok(FetchOutcome::Stopped);
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                outcome
            }
        };

        if outcome == Ok(FetchOutcome::Completed) {
            if !silent {
                observer.on_transfer(TransferState::PostProcessing);
            }
            self.store(self.expand(target, config), config.archive_path.as_deref());
        }
        if self.cancel_after_calls == Some(call_index) {
            self.request_cancel();
        }
        outcome
    }
}

pub fn items(urls: &[&str]) -> Vec<Target> {
    urls.iter().map(|url| Target::Item(url.to_string())).collect()
}

/// A job writing into `dir` with the archive switched off.
pub fn job_without_archive(dir: &Path, targets: Vec<Target>) -> Job {
    let config = JobConfig::new(dir).with_archive(ArchiveSetting {
        enabled: false,
        path: None,
    });
    Job::new(targets, config)
}

pub fn archive_in(dir: &Path) -> PathBuf {
    dir.join("downloaded_archive.txt")
}
