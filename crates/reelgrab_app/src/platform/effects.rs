use std::sync::{mpsc, Arc};
use std::time::Duration;

use reelgrab_core::{Effect, Msg};
use reelgrab_engine::{BatchController, MediaEngine, RunSummary, StartOutcome};
use reelgrab_logging::{rg_error, rg_info, rg_warn};

/// How long shutdown waits for the runner thread after its `Done`.
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EffectRunner {
    controller: BatchController,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: Arc<dyn MediaEngine>, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            controller: BatchController::new(engine),
            msg_tx,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartBatch(job) => {
                    rg_info!(
                        "StartBatch targets={} out={}",
                        job.targets().len(),
                        job.config().output_dir().display()
                    );
                    match self.controller.start(job) {
                        Ok(StartOutcome::Started) => {}
                        Ok(StartOutcome::AlreadyRunning) => {
                            rg_warn!("StartBatch while a batch is running");
                        }
                        Err(err) => {
                            rg_error!("batch failed to start: {}", err);
                            let _ = self.msg_tx.send(Msg::StartFailed(err.to_string()));
                        }
                    }
                }
                Effect::RequestCancel => {
                    rg_info!("RequestCancel");
                    self.controller.request_cancel();
                }
            }
        }
    }

    /// Progress drained since the last call, as controller messages.
    pub fn poll(&mut self) -> Vec<Msg> {
        self.controller
            .poll()
            .into_iter()
            .map(Msg::Progress)
            .collect()
    }

    /// Join the finished runner and hand back its summary.
    pub fn finish(&mut self) -> Option<RunSummary> {
        self.controller.wait_idle(JOIN_TIMEOUT);
        self.controller.last_summary()
    }
}
