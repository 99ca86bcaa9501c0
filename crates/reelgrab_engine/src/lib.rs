//! Reelgrab engine: batch runner, progress channel and the yt-dlp backend.
mod cancel;
mod channel;
mod engine;
mod fetch;
mod persist;
mod runner;
mod types;
mod ytdlp;

pub use cancel::CancellationController;
pub use channel::{progress_channel, EventSink, ProgressReceiver, ProgressSender};
pub use engine::{BatchController, StartError, StartOutcome};
pub use fetch::{MediaEngine, TransferObserver};
pub use persist::{ensure_output_dir, OutputDirectoryError};
pub use runner::{describe_transfer, JobRunner};
pub use types::{
    CallbackVerdict, EngineConfig, EngineError, FailureKind, FetchOutcome, RunSummary,
    RunnerPhase, TransferState, CONCURRENT_FRAGMENTS, ENGINE_RETRIES, REMUX_CONTAINER,
};
pub use ytdlp::{YtDlpEngine, DEFAULT_PROGRAM};
