use reelgrab_core::Target;

use crate::{CallbackVerdict, EngineConfig, EngineError, FetchOutcome, TransferState};

/// Progress callback handed to the engine for the duration of one target.
pub trait TransferObserver: Send + Sync {
    fn on_transfer(&self, state: TransferState) -> CallbackVerdict;
}

/// The external media-fetching engine, one call per target.
///
/// Implementations call the observer zero or more times while transferring
/// and must return `Ok(FetchOutcome::Stopped)` once they honour a
/// `CallbackVerdict::Stop`. Archive checks, retries and collection expansion
/// all happen inside the engine.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    async fn fetch(
        &self,
        target: &Target,
        config: &EngineConfig,
        observer: &dyn TransferObserver,
    ) -> Result<FetchOutcome, EngineError>;
}
