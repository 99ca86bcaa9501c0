use tokio_util::sync::CancellationToken;

/// One batch's cancel flag: written by the controller, read by the runner.
///
/// Monotonic (false → true). A new controller is created for every batch so
/// a previous batch's request is never seen by the next runner.
#[derive(Debug, Clone, Default)]
pub struct CancellationController {
    token: CancellationToken,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; harmless before the runner starts or after it finished.
    pub fn request_cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.token.is_cancelled()
    }
}
