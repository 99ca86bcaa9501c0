#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Prepare the output directory and spawn the runner for this job.
    StartBatch(crate::Job),
    /// Flip the running batch's cancellation token.
    RequestCancel,
}
