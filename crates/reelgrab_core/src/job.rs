use crate::config::JobConfig;
use crate::target::Target;

/// A resolved batch: what to fetch and how. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    targets: Vec<Target>,
    config: JobConfig,
}

impl Job {
    pub fn new(targets: Vec<Target>, config: JobConfig) -> Self {
        Self { targets, config }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }
}
