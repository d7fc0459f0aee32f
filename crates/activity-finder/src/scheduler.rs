//! Fixed-interval scheduling of pipeline cycles.

use std::time::Duration;

use crate::error::Result;
use crate::pipeline::Pipeline;

/// Default pause between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Runs a cycle, sleeps, and repeats.
///
/// There is no backoff and no retry: the first failing cycle ends the run.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    max_cycles: Option<usize>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Scheduler {
    /// Create a scheduler that runs forever.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
        }
    }

    /// Stop after `cycles` cycles.
    #[must_use]
    pub const fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Pause between cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run cycles until one fails or the cycle limit is reached.
    ///
    /// Returns the number of completed cycles.
    pub async fn run(&self, pipeline: &Pipeline) -> Result<usize> {
        let mut completed = 0;
        loop {
            let report = pipeline.run_cycle().await?;
            completed += 1;
            tracing::debug!(cycle = completed, sent = report.sent, "Cycle finished");

            if self.max_cycles.is_some_and(|max| completed >= max) {
                return Ok(completed);
            }

            tracing::info!(
                sleep_secs = self.interval.as_secs(),
                "Sleeping until next cycle"
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
