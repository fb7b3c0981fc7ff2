//! Timing instrumentation helpers

use std::time::{Duration, Instant};

/// Tracks elapsed time of a single operation
///
/// # Example
///
/// ```ignore
/// use ihub_infrastructure::utils::TimedOperation;
///
/// let timer = TimedOperation::start();
/// let response = adapter.execute(&request).await;
/// let latency_ms = timer.elapsed_ms();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    /// Start a new timed operation
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed time in milliseconds, saturating at `u64::MAX`
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time as Duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
