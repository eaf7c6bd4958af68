//! Fixed-interval strategy.

use crate::error::StrategyResult;
use crate::strategy::{AttemptCounter, Strategy};
use std::time::Duration;

/// Fixed delay between retries, up to a maximum number of retries.
#[derive(Debug, Clone)]
pub struct ConstantDelay {
    counter: AttemptCounter,
    delay: Duration,
}

impl ConstantDelay {
    /// Configuration tag of this strategy.
    pub const NAME: &'static str = "constant";

    /// Create a new fixed delay strategy.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            counter: AttemptCounter::new(max_attempts),
            delay,
        }
    }

    /// Create a fixed delay strategy with a delay in whole seconds.
    #[must_use]
    pub fn from_secs(max_attempts: u32, wait_seconds: u64) -> Self {
        Self::new(max_attempts, Duration::from_secs(wait_seconds))
    }

    /// Retry immediately, up to `max_attempts` times.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Strategy for ConstantDelay {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn can_retry(&self) -> bool {
        self.counter.can_retry()
    }

    fn new_attempt(&mut self) -> StrategyResult<()> {
        self.counter.record(Self::NAME)
    }

    fn wait_for(&self) -> Duration {
        self.delay
    }

    fn attempts_made(&self) -> u32 {
        self.counter.attempts_made()
    }

    fn max_attempts(&self) -> u32 {
        self.counter.max_attempts()
    }

    fn reset(&mut self) {
        self.counter.reset();
    }
}
