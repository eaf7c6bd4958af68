//! Retry strategy trait.

use crate::error::{StrategyError, StrategyResult};
use std::fmt::Debug;
use std::time::Duration;

/// Trait for retry strategies.
///
/// A strategy owns the attempt counter for one failure kind. The orchestrator
/// asks [`can_retry`](Strategy::can_retry) first, records the retry with
/// [`new_attempt`](Strategy::new_attempt), then sleeps for
/// [`wait_for`](Strategy::wait_for).
///
/// Strategies are not synchronized. One instance must not back two retry
/// loops at the same time.
pub trait Strategy: Debug + Send {
    /// Stable identifier, also used as the configuration tag.
    fn name(&self) -> &'static str;

    /// Whether another retry is permitted.
    fn can_retry(&self) -> bool;

    /// Record a retry.
    ///
    /// Fails with [`StrategyError::ExhaustedAttempts`] when
    /// [`can_retry`](Strategy::can_retry) is already false; the counter is
    /// not touched in that case.
    fn new_attempt(&mut self) -> StrategyResult<()>;

    /// Delay to apply before the next attempt.
    fn wait_for(&self) -> Duration;

    /// Retries recorded so far.
    fn attempts_made(&self) -> u32;

    /// Retries permitted in total.
    fn max_attempts(&self) -> u32;

    /// Forget every recorded retry.
    fn reset(&mut self);
}

/// Attempt bookkeeping shared by the built-in strategies.
///
/// Custom strategies can embed one and only decide their own wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptCounter {
    max_attempts: u32,
    attempts_made: u32,
}

impl AttemptCounter {
    /// Create a counter allowing `max_attempts` retries.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempts_made: 0,
        }
    }

    /// Whether `attempts_made < max_attempts`.
    pub fn can_retry(&self) -> bool {
        self.attempts_made < self.max_attempts
    }

    /// Increment the counter, refusing to go past the limit.
    pub fn record(&mut self, strategy: &'static str) -> StrategyResult<()> {
        if !self.can_retry() {
            return Err(StrategyError::exhausted(
                strategy,
                self.attempts_made,
                self.max_attempts,
            ));
        }
        self.attempts_made += 1;
        Ok(())
    }

    /// Retries recorded so far.
    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Retries permitted in total.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Set the counter back to zero.
    pub fn reset(&mut self) {
        self.attempts_made = 0;
    }
}

/// Strategy that never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl NeverRetry {
    /// Configuration tag of this strategy.
    pub const NAME: &'static str = "never_retry";

    /// Create a new never-retry strategy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for NeverRetry {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn can_retry(&self) -> bool {
        false
    }

    fn new_attempt(&mut self) -> StrategyResult<()> {
        Err(StrategyError::exhausted(Self::NAME, 0, 0))
    }

    fn wait_for(&self) -> Duration {
        Duration::ZERO
    }

    fn attempts_made(&self) -> u32 {
        0
    }

    fn max_attempts(&self) -> u32 {
        0
    }

    fn reset(&mut self) {}
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn can_retry(&self) -> bool {
        (**self).can_retry()
    }

    fn new_attempt(&mut self) -> StrategyResult<()> {
        (**self).new_attempt()
    }

    fn wait_for(&self) -> Duration {
        (**self).wait_for()
    }

    fn attempts_made(&self) -> u32 {
        (**self).attempts_made()
    }

    fn max_attempts(&self) -> u32 {
        (**self).max_attempts()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
