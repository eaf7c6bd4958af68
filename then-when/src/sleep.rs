//! Blocking delays between attempts.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Performs the wait between two attempts.
///
/// The wait blocks the calling thread. Implementations other than
/// [`ThreadSleeper`] exist for tests and dry runs.
pub trait Sleeper {
    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSleeper;

impl Sleeper for NoopSleeper {
    fn sleep(&self, _duration: Duration) {}
}

/// Records every requested delay instead of waiting.
///
/// Clones share the same record, so a clone can be handed to an
/// orchestrator and inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn calls(&self) -> Vec<Duration> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of the delays requested so far.
    pub fn total(&self) -> Duration {
        self.calls().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_recording_sleeper_shares_record() {
        let sleeper = RecordingSleeper::new();
        let clone = sleeper.clone();

        clone.sleep(Duration::from_secs(1));
        clone.sleep(Duration::from_secs(2));

        assert_eq!(
            sleeper.calls(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(sleeper.total(), Duration::from_secs(3));
    }

    #[test]
    fn test_thread_sleeper_blocks() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_noop_sleeper() {
        let start = Instant::now();
        NoopSleeper.sleep(Duration::from_secs(60));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
