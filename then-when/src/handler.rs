//! Work units, handler callbacks, and the tables that hold them.

use crate::strategy::Strategy;
use std::collections::HashMap;
use std::fmt;

/// A boxed unit of work.
pub type Work<'h, T, E> = Box<dyn FnMut() -> Result<T, E> + 'h>;

/// Reaction invoked before each retry of a failure kind.
pub type MiddleHandler<'h, T, E> = Box<dyn FnMut(&E) -> Result<MiddleAction<'h, T, E>, E> + 'h>;

/// Reaction invoked once the strategy for a failure kind is exhausted.
///
/// It receives the failure by value; whatever it returns becomes the result
/// of the run.
pub type FinalHandler<'h, T, E> = Box<dyn FnMut(E) -> Result<T, E> + 'h>;

/// Strategies keyed by failure kind.
pub type StrategyTable<K> = HashMap<K, Box<dyn Strategy>>;

/// Mid-retry handlers keyed by failure kind.
pub type MiddleHandlers<'h, K, T, E> = HashMap<K, MiddleHandler<'h, T, E>>;

/// Final handlers keyed by failure kind.
pub type FinalHandlers<'h, K, T, E> = HashMap<K, FinalHandler<'h, T, E>>;

/// What a mid-retry handler wants the orchestrator to do next.
pub enum MiddleAction<'h, T, E> {
    /// Wait and retry with the current work unit.
    Continue,
    /// Stop retrying and hand the original failure back to the caller.
    Abort,
    /// Retry immediately with this work unit, and keep using it from now on.
    Replace(Work<'h, T, E>),
}

impl<'h, T, E> MiddleAction<'h, T, E> {
    /// Replace the work unit with `work`.
    pub fn replace<F>(work: F) -> Self
    where
        F: FnMut() -> Result<T, E> + 'h,
    {
        Self::Replace(Box::new(work))
    }
}

impl<T, E> fmt::Debug for MiddleAction<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Abort => f.write_str("Abort"),
            Self::Replace(_) => f.write_str("Replace(<work>)"),
        }
    }
}
