//! # then-when
//!
//! Per-failure-kind retry orchestration.
//!
//! A work unit returns `Result<T, E>`. When it fails, the error is classified
//! into a kind, and the kind selects what happens next: a retry strategy, an
//! optional handler consulted before each retry, and an optional handler that
//! produces the result once retries run out.
//!
//! ## Core Concepts
//!
//! - **[`Classify`]**: Map an error to its failure kind
//! - **[`Strategy`]**: Decide whether to retry and how long to wait
//! - **[`TryAgain`]**: Drive the retry loop
//! - **[`MiddleAction`]**: Continue, abort, or replace the work before a retry
//! - **[`TryAgainConfig`]**: Declare strategies in JSON
//!
//! ## Strategies
//!
//! - [`NeverRetry`]: Route the first failure straight to the final handler
//! - [`ConstantDelay`]: Fixed delay, bounded number of retries
//!
//! ## Example
//!
//! ```
//! use then_when::{Classify, MiddleAction, TryAgain};
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! enum DbError {
//!     Locked,
//!     Corrupt,
//! }
//!
//! impl Classify for DbError {
//!     type Kind = std::mem::Discriminant<DbError>;
//!
//!     fn kind(&self) -> Self::Kind {
//!         std::mem::discriminant(self)
//!     }
//! }
//!
//! let locked = std::mem::discriminant(&DbError::Locked);
//!
//! let mut try_again = TryAgain::<u32, DbError>::builder()
//!     .constant(locked, 3, Duration::from_millis(1))
//!     .middle_handler(locked, |_| Ok(MiddleAction::Continue))
//!     .build();
//!
//! let mut calls = 0;
//! let rows = try_again.run(|| {
//!     calls += 1;
//!     if calls < 3 { Err(DbError::Locked) } else { Ok(12) }
//! });
//! assert_eq!(rows, Ok(12));
//!
//! // Kinds without a strategy come straight back.
//! assert_eq!(try_again.run(|| Err(DbError::Corrupt)), Err(DbError::Corrupt));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod error;
pub mod executor;
pub mod handler;
pub mod kind;
pub mod sleep;
pub mod strategy;

// Re-exports
pub use backoff::ConstantDelay;
pub use config::{AttemptBudget, StrategyConfig, TryAgainConfig};
pub use error::{ConfigError, ConfigResult, StrategyError, StrategyResult};
pub use executor::{AttemptInfo, RetryState, RunOutcome, TryAgain, TryAgainBuilder};
pub use handler::{
    FinalHandler, FinalHandlers, MiddleAction, MiddleHandler, MiddleHandlers, StrategyTable, Work,
};
pub use kind::Classify;
pub use sleep::{NoopSleeper, RecordingSleeper, Sleeper, ThreadSleeper};
pub use strategy::{AttemptCounter, NeverRetry, Strategy};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        AttemptBudget, Classify, ConstantDelay, MiddleAction, NeverRetry, Strategy, TryAgain,
        TryAgainConfig,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let strategy = ConstantDelay::immediate(5);
        assert_eq!(strategy.max_attempts(), 5);
        assert_eq!(TryAgainConfig::default().attempt_budget, AttemptBudget::PerRun);
    }

    #[test]
    fn test_constant_delay() {
        let delay = ConstantDelay::new(5, Duration::from_secs(1));
        assert_eq!(delay.max_attempts(), 5);
        assert_eq!(delay.delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_never_retry() {
        assert!(!NeverRetry::new().can_retry());
    }
}
