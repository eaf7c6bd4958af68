//! Error types.
//!
//! The orchestrator itself never produces these for a failed work unit: the
//! caller always gets the work unit's own error back. These types cover the
//! strategy bookkeeping and the configuration layer.

use thiserror::Error;

/// Errors raised by a [`Strategy`](crate::Strategy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    /// `new_attempt` was called after the strategy ran out of attempts.
    #[error("strategy `{strategy}` exhausted: {attempts_made} of {max_attempts} attempts already made")]
    ExhaustedAttempts {
        /// Name of the strategy.
        strategy: &'static str,
        /// Attempts made so far.
        attempts_made: u32,
        /// Attempts allowed.
        max_attempts: u32,
    },
}

impl StrategyError {
    /// Create an exhausted-attempts error.
    pub fn exhausted(strategy: &'static str, attempts_made: u32, max_attempts: u32) -> Self {
        Self::ExhaustedAttempts {
            strategy,
            attempts_made,
            max_attempts,
        }
    }
}

/// Errors raised while turning configuration into strategies.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A strategy definition is self-contradictory.
    #[error("invalid strategy for `{kind}`: {reason}")]
    InvalidStrategy {
        /// The failure kind the strategy was declared for.
        kind: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configured failure kind could not be resolved.
    #[error("unknown failure kind `{0}`")]
    UnknownKind(String),

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create an invalid strategy error.
    pub fn invalid_strategy(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidStrategy {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for strategy bookkeeping.
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
