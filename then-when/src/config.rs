//! Retry configuration.
//!
//! Strategies can be declared in a JSON document keyed by failure-kind name
//! and resolved against the caller's own kind type:
//!
//! ```
//! use then_when::{AttemptBudget, TryAgainConfig};
//!
//! let config = TryAgainConfig::from_json(r#"{
//!     "attempt_budget": "shared",
//!     "strategies": {
//!         "timeout": { "strategy": "constant", "max_attempts": 3, "wait_seconds": 1 },
//!         "refused": { "strategy": "never_retry" }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.attempt_budget, AttemptBudget::Shared);
//! assert_eq!(config.strategies.len(), 2);
//! ```

use crate::backoff::ConstantDelay;
use crate::error::{ConfigError, ConfigResult};
use crate::executor::TryAgainBuilder;
use crate::handler::StrategyTable;
use crate::kind::Classify;
use crate::strategy::{NeverRetry, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

/// Whether attempt counters survive between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptBudget {
    /// Reset every strategy at the start of each top-level run.
    #[default]
    PerRun,
    /// Keep counting across runs for the lifetime of the orchestrator.
    ///
    /// Once a kind is exhausted it behaves like never-retry until the
    /// orchestrator is rebuilt or explicitly reset.
    Shared,
}

/// Declarative form of a [`Strategy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// See [`NeverRetry`].
    NeverRetry,
    /// See [`ConstantDelay`].
    Constant {
        /// Retries permitted.
        max_attempts: u32,
        /// Delay between attempts, in seconds.
        #[serde(default)]
        wait_seconds: u64,
    },
}

impl StrategyConfig {
    /// Fixed-interval strategy.
    pub fn constant(max_attempts: u32, wait_seconds: u64) -> Self {
        Self::Constant {
            max_attempts,
            wait_seconds,
        }
    }

    /// Check the definition declared for `kind`.
    pub fn validate(&self, kind: &str) -> ConfigResult<()> {
        match self {
            Self::NeverRetry => Ok(()),
            Self::Constant {
                max_attempts: 0,
                wait_seconds,
            } if *wait_seconds > 0 => Err(ConfigError::invalid_strategy(
                kind,
                format!(
                    "wait_seconds is {wait_seconds} but max_attempts is 0; use never_retry instead"
                ),
            )),
            Self::Constant { .. } => Ok(()),
        }
    }

    /// Build a fresh strategy instance.
    pub fn build_strategy(&self) -> Box<dyn Strategy> {
        match self {
            Self::NeverRetry => Box::new(NeverRetry::new()),
            Self::Constant {
                max_attempts,
                wait_seconds,
            } => Box::new(ConstantDelay::new(
                *max_attempts,
                Duration::from_secs(*wait_seconds),
            )),
        }
    }
}

/// Configuration for a [`TryAgain`](crate::TryAgain) orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryAgainConfig {
    /// Counter lifetime.
    #[serde(default)]
    pub attempt_budget: AttemptBudget,
    /// Strategies keyed by failure-kind name.
    #[serde(default)]
    pub strategies: HashMap<String, StrategyConfig>,
}

impl TryAgainConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the attempt budget.
    #[must_use]
    pub fn attempt_budget(mut self, budget: AttemptBudget) -> Self {
        self.attempt_budget = budget;
        self
    }

    /// Declare a strategy for a failure-kind name.
    #[must_use]
    pub fn strategy(mut self, kind: impl Into<String>, strategy: StrategyConfig) -> Self {
        self.strategies.insert(kind.into(), strategy);
        self
    }

    /// Check every declared strategy.
    pub fn validate(&self) -> ConfigResult<()> {
        self.strategies
            .iter()
            .try_for_each(|(kind, strategy)| strategy.validate(kind))
    }

    /// Resolve the declared names into a strategy table.
    ///
    /// `resolve` maps a name to the caller's kind; a name it rejects fails
    /// with [`ConfigError::UnknownKind`]. Two names resolving to the same
    /// kind are rejected as well.
    pub fn strategy_table<K, R>(&self, mut resolve: R) -> ConfigResult<StrategyTable<K>>
    where
        K: Eq + Hash,
        R: FnMut(&str) -> Option<K>,
    {
        let mut table = StrategyTable::with_capacity(self.strategies.len());

        for (name, strategy) in &self.strategies {
            strategy.validate(name)?;
            let kind = resolve(name).ok_or_else(|| ConfigError::UnknownKind(name.clone()))?;
            if table.insert(kind, strategy.build_strategy()).is_some() {
                return Err(ConfigError::invalid_strategy(
                    name.as_str(),
                    "another name already resolved to the same failure kind",
                ));
            }
        }

        Ok(table)
    }

    /// Start an orchestrator builder carrying this configuration.
    pub fn builder<'h, T, E, R>(&self, resolve: R) -> ConfigResult<TryAgainBuilder<'h, T, E>>
    where
        E: Classify,
        R: FnMut(&str) -> Option<E::Kind>,
    {
        let table = self.strategy_table(resolve)?;
        Ok(TryAgainBuilder::new()
            .attempt_budget(self.attempt_budget)
            .strategies(table))
    }
}
