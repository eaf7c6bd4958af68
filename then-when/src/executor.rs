//! Retry orchestrator.

use crate::backoff::ConstantDelay;
use crate::config::AttemptBudget;
use crate::handler::{FinalHandlers, MiddleAction, MiddleHandlers, StrategyTable, Work};
use crate::kind::Classify;
use crate::sleep::{Sleeper, ThreadSleeper};
use crate::strategy::{NeverRetry, Strategy};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A work unit returned `Ok`.
    Succeeded,
    /// The failure kind had no strategy; the failure was returned as is.
    Unclassified,
    /// The strategy ran out of retries and no final handler was registered.
    Exhausted,
    /// The strategy ran out of retries and the final handler produced the
    /// result, whether `Ok` or `Err`.
    FinalHandler,
    /// A mid-retry handler aborted the run.
    Vetoed,
    /// A mid-retry handler failed; its error was returned.
    HandlerFailed,
}

/// Information about a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// Attempt number (1-indexed).
    pub attempt: u32,
    /// Whether it succeeded.
    pub success: bool,
    /// Failure kind, rendered with `Debug`, if it failed.
    pub kind: Option<String>,
    /// Time waited after this attempt.
    pub wait: Duration,
}

/// Record of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryState {
    /// Work invocations performed.
    pub attempts: u32,
    /// Total time spent waiting.
    pub total_wait: Duration,
    /// Whether a mid-retry handler installed a replacement work unit.
    pub replaced_work: bool,
    /// How the run ended.
    pub outcome: RunOutcome,
    /// History of attempts.
    pub history: Vec<AttemptInfo>,
}

impl RetryState {
    fn new() -> Self {
        Self {
            attempts: 0,
            total_wait: Duration::ZERO,
            replaced_work: false,
            outcome: RunOutcome::Succeeded,
            history: Vec::new(),
        }
    }

    fn record(&mut self, kind: Option<String>, wait: Duration) {
        self.total_wait += wait;
        self.history.push(AttemptInfo {
            attempt: self.attempts,
            success: kind.is_none(),
            kind,
            wait,
        });
    }

    fn finish(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Retry orchestrator.
///
/// Holds one [`Strategy`] per failure kind plus optional mid-retry and final
/// handlers, and drives work units through them:
///
/// - a failure whose kind has no strategy is returned unchanged;
/// - while the strategy allows it, the mid-retry handler (if any) is
///   consulted, the strategy's wait is applied and the work runs again; a
///   replacement work unit from the handler runs right away, without the wait;
/// - once the strategy is exhausted the final handler (if any) produces the
///   result, otherwise the failure is returned unchanged.
///
/// The caller always gets the work unit's own error back; nothing is wrapped.
///
/// ```
/// use then_when::{Classify, TryAgain};
/// use std::cell::Cell;
///
/// #[derive(Debug)]
/// struct Busy;
///
/// impl Classify for Busy {
///     type Kind = &'static str;
///     fn kind(&self) -> &'static str { "busy" }
/// }
///
/// let calls = Cell::new(0);
/// let mut try_again = TryAgain::<&str, Busy>::builder()
///     .constant("busy", 2, std::time::Duration::ZERO)
///     .final_handler("busy", |_| Ok("gave up"))
///     .build();
///
/// let result = try_again.run(|| {
///     calls.set(calls.get() + 1);
///     Err(Busy)
/// });
///
/// assert_eq!(result.unwrap(), "gave up");
/// assert_eq!(calls.get(), 3);
/// ```
pub struct TryAgain<'h, T, E: Classify> {
    strategies: StrategyTable<E::Kind>,
    middle_handlers: MiddleHandlers<'h, E::Kind, T, E>,
    final_handlers: FinalHandlers<'h, E::Kind, T, E>,
    attempt_budget: AttemptBudget,
    sleeper: Box<dyn Sleeper + 'h>,
}

impl<T, E: Classify> fmt::Debug for TryAgain<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryAgain")
            .field("strategies", &self.strategies)
            .field("middle_handler_count", &self.middle_handlers.len())
            .field("final_handler_count", &self.final_handlers.len())
            .field("attempt_budget", &self.attempt_budget)
            .finish()
    }
}

impl<'h, T, E: Classify> TryAgain<'h, T, E> {
    /// Create an orchestrator from its three tables.
    ///
    /// Counters reset per run and waits block the current thread.
    pub fn new(
        strategies: StrategyTable<E::Kind>,
        middle_handlers: MiddleHandlers<'h, E::Kind, T, E>,
        final_handlers: FinalHandlers<'h, E::Kind, T, E>,
    ) -> Self {
        Self {
            strategies,
            middle_handlers,
            final_handlers,
            attempt_budget: AttemptBudget::default(),
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Create a builder.
    #[must_use]
    pub fn builder() -> TryAgainBuilder<'h, T, E> {
        TryAgainBuilder::new()
    }

    /// Counter lifetime in effect.
    pub fn attempt_budget(&self) -> AttemptBudget {
        self.attempt_budget
    }

    /// Retries recorded by the strategy for `kind`, if there is one.
    pub fn attempts_made(&self, kind: &E::Kind) -> Option<u32> {
        self.strategies.get(kind).map(|s| s.attempts_made())
    }

    /// Whether a strategy is registered for `kind`.
    pub fn handles(&self, kind: &E::Kind) -> bool {
        self.strategies.contains_key(kind)
    }

    /// Reset every strategy's counter.
    pub fn reset(&mut self) {
        self.strategies.values_mut().for_each(|s| s.reset());
    }

    /// Run `work` until it succeeds or the tables say to stop.
    pub fn run<F>(&mut self, work: F) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        self.run_with_state(work).0
    }

    /// Run `work` and also report what happened.
    pub fn run_with_state<F>(&mut self, mut work: F) -> (Result<T, E>, RetryState)
    where
        F: FnMut() -> Result<T, E>,
    {
        if self.attempt_budget == AttemptBudget::PerRun {
            self.reset();
        }

        let mut state = RetryState::new();
        let mut replacement: Option<Work<'h, T, E>> = None;

        loop {
            state.attempts += 1;

            debug!(
                attempt = state.attempts,
                replaced = replacement.is_some(),
                "Executing attempt"
            );

            let result = match replacement.as_mut() {
                Some(replacement) => replacement(),
                None => work(),
            };

            let error = match result {
                Ok(value) => {
                    state.record(None, Duration::ZERO);
                    return (Ok(value), state.finish(RunOutcome::Succeeded));
                }
                Err(error) => error,
            };

            let kind = error.kind();
            let kind_label = format!("{kind:?}");

            let Some(strategy) = self.strategies.get_mut(&kind) else {
                debug!(attempt = state.attempts, kind = %kind_label, "No strategy for failure kind");
                state.record(Some(kind_label), Duration::ZERO);
                return (Err(error), state.finish(RunOutcome::Unclassified));
            };

            let retry_permitted = strategy.can_retry()
                && match strategy.new_attempt() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(
                            kind = %kind_label,
                            error = %err,
                            "Strategy reported a retry it then refused"
                        );
                        false
                    }
                };

            if !retry_permitted {
                warn!(
                    attempt = state.attempts,
                    kind = %kind_label,
                    strategy = strategy.name(),
                    attempts_made = strategy.attempts_made(),
                    "Retries exhausted"
                );
                state.record(Some(kind_label), Duration::ZERO);

                return match self.final_handlers.get_mut(&kind) {
                    Some(handler) => (handler(error), state.finish(RunOutcome::FinalHandler)),
                    None => (Err(error), state.finish(RunOutcome::Exhausted)),
                };
            }

            let wait = strategy.wait_for();
            let strategy_name = strategy.name();

            if let Some(handler) = self.middle_handlers.get_mut(&kind) {
                match handler(&error) {
                    Ok(MiddleAction::Continue) => {}
                    Ok(MiddleAction::Abort) => {
                        warn!(
                            attempt = state.attempts,
                            kind = %kind_label,
                            "Retry vetoed by handler"
                        );
                        state.record(Some(kind_label), Duration::ZERO);
                        return (Err(error), state.finish(RunOutcome::Vetoed));
                    }
                    Ok(MiddleAction::Replace(next)) => {
                        debug!(attempt = state.attempts, kind = %kind_label, "Work unit replaced");
                        replacement = Some(next);
                        state.replaced_work = true;
                        state.record(Some(kind_label), Duration::ZERO);
                        continue;
                    }
                    Err(handler_error) => {
                        state.record(Some(kind_label), Duration::ZERO);
                        return (Err(handler_error), state.finish(RunOutcome::HandlerFailed));
                    }
                }
            }

            debug!(
                attempt = state.attempts,
                kind = %kind_label,
                strategy = strategy_name,
                wait_ms = wait.as_millis(),
                "Waiting before retry"
            );

            state.record(Some(kind_label), wait);
            self.sleeper.sleep(wait);
        }
    }
}

/// Builder for [`TryAgain`].
pub struct TryAgainBuilder<'h, T, E: Classify> {
    strategies: StrategyTable<E::Kind>,
    middle_handlers: MiddleHandlers<'h, E::Kind, T, E>,
    final_handlers: FinalHandlers<'h, E::Kind, T, E>,
    attempt_budget: AttemptBudget,
    sleeper: Option<Box<dyn Sleeper + 'h>>,
}

impl<T, E: Classify> fmt::Debug for TryAgainBuilder<'_, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TryAgainBuilder")
            .field("strategies", &self.strategies)
            .field("middle_handler_count", &self.middle_handlers.len())
            .field("final_handler_count", &self.final_handlers.len())
            .field("attempt_budget", &self.attempt_budget)
            .field("custom_sleeper", &self.sleeper.is_some())
            .finish()
    }
}

impl<T, E: Classify> Default for TryAgainBuilder<'_, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, T, E: Classify> TryAgainBuilder<'h, T, E> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: StrategyTable::new(),
            middle_handlers: MiddleHandlers::new(),
            final_handlers: FinalHandlers::new(),
            attempt_budget: AttemptBudget::default(),
            sleeper: None,
        }
    }

    /// Set the strategy for a failure kind, replacing any previous one.
    #[must_use]
    pub fn strategy(mut self, kind: E::Kind, strategy: impl Strategy + 'static) -> Self {
        self.strategies.insert(kind, Box::new(strategy));
        self
    }

    /// Add every strategy from a table.
    #[must_use]
    pub fn strategies(mut self, table: StrategyTable<E::Kind>) -> Self {
        self.strategies.extend(table);
        self
    }

    /// Never retry failures of `kind`, but still route them to its final handler.
    #[must_use]
    pub fn never_retry(self, kind: E::Kind) -> Self {
        self.strategy(kind, NeverRetry::new())
    }

    /// Retry failures of `kind` up to `max_attempts` times, `delay` apart.
    #[must_use]
    pub fn constant(self, kind: E::Kind, max_attempts: u32, delay: Duration) -> Self {
        self.strategy(kind, ConstantDelay::new(max_attempts, delay))
    }

    /// Set the mid-retry handler for a failure kind.
    #[must_use]
    pub fn middle_handler(
        mut self,
        kind: E::Kind,
        handler: impl FnMut(&E) -> Result<MiddleAction<'h, T, E>, E> + 'h,
    ) -> Self {
        self.middle_handlers.insert(kind, Box::new(handler));
        self
    }

    /// Set the final handler for a failure kind.
    #[must_use]
    pub fn final_handler(
        mut self,
        kind: E::Kind,
        handler: impl FnMut(E) -> Result<T, E> + 'h,
    ) -> Self {
        self.final_handlers.insert(kind, Box::new(handler));
        self
    }

    /// Set the counter lifetime.
    #[must_use]
    pub fn attempt_budget(mut self, budget: AttemptBudget) -> Self {
        self.attempt_budget = budget;
        self
    }

    /// Use a custom sleeper instead of blocking the thread.
    #[must_use]
    pub fn sleeper(mut self, sleeper: impl Sleeper + 'h) -> Self {
        self.sleeper = Some(Box::new(sleeper));
        self
    }

    /// Build the orchestrator.
    #[must_use]
    pub fn build(self) -> TryAgain<'h, T, E> {
        TryAgain {
            strategies: self.strategies,
            middle_handlers: self.middle_handlers,
            final_handlers: self.final_handlers,
            attempt_budget: self.attempt_budget,
            sleeper: self.sleeper.unwrap_or_else(|| Box::new(ThreadSleeper)),
        }
    }
}
