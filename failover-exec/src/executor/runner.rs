use std::sync::Arc;

use tokio::time::Instant;
use uuid::Uuid;

use crate::executor::events::{Event, EventSink, NoOpEventSink};
use crate::executor::result::{AttemptOutcome, ExecutionAttempt, ExecutionError, ExecutionResult};
use crate::executor::ExecutorConfig;
use crate::retry::{decide_retry, RetryDecision};
use crate::strategy::{Strategy, StrategyError};

/// Runs an ordered list of strategies until one succeeds.
///
/// Strategies run one at a time, never concurrently: they all try to produce the
/// same server-side effect and overlapping calls could duplicate it.
pub struct ResilientExecutor {
    config: ExecutorConfig,
    events: Arc<dyn EventSink>,
}

/// How one `execute` call relates to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Scope {
    pub parent: Option<Uuid>,
    /// The caller emits the terminal success event once its own checks pass.
    pub defer_success: bool,
}

enum Invocation<T> {
    Done(Result<T, StrategyError>),
    DeadlineHit,
}

/// Per-call state threaded through the loop.
struct Call<'a> {
    invocation_id: Uuid,
    operation: &'a str,
    deadline: Option<Instant>,
    tried: Vec<String>,
    attempts: Vec<ExecutionAttempt>,
}

impl Default for ResilientExecutor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl ResilientExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            config,
            events: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn execute<T: Send + 'static>(
        &self,
        operation: &str,
        strategies: Vec<Strategy<T>>,
    ) -> ExecutionResult<T> {
        self.execute_scoped(operation, strategies, Scope::default()).await
    }

    pub(crate) async fn execute_scoped<T: Send + 'static>(
        &self,
        operation: &str,
        strategies: Vec<Strategy<T>>,
        scope: Scope,
    ) -> ExecutionResult<T> {
        let invocation_id = Uuid::new_v4();

        if strategies.is_empty() {
            let error = ExecutionError::NoStrategies {
                operation: operation.to_string(),
            };
            self.emit_failed(invocation_id, operation, &error).await;
            return ExecutionResult::failed(invocation_id, operation, error, Vec::new());
        }

        self.events
            .emit(Event::OperationStarted {
                invocation_id,
                parent_invocation_id: scope.parent,
                operation: operation.to_string(),
                strategies: strategies.len(),
            })
            .await;

        let mut call = Call {
            invocation_id,
            operation,
            deadline: self.config.deadline.map(|d| Instant::now() + d),
            tried: Vec::new(),
            attempts: Vec::new(),
        };

        for (index, strategy) in strategies.iter().enumerate() {
            call.tried.push(strategy.name().to_string());
            match self.run_strategy(&mut call, index, strategy).await {
                StrategyOutcome::Succeeded(data) => {
                    let result = ExecutionResult::succeeded(
                        invocation_id,
                        operation,
                        strategy.name(),
                        data,
                        call.attempts,
                    );
                    if !scope.defer_success {
                        self.report_outcome(&result).await;
                    }
                    return result;
                }
                StrategyOutcome::Exhausted => continue,
                StrategyOutcome::DeadlineHit => {
                    let error = ExecutionError::DeadlineExceeded {
                        operation: operation.to_string(),
                        deadline: self.config.deadline.unwrap_or_default(),
                        tried: call.tried,
                    };
                    self.emit_failed(invocation_id, operation, &error).await;
                    return ExecutionResult::failed(invocation_id, operation, error, call.attempts);
                }
            }
        }

        let last_error = call.attempts.iter().rev().find_map(|a| match &a.outcome {
            AttemptOutcome::Failed { error, .. } => Some(error.clone()),
            AttemptOutcome::Succeeded => None,
        });
        let error = ExecutionError::Exhausted {
            operation: operation.to_string(),
            tried: call.tried,
            last_error,
        };
        self.emit_failed(invocation_id, operation, &error).await;
        ExecutionResult::failed(invocation_id, operation, error, call.attempts)
    }

    async fn run_strategy<T: Send + 'static>(
        &self,
        call: &mut Call<'_>,
        index: usize,
        strategy: &Strategy<T>,
    ) -> StrategyOutcome<T> {
        let classifier = strategy.classifier().unwrap_or(&self.config.classifier);
        let mut attempt_no = 1;

        loop {
            if call.deadline.is_some_and(|d| Instant::now() >= d) {
                return StrategyOutcome::DeadlineHit;
            }

            self.events
                .emit(Event::AttemptStarted {
                    invocation_id: call.invocation_id,
                    operation: call.operation.to_string(),
                    strategy: strategy.name().to_string(),
                    strategy_index: index,
                    attempt_no,
                })
                .await;

            let started = Instant::now();
            let result = match self.invoke_bounded(strategy, call.deadline).await {
                Invocation::Done(r) => r,
                Invocation::DeadlineHit => return StrategyOutcome::DeadlineHit,
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let err = match result {
                Ok(data) => {
                    call.attempts.push(ExecutionAttempt {
                        strategy_index: index,
                        strategy: strategy.name().to_string(),
                        attempt_no,
                        outcome: AttemptOutcome::Succeeded,
                        elapsed_ms,
                    });
                    self.events
                        .emit(Event::AttemptSucceeded {
                            invocation_id: call.invocation_id,
                            operation: call.operation.to_string(),
                            strategy: strategy.name().to_string(),
                            attempt_no,
                            elapsed_ms,
                        })
                        .await;
                    return StrategyOutcome::Succeeded(data);
                }
                Err(err) => err,
            };

            let class = classifier.classify(&err);
            call.attempts.push(ExecutionAttempt {
                strategy_index: index,
                strategy: strategy.name().to_string(),
                attempt_no,
                outcome: AttemptOutcome::Failed {
                    status: err.status(),
                    retryable: class.is_retryable(),
                    error: err.to_string(),
                },
                elapsed_ms,
            });
            self.events
                .emit(Event::AttemptFailed {
                    invocation_id: call.invocation_id,
                    operation: call.operation.to_string(),
                    strategy: strategy.name().to_string(),
                    attempt_no,
                    status: err.status(),
                    retryable: class.is_retryable(),
                    error: err.to_string(),
                })
                .await;

            match decide_retry(
                &self.config.retry,
                attempt_no,
                class,
                err.retry_after(),
                || fastrand::u64(..),
            ) {
                RetryDecision::RetryAfter { delay, .. } => {
                    // Never start a sleep that would end past the deadline.
                    if call.deadline.is_some_and(|d| Instant::now() + delay >= d) {
                        return StrategyOutcome::DeadlineHit;
                    }
                    self.events
                        .emit(Event::RetryScheduled {
                            invocation_id: call.invocation_id,
                            operation: call.operation.to_string(),
                            strategy: strategy.name().to_string(),
                            attempt_no,
                            delay_ms: delay.as_millis() as u64,
                        })
                        .await;
                    tokio::time::sleep(delay).await;
                    attempt_no += 1;
                }
                RetryDecision::Fallback { reason } => {
                    self.events
                        .emit(Event::StrategyAbandoned {
                            invocation_id: call.invocation_id,
                            operation: call.operation.to_string(),
                            strategy: strategy.name().to_string(),
                            reason: reason.to_string(),
                        })
                        .await;
                    return StrategyOutcome::Exhausted;
                }
            }
        }
    }

    async fn invoke_bounded<T: Send + 'static>(
        &self,
        strategy: &Strategy<T>,
        deadline: Option<Instant>,
    ) -> Invocation<T> {
        let attempt_limit = self.config.attempt_timeout.map(|t| Instant::now() + t);
        let limit = match (attempt_limit, deadline) {
            (Some(a), Some(d)) => Some(a.min(d)),
            (a, d) => a.or(d),
        };

        let Some(limit) = limit else {
            return Invocation::Done(strategy.invoke().await);
        };

        match tokio::time::timeout_at(limit, strategy.invoke()).await {
            Ok(r) => Invocation::Done(r),
            Err(_) if deadline.is_some_and(|d| Instant::now() >= d) => Invocation::DeadlineHit,
            Err(_) => Invocation::Done(Err(StrategyError::Timeout(format!(
                "no response within {}ms",
                self.config.attempt_timeout.unwrap_or_default().as_millis()
            )))),
        }
    }

    /// Terminal event for a result whose success was deferred via [`Scope`].
    pub(crate) async fn report_outcome<T>(&self, result: &ExecutionResult<T>) {
        match (result.strategy(), result.error()) {
            (Some(strategy), _) => {
                self.events
                    .emit(Event::OperationSucceeded {
                        invocation_id: result.invocation_id,
                        operation: result.operation.clone(),
                        strategy: strategy.to_string(),
                        attempts: result.attempts.len(),
                    })
                    .await;
            }
            (None, Some(error)) => {
                self.emit_failed(result.invocation_id, &result.operation, error)
                    .await;
            }
            (None, None) => {}
        }
    }

    async fn emit_failed(&self, invocation_id: Uuid, operation: &str, error: &ExecutionError) {
        self.events
            .emit(Event::OperationFailed {
                invocation_id,
                operation: operation.to_string(),
                error: error.to_string(),
            })
            .await;
    }
}

enum StrategyOutcome<T> {
    Succeeded(T),
    Exhausted,
    DeadlineHit,
}
