use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        retryable: bool,
        error: String,
    },
}

/// One invocation of one strategy. Kept only for diagnostics of a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionAttempt {
    pub strategy_index: usize,
    pub strategy: String,
    pub attempt_no: usize,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("operation `{operation}` has no strategies configured")]
    NoStrategies { operation: String },
    #[error(
        "operation `{operation}` failed: all {} strategies exhausted (tried: {})",
        .tried.len(),
        .tried.join(", ")
    )]
    Exhausted {
        operation: String,
        tried: Vec<String>,
        last_error: Option<String>,
    },
    #[error(
        "operation `{operation}` aborted: deadline of {}ms exceeded (tried: {})",
        .deadline.as_millis(),
        .tried.join(", ")
    )]
    DeadlineExceeded {
        operation: String,
        deadline: Duration,
        tried: Vec<String>,
    },
    #[error("operation `{operation}` succeeded via `{strategy}` but verification failed: {reason}")]
    VerificationFailed {
        operation: String,
        strategy: String,
        reason: String,
    },
}

impl ExecutionError {
    /// Misconfiguration detected before any remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ExecutionError::NoStrategies { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::NoStrategies { .. } => "configuration",
            ExecutionError::Exhausted { .. } => "exhausted",
            ExecutionError::DeadlineExceeded { .. } => "deadline_exceeded",
            ExecutionError::VerificationFailed { .. } => "verification_failed",
        }
    }
}

#[derive(Debug)]
struct Completed<T> {
    strategy: String,
    data: T,
}

/// Terminal outcome of one `execute` call.
#[derive(Debug)]
pub struct ExecutionResult<T> {
    pub invocation_id: Uuid,
    pub operation: String,
    pub attempts: Vec<ExecutionAttempt>,
    outcome: Result<Completed<T>, ExecutionError>,
}

impl<T> ExecutionResult<T> {
    pub(crate) fn succeeded(
        invocation_id: Uuid,
        operation: &str,
        strategy: &str,
        data: T,
        attempts: Vec<ExecutionAttempt>,
    ) -> Self {
        Self {
            invocation_id,
            operation: operation.to_string(),
            attempts,
            outcome: Ok(Completed {
                strategy: strategy.to_string(),
                data,
            }),
        }
    }

    pub(crate) fn failed(
        invocation_id: Uuid,
        operation: &str,
        error: ExecutionError,
        attempts: Vec<ExecutionAttempt>,
    ) -> Self {
        Self {
            invocation_id,
            operation: operation.to_string(),
            attempts,
            outcome: Err(error),
        }
    }

    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok().map(|c| &c.data)
    }

    /// Name of the strategy that succeeded.
    pub fn strategy(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(|c| c.strategy.as_str())
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        self.outcome.as_ref().err()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    pub fn into_result(self) -> Result<T, ExecutionError> {
        self.outcome.map(|c| c.data)
    }

    /// Downgrade a success whose effect could not be confirmed.
    pub fn fail_verification(self, reason: impl Into<String>) -> Self {
        let outcome = match self.outcome {
            Ok(c) => Err(ExecutionError::VerificationFailed {
                operation: self.operation.clone(),
                strategy: c.strategy,
                reason: reason.into(),
            }),
            Err(e) => Err(e),
        };
        Self { outcome, ..self }
    }
}
