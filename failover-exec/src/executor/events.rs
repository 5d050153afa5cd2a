use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OperationStarted {
        invocation_id: Uuid,
        /// Set when this operation runs on behalf of another, e.g. a verify call.
        parent_invocation_id: Option<Uuid>,
        operation: String,
        strategies: usize,
    },
    AttemptStarted {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        strategy_index: usize,
        attempt_no: usize,
    },
    AttemptSucceeded {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        attempt_no: usize,
        elapsed_ms: u64,
    },
    AttemptFailed {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        attempt_no: usize,
        status: Option<u16>,
        retryable: bool,
        error: String,
    },
    RetryScheduled {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        attempt_no: usize,
        delay_ms: u64,
    },
    StrategyAbandoned {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        reason: String,
    },
    OperationSucceeded {
        invocation_id: Uuid,
        operation: String,
        strategy: String,
        attempts: usize,
    },
    OperationFailed {
        invocation_id: Uuid,
        operation: String,
        error: String,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::OperationStarted { .. } => "operation.started",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptSucceeded { .. } => "attempt.succeeded",
            Event::AttemptFailed { .. } => "attempt.failed",
            Event::RetryScheduled { .. } => "attempt.retry_scheduled",
            Event::StrategyAbandoned { .. } => "strategy.abandoned",
            Event::OperationSucceeded { .. } => "operation.succeeded",
            Event::OperationFailed { .. } => "operation.failed",
        }
    }

    pub fn invocation_id(&self) -> Uuid {
        match self {
            Event::OperationStarted { invocation_id, .. }
            | Event::AttemptStarted { invocation_id, .. }
            | Event::AttemptSucceeded { invocation_id, .. }
            | Event::AttemptFailed { invocation_id, .. }
            | Event::RetryScheduled { invocation_id, .. }
            | Event::StrategyAbandoned { invocation_id, .. }
            | Event::OperationSucceeded { invocation_id, .. }
            | Event::OperationFailed { invocation_id, .. } => *invocation_id,
        }
    }

    pub fn operation(&self) -> &str {
        match self {
            Event::OperationStarted { operation, .. }
            | Event::AttemptStarted { operation, .. }
            | Event::AttemptSucceeded { operation, .. }
            | Event::AttemptFailed { operation, .. }
            | Event::RetryScheduled { operation, .. }
            | Event::StrategyAbandoned { operation, .. }
            | Event::OperationSucceeded { operation, .. }
            | Event::OperationFailed { operation, .. } => operation,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut payload = match self {
            Event::OperationStarted {
                operation,
                strategies,
                parent_invocation_id,
                ..
            } => {
                let mut started = json!({ "operation": operation, "strategies": strategies });
                if let Some(parent) = parent_invocation_id {
                    started["parent_invocation_id"] = json!(parent.to_string());
                }
                started
            }
            Event::AttemptStarted {
                operation,
                strategy,
                strategy_index,
                attempt_no,
                ..
            } => json!({
                "operation": operation,
                "strategy": strategy,
                "strategy_index": strategy_index,
                "attempt_no": attempt_no
            }),
            Event::AttemptSucceeded {
                operation,
                strategy,
                attempt_no,
                elapsed_ms,
                ..
            } => json!({
                "operation": operation,
                "strategy": strategy,
                "attempt_no": attempt_no,
                "elapsed_ms": elapsed_ms
            }),
            Event::AttemptFailed {
                operation,
                strategy,
                attempt_no,
                status,
                retryable,
                error,
                ..
            } => json!({
                "operation": operation,
                "strategy": strategy,
                "attempt_no": attempt_no,
                "status": status,
                "retryable": retryable,
                "error": error
            }),
            Event::RetryScheduled {
                operation,
                strategy,
                attempt_no,
                delay_ms,
                ..
            } => json!({
                "operation": operation,
                "strategy": strategy,
                "attempt_no": attempt_no,
                "delay_ms": delay_ms
            }),
            Event::StrategyAbandoned {
                operation,
                strategy,
                reason,
                ..
            } => json!({ "operation": operation, "strategy": strategy, "reason": reason }),
            Event::OperationSucceeded {
                operation,
                strategy,
                attempts,
                ..
            } => json!({ "operation": operation, "strategy": strategy, "attempts": attempts }),
            Event::OperationFailed {
                operation, error, ..
            } => json!({ "operation": operation, "error": error }),
        };
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("type".to_string(), json!(self.kind()));
            obj.insert(
                "invocation_id".to_string(),
                json!(self.invocation_id().to_string()),
            );
        }
        payload
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Stream a [`JsonLinesEventSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTarget {
    Stdout,
    Stderr,
}

/// One JSON object per line, stamped with an RFC 3339 `at`.
pub struct JsonLinesEventSink {
    target: LineTarget,
}

impl JsonLinesEventSink {
    pub fn new(target: LineTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> LineTarget {
        self.target
    }
}

#[async_trait]
impl EventSink for JsonLinesEventSink {
    async fn emit(&self, event: Event) {
        let mut json = event.to_json();
        if let Some(obj) = json.as_object_mut() {
            obj.insert("at".to_string(), json!(chrono::Utc::now().to_rfc3339()));
        }
        let line = serde_json::to_string(&json).unwrap_or_default();
        match self.target {
            LineTarget::Stdout => println!("{line}"),
            LineTarget::Stderr => eprintln!("{line}"),
        }
    }
}

/// Forwards events to `tracing`; failed attempts are logged at `warn`.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        let invocation_id = event.invocation_id();
        match &event {
            Event::OperationStarted {
                operation,
                strategies,
                parent_invocation_id,
                ..
            } => tracing::info!(
                %invocation_id,
                parent = ?parent_invocation_id,
                %operation,
                strategies,
                "operation started"
            ),
            Event::AttemptStarted {
                operation,
                strategy,
                attempt_no,
                ..
            } => tracing::debug!(%invocation_id, %operation, %strategy, attempt_no, "attempt started"),
            Event::AttemptSucceeded {
                operation,
                strategy,
                attempt_no,
                elapsed_ms,
                ..
            } => tracing::debug!(
                %invocation_id,
                %operation,
                %strategy,
                attempt_no,
                elapsed_ms,
                "attempt succeeded"
            ),
            Event::AttemptFailed {
                operation,
                strategy,
                attempt_no,
                status,
                retryable,
                error,
                ..
            } => tracing::warn!(
                %invocation_id,
                %operation,
                %strategy,
                attempt_no,
                status = ?status,
                retryable,
                %error,
                "attempt failed"
            ),
            Event::RetryScheduled {
                operation,
                strategy,
                attempt_no,
                delay_ms,
                ..
            } => tracing::debug!(
                %invocation_id,
                %operation,
                %strategy,
                attempt_no,
                delay_ms,
                "retry scheduled"
            ),
            Event::StrategyAbandoned {
                operation,
                strategy,
                reason,
                ..
            } => tracing::info!(%invocation_id, %operation, %strategy, %reason, "falling back"),
            Event::OperationSucceeded {
                operation,
                strategy,
                attempts,
                ..
            } => tracing::info!(%invocation_id, %operation, %strategy, attempts, "operation succeeded"),
            Event::OperationFailed {
                operation, error, ..
            } => tracing::warn!(%invocation_id, %operation, %error, "operation failed"),
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
