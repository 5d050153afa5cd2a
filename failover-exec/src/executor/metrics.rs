use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::executor::{Event, EventSink};

#[derive(Debug, Clone, Default)]
pub struct OperationMetrics {
    pub operation: String,
    pub status: String,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration: Option<Duration>,
    pub strategies_tried: usize,
    pub fallbacks: usize,
    pub attempts: usize,
    pub attempt_failures: usize,
    pub retries: usize,
    pub succeeded_with: Option<String>,
}

impl OperationMetrics {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: "running".to_string(),
            started_at: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_attempt(&mut self, first_of_strategy: bool) {
        self.attempts += 1;
        if first_of_strategy {
            self.strategies_tried += 1;
        }
    }

    pub fn record_attempt_failure(&mut self) {
        self.attempt_failures += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn finish(&mut self, succeeded_with: Option<String>) {
        self.status = if succeeded_with.is_some() {
            "succeeded".to_string()
        } else {
            "failed".to_string()
        };
        self.succeeded_with = succeeded_with;
        self.finished_at = Some(Instant::now());
        if let (Some(started), Some(finished)) = (self.started_at, self.finished_at) {
            self.total_duration = Some(finished.duration_since(started));
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "operation": self.operation,
            "status": self.status,
            "succeeded_with": self.succeeded_with,
            "duration_ms": self.total_duration.map(|d| d.as_millis() as u64),
            "strategies": {
                "tried": self.strategies_tried,
                "fallbacks": self.fallbacks,
            },
            "attempts": {
                "total": self.attempts,
                "failed": self.attempt_failures,
                "retries": self.retries,
            },
        })
    }
}

pub struct MetricsCollector {
    operation: String,
    metrics: Arc<Mutex<OperationMetrics>>,
}

impl MetricsCollector {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self {
            metrics: Arc::new(Mutex::new(OperationMetrics::new(operation.clone()))),
            operation,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub async fn record_attempt(&self, first_of_strategy: bool) {
        self.metrics.lock().await.record_attempt(first_of_strategy);
    }

    pub async fn record_attempt_failure(&self) {
        self.metrics.lock().await.record_attempt_failure();
    }

    pub async fn record_retry(&self) {
        self.metrics.lock().await.record_retry();
    }

    pub async fn record_fallback(&self) {
        self.metrics.lock().await.record_fallback();
    }

    pub async fn finish(&self, succeeded_with: Option<String>) {
        self.metrics.lock().await.finish(succeeded_with);
    }

    pub async fn get_metrics(&self) -> OperationMetrics {
        self.metrics.lock().await.clone()
    }
}

pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

#[async_trait]
impl EventSink for MetricsEventSink {
    async fn emit(&self, event: Event) {
        // Verification calls run as their own operation and are not counted.
        if event.operation() != self.collector.operation() {
            self.base.emit(event).await;
            return;
        }
        match &event {
            Event::AttemptStarted { attempt_no, .. } => {
                self.collector.record_attempt(*attempt_no == 1).await;
            }
            Event::AttemptFailed { .. } => {
                self.collector.record_attempt_failure().await;
            }
            Event::RetryScheduled { .. } => {
                self.collector.record_retry().await;
            }
            Event::StrategyAbandoned { .. } => {
                self.collector.record_fallback().await;
            }
            Event::OperationSucceeded { strategy, .. } => {
                self.collector.finish(Some(strategy.clone())).await;
            }
            Event::OperationFailed { .. } => {
                self.collector.finish(None).await;
            }
            Event::OperationStarted { .. } | Event::AttemptSucceeded { .. } => {}
        }

        self.base.emit(event).await;
    }
}
