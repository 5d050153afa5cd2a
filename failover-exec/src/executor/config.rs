use std::time::Duration;

use failover_core::types::RetrySpec;

use crate::retry::{RetryClassifier, RetryConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorConfig {
    pub retry: RetryConfig,
    /// Applies to every strategy that does not carry its own classifier.
    pub classifier: RetryClassifier,
    /// Overall budget for one `execute` call, sleeps included.
    pub deadline: Option<Duration>,
    /// Bound on each single invocation; expiry counts as a transient failure.
    pub attempt_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            classifier: RetryClassifier::default(),
            deadline: None,
            attempt_timeout: None,
        }
    }
}

impl ExecutorConfig {
    pub fn with_overrides(&self, spec: &RetrySpec) -> Self {
        Self {
            retry: self.retry.with_overrides(spec),
            classifier: spec
                .non_retryable_statuses
                .as_ref()
                .map(|s| RetryClassifier::new(s.iter().copied()))
                .unwrap_or_else(|| self.classifier.clone()),
            deadline: spec
                .deadline_ms
                .map(Duration::from_millis)
                .or(self.deadline),
            attempt_timeout: spec
                .attempt_timeout_ms
                .map(Duration::from_millis)
                .or(self.attempt_timeout),
        }
    }
}
