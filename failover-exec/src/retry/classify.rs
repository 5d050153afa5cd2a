use std::collections::BTreeSet;

use crate::strategy::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The endpoint shape does not apply; move on without retrying.
    NonRetryable { status: u16 },
    /// Network, timeout, 5xx or anything not explicitly classified.
    Transient,
}

impl FailureClass {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureClass::Transient)
    }
}

/// Status codes that mean "wrong call shape" rather than "try again later".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryClassifier {
    non_retryable: BTreeSet<u16>,
}

impl Default for RetryClassifier {
    fn default() -> Self {
        Self::new([400, 404, 405])
    }
}

impl RetryClassifier {
    pub fn new(non_retryable: impl IntoIterator<Item = u16>) -> Self {
        Self {
            non_retryable: non_retryable.into_iter().collect(),
        }
    }

    pub fn non_retryable_statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.non_retryable.iter().copied()
    }

    pub fn is_retryable_status(&self, status: Option<u16>) -> bool {
        match status {
            Some(s) => !self.non_retryable.contains(&s),
            None => true,
        }
    }

    pub fn classify(&self, err: &StrategyError) -> FailureClass {
        match err.status() {
            Some(status) if !self.is_retryable_status(Some(status)) => {
                FailureClass::NonRetryable { status }
            }
            _ => FailureClass::Transient,
        }
    }
}
