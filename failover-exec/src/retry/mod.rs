mod classify;
mod config;
mod decision;
mod headers;

pub use classify::{FailureClass, RetryClassifier};
pub use config::{Jitter, RetryConfig};
pub use decision::{decide_retry, FallbackReason, RetryDecision, RetryReason};
pub use headers::parse_retry_after;
