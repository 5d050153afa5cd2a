use std::time::Duration;

use crate::retry::classify::FailureClass;
use crate::retry::config::{Jitter, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep, then call the same strategy again.
    RetryAfter { delay: Duration, reason: RetryReason },
    /// Give up on this strategy and advance to the next one.
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Backoff,
    RetryAfterHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NonRetryable { status: u16 },
    AttemptsExhausted { attempts: usize },
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::NonRetryable { status } => write!(f, "non-retryable status {status}"),
            FallbackReason::AttemptsExhausted { attempts } => {
                write!(f, "gave up after {attempts} attempt(s)")
            }
        }
    }
}

/// Decide whether a failed attempt is retried within its strategy and how long to wait.
///
/// - `attempt_no`: 1-based attempt number within the current strategy.
/// - `class`: how the failure was classified.
/// - `retry_after`: server-provided delay, if any.
/// - `rand_u64`: RNG for full jitter.
pub fn decide_retry(
    cfg: &RetryConfig,
    attempt_no: usize,
    class: FailureClass,
    retry_after: Option<Duration>,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    if let FailureClass::NonRetryable { status } = class {
        return RetryDecision::Fallback {
            reason: FallbackReason::NonRetryable { status },
        };
    }

    if attempt_no >= cfg.max_attempts_per_strategy.max(1) {
        return RetryDecision::Fallback {
            reason: FallbackReason::AttemptsExhausted {
                attempts: attempt_no,
            },
        };
    }

    let backoff = cfg.backoff(attempt_no);
    let backoff_ms = backoff.as_millis() as u64;
    let delay = match cfg.jitter {
        Jitter::None => backoff,
        Jitter::Full if backoff_ms == 0 => backoff,
        Jitter::Full => Duration::from_millis(rand_u64() % (backoff_ms + 1)),
    };

    if cfg.respect_retry_after {
        if let Some(server_delay) = retry_after {
            if server_delay > delay {
                return RetryDecision::RetryAfter {
                    delay: server_delay.min(cfg.max_delay),
                    reason: RetryReason::RetryAfterHeader,
                };
            }
        }
    }

    RetryDecision::RetryAfter {
        delay,
        reason: RetryReason::Backoff,
    }
}
