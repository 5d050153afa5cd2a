use crate::types::RetrySpec;
use crate::validate::validator::Validator;

pub(crate) fn validate_retry(v: &mut Validator, r: &RetrySpec, path: &str) {
    if r.max_attempts_per_strategy == Some(0) {
        v.push(format!("{path}.maxAttemptsPerStrategy"), "must be at least 1");
    }
    if let Some(factor) = r.factor {
        if !factor.is_finite() || factor < 1.0 {
            v.push(format!("{path}.factor"), "must be a finite number >= 1.0");
        }
    }
    if let (Some(base), Some(max)) = (r.base_delay_ms, r.max_delay_ms) {
        if max < base {
            v.push(format!("{path}.maxDelayMs"), "must not be smaller than baseDelayMs");
        }
    }
    if r.deadline_ms == Some(0) {
        v.push(format!("{path}.deadlineMs"), "must be greater than 0");
    }
    if r.attempt_timeout_ms == Some(0) {
        v.push(format!("{path}.attemptTimeoutMs"), "must be greater than 0");
    }
    if let Some(statuses) = &r.non_retryable_statuses {
        validate_statuses(v, statuses, &format!("{path}.nonRetryableStatuses"));
    }
}

pub(crate) fn validate_statuses(v: &mut Validator, statuses: &[u16], path: &str) {
    for (idx, status) in statuses.iter().enumerate() {
        if !(100..=599).contains(status) {
            v.push(format!("{path}[{idx}]"), "must be an HTTP status code (100-599)");
        }
    }
}
