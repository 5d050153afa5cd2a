use std::time::Duration;

use failover_core::types::{JitterMode, RetrySpec};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Invocations allowed per strategy, the first call included.
    pub max_attempts_per_strategy: usize,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub jitter: Jitter,
    /// Honour `Retry-After` on transient HTTP failures.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts_per_strategy: 2,
            base_delay: Duration::from_millis(200),
            factor: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: Jitter::None,
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    /// Layer document overrides on top of `self`.
    pub fn with_overrides(&self, spec: &RetrySpec) -> Self {
        let mut cfg = self.clone();
        if let Some(v) = spec.max_attempts_per_strategy {
            cfg.max_attempts_per_strategy = v.max(1);
        }
        if let Some(v) = spec.base_delay_ms {
            cfg.base_delay = Duration::from_millis(v);
        }
        if let Some(v) = spec.factor {
            cfg.factor = v;
        }
        if let Some(v) = spec.max_delay_ms {
            cfg.max_delay = Duration::from_millis(v);
        }
        if let Some(v) = spec.jitter {
            cfg.jitter = v.into();
        }
        cfg
    }

    /// Delays that would be slept between attempts of one strategy, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts_per_strategy)
            .map(|attempt_no| self.backoff(attempt_no))
            .collect()
    }

    /// Un-jittered delay after the given 1-based attempt: `base * factor^attempt_no`.
    pub fn backoff(&self, attempt_no: usize) -> Duration {
        let exp = attempt_no.min(i32::MAX as usize) as i32;
        let raw = (self.base_delay.as_millis() as f64) * self.factor.powi(exp);
        let raw_ms = raw.min(self.max_delay.as_millis() as f64).max(0.0) as u64;
        Duration::from_millis(raw_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    #[default]
    None,
    /// Uniform in `[0, delay]`.
    Full,
}

impl From<JitterMode> for Jitter {
    fn from(mode: JitterMode) -> Self {
        match mode {
            JitterMode::None => Jitter::None,
            JitterMode::Full => Jitter::Full,
        }
    }
}

impl std::str::FromStr for Jitter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Jitter::None),
            "full" => Ok(Jitter::Full),
            other => Err(format!("unknown jitter mode `{other}` (expected none or full)")),
        }
    }
}
