#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterMode {
    #[default]
    None,
    Full,
}

/// Per-operation retry overrides. Unset fields fall back to the executor defaults.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrySpec {
    /// Upper bound on invocations of a single strategy, first call included.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "maxRetriesPerStrategy")]
    pub max_attempts_per_strategy: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<JitterMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_retryable_statuses: Option<Vec<u16>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_timeout_ms: Option<u64>,
}
