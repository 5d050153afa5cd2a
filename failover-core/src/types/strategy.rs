use std::collections::BTreeMap;

use crate::types::{AnyValue, Extensions, HttpMethod};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrategySpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub method: HttpMethod,

    /// Path relative to the session base URL, with `{var}` placeholders.
    pub path: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<AnyValue>,

    /// Replaces the operation-wide non-retryable set for this strategy only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "nonRetryableStatuses")]
    pub non_retryable_statuses: Option<Vec<u16>>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
