use crate::types::{Extensions, RetrySpec, StrategySpec, VerifySpec};

/// One logical remote effect and the ordered call shapes that can achieve it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OperationSpec {
    #[serde(rename = "operationId")]
    pub operation_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySpec>,

    /// Tried strictly in this order.
    #[serde(default)]
    pub strategies: Vec<StrategySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<VerifySpec>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
