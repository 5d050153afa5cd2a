use crate::types::{Extensions, OperationSpec};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FailoverDocument {
    /// Document format version, `1.0.x`.
    pub failover: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub operations: Vec<OperationSpec>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl FailoverDocument {
    pub fn operation(&self, operation_id: &str) -> Option<&OperationSpec> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }
}
