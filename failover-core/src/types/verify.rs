use crate::types::AnyValue;

/// Read-after-write check run once a strategy reports success.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VerifySpec {
    pub path: String,

    /// JSONPath into the response body, e.g. `$.assignedLocation`.
    pub select: String,

    /// A missing `equals` means `null`.
    #[serde(default)]
    pub equals: AnyValue,
}
