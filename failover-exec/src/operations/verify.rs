use serde_json::Value;
use serde_json_path::JsonPath;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("invalid JSONPath `{path}`: {message}")]
    InvalidPath { path: String, message: String },
    #[error("`{path}` is {actual}, expected {expected}")]
    Mismatch {
        path: String,
        actual: String,
        expected: String,
    },
    #[error("verification request failed: {0}")]
    Unreachable(String),
}

/// Compare the first node selected by `select` with `expected`.
///
/// A path that selects nothing reads as `null`, so a removed field satisfies
/// `equals: null`.
pub fn check_verification(body: &Value, select: &str, expected: &Value) -> Result<(), VerificationError> {
    let path = JsonPath::parse(select).map_err(|e| VerificationError::InvalidPath {
        path: select.to_string(),
        message: e.to_string(),
    })?;
    let actual = path.query(body).all().first().copied().cloned().unwrap_or(Value::Null);
    if &actual == expected {
        Ok(())
    } else {
        Err(VerificationError::Mismatch {
            path: select.to_string(),
            actual: actual.to_string(),
            expected: expected.to_string(),
        })
    }
}
