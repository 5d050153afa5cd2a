use std::path::Path;

use failover_core::Validate;
use serde::Serialize;

use crate::exit_codes;
use crate::utils::{parse_source, read_source};
use crate::OutputArgs;

#[derive(Serialize)]
struct ValidateResult {
    valid: bool,
    format: String,
    operations: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Unlike `load_document`, reports every violation as structured output.
pub async fn validate_cmd(path: &Path, output: OutputArgs) -> i32 {
    let parsed = match read_source(path, &output).and_then(|src| parse_source(&src, &output)) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };

    let errors = parsed
        .document
        .validate()
        .err()
        .map(|err| err.messages())
        .unwrap_or_default();
    let result = ValidateResult {
        valid: errors.is_empty(),
        format: format!("{:?}", parsed.format),
        operations: parsed.document.operations.len(),
        errors,
    };

    if output.wants_text() {
        if result.valid {
            println!(
                "ok: {} operation(s), {} document",
                result.operations, result.format
            );
        } else {
            eprintln!("error: {} violation(s)", result.errors.len());
            for e in &result.errors {
                eprintln!("  {e}");
            }
        }
    } else {
        output.result(&result);
    }

    match result.valid {
        true => exit_codes::SUCCESS,
        false => exit_codes::VALIDATION_FAILED,
    }
}
