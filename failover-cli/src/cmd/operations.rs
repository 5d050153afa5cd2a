use std::path::Path;

use failover_core::types::FailoverDocument;
use failover_exec::operations::assignments::builtin_document;
use serde::Serialize;

use crate::exit_codes;
use crate::utils::load_document;
use crate::OutputArgs;

#[derive(Serialize)]
struct OperationInfo {
    operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    strategies: Vec<String>,
    verified: bool,
}

#[derive(Serialize)]
struct OperationsResult {
    source: String,
    operations: Vec<OperationInfo>,
}

/// Document at `path`, or the built-in one.
pub fn resolve_document(path: Option<&Path>, output: &OutputArgs) -> Result<(String, FailoverDocument), i32> {
    match path {
        Some(p) => load_document(p, output).map(|parsed| (p.display().to_string(), parsed.document)),
        None => Ok(("built-in".to_string(), builtin_document())),
    }
}

pub async fn operations_cmd(path: Option<&Path>, output: OutputArgs) -> i32 {
    let (source, doc) = match resolve_document(path, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let operations: Vec<OperationInfo> = doc
        .operations
        .iter()
        .map(|op| OperationInfo {
            operation_id: op.operation_id.clone(),
            description: op.description.clone(),
            strategies: op.strategies.iter().map(|s| s.name.clone()).collect(),
            verified: op.verify.is_some(),
        })
        .collect();
    let result = OperationsResult { source, operations };

    if output.wants_text() {
        println!("Operations in {}:", result.source);
        for op in &result.operations {
            println!("  - {} ({} strategies)", op.operation_id, op.strategies.len());
            if let Some(d) = &op.description {
                println!("    {d}");
            }
        }
    } else {
        output.result(&result);
    }

    exit_codes::SUCCESS
}
