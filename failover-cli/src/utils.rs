use std::collections::BTreeMap;
use std::path::Path;

use failover_core::{parse_document_str, DocumentFormat, ParsedDocument, Validate};
use serde_json::Value;

use crate::exit_codes;
use crate::{OutputArgs, VarsArgs};

/// Raw document text. `Err` carries the exit code, as in the helpers below.
pub fn read_source(path: &Path, output: &OutputArgs) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        output.error(&format!("failed to read {}: {e}", path.display()));
        exit_codes::RUNTIME_ERROR
    })
}

/// JSON or YAML, whichever the content looks like.
pub fn parse_source(content: &str, output: &OutputArgs) -> Result<ParsedDocument, i32> {
    parse_document_str(content, DocumentFormat::Auto).map_err(|e| {
        output.error(&e.to_string());
        exit_codes::VALIDATION_FAILED
    })
}

/// Read, parse and validate an operation document.
pub fn load_document(path: &Path, output: &OutputArgs) -> Result<ParsedDocument, i32> {
    let parsed = parse_source(&read_source(path, output)?, output)?;
    if let Err(err) = parsed.document.validate() {
        output.error(&format!("{err}: {}", err.messages().join("; ")));
        return Err(exit_codes::VALIDATION_FAILED);
    }
    Ok(parsed)
}

/// Variables from `--vars` (JSON or YAML object) with `--set` entries layered on top.
pub fn load_vars(args: &VarsArgs, output: &OutputArgs) -> Option<BTreeMap<String, Value>> {
    let mut vars = BTreeMap::new();

    if let Some(path) = &args.vars {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                output.error(&format!("failed to read vars: {e}"));
                return None;
            }
        };
        let parsed: Option<Value> = serde_json::from_str(&content)
            .ok()
            .or_else(|| serde_yaml::from_str(&content).ok());
        match parsed {
            Some(Value::Object(map)) => vars.extend(map),
            Some(_) => {
                output.error("vars file must contain an object");
                return None;
            }
            None => {
                output.error("vars file is neither valid JSON nor YAML");
                return None;
            }
        }
    }

    for s in &args.set_vars {
        match s.split_once('=') {
            Some((k, v)) => {
                vars.insert(k.to_string(), Value::String(v.to_string()));
            }
            None => {
                output.error(&format!("invalid --set `{s}` (expected KEY=VALUE)"));
                return None;
            }
        }
    }
    Some(vars)
}
