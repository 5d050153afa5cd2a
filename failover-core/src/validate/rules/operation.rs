use std::collections::HashSet;

use crate::template::parse_template;
use crate::types::OperationSpec;
use crate::validate::rules::{retry, strategy};
use crate::validate::validator::{Validator, ID_RE};

pub(crate) fn validate_operation(v: &mut Validator, op: &OperationSpec, path: &str) {
    if let Some(r) = &op.retry {
        retry::validate_retry(v, r, &format!("{path}.retry"));
    }

    // An empty list can never succeed and must be rejected before any remote call.
    if op.strategies.is_empty() {
        v.push(format!("{path}.strategies"), "must have at least one strategy");
    }

    let mut names = HashSet::<&str>::new();
    for (idx, s) in op.strategies.iter().enumerate() {
        let spath = format!("{path}.strategies[{idx}]");
        v.check_extensions(&spath, &s.extensions);
        if !ID_RE.is_match(&s.name) {
            v.push(format!("{spath}.name"), "must match regex [A-Za-z0-9_\\-]+");
        }
        if !names.insert(s.name.as_str()) {
            v.push(format!("{spath}.name"), "must be unique within the operation");
        }
        strategy::validate_strategy(v, s, &spath);
    }

    if let Some(verify) = &op.verify {
        let vpath = format!("{path}.verify");
        strategy::validate_path(v, &verify.path, &format!("{vpath}.path"));
        if !verify.select.trim().starts_with('$') {
            v.push(format!("{vpath}.select"), "must be a JSONPath expression starting with '$'");
        }
        if let Err(e) = parse_template(&verify.select) {
            v.push(format!("{vpath}.select"), format!("invalid template: {e}"));
        }
    }
}
