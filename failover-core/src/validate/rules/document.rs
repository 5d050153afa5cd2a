use std::collections::HashSet;

use crate::types::FailoverDocument;
use crate::validate::rules::operation;
use crate::validate::validator::{Validator, ID_RE};

pub(crate) fn validate_document(v: &mut Validator, doc: &FailoverDocument) {
    v.check_extensions("$", &doc.extensions);
    v.check_version("$.failover", &doc.failover);

    if doc.operations.is_empty() {
        v.push("$.operations", "must have at least one entry");
    }

    let mut operation_ids = HashSet::<&str>::new();
    for (idx, op) in doc.operations.iter().enumerate() {
        let path = format!("$.operations[{idx}]");
        v.check_extensions(&path, &op.extensions);

        if !ID_RE.is_match(&op.operation_id) {
            v.push(
                format!("{path}.operationId"),
                "must match regex [A-Za-z0-9_\\-]+",
            );
        }
        if !operation_ids.insert(op.operation_id.as_str()) {
            v.push(format!("{path}.operationId"), "must be unique");
        }

        operation::validate_operation(v, op, &path);
    }
}
