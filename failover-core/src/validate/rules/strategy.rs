use crate::template::{parse_template, value_placeholders};
use crate::types::StrategySpec;
use crate::validate::rules::retry::validate_statuses;
use crate::validate::validator::Validator;

pub(crate) fn validate_strategy(v: &mut Validator, s: &StrategySpec, path: &str) {
    validate_path(v, &s.path, &format!("{path}.path"));

    for (name, value) in &s.headers {
        if name.trim().is_empty() {
            v.push(format!("{path}.headers"), "header names must not be empty");
        }
        if let Err(e) = parse_template(value) {
            v.push(format!("{path}.headers.{name}"), format!("invalid template: {e}"));
        }
    }

    if let Some(body) = &s.body {
        if !s.method.allows_body() {
            v.push(format!("{path}.body"), format!("{} strategies must not carry a body", s.method));
        }
        if let Err(e) = value_placeholders(body) {
            v.push(format!("{path}.body"), format!("invalid template: {e}"));
        }
    }

    if let Some(statuses) = &s.non_retryable_statuses {
        validate_statuses(v, statuses, &format!("{path}.nonRetryableStatuses"));
    }
}

pub(crate) fn validate_path(v: &mut Validator, p: &str, path: &str) {
    if !p.starts_with('/') {
        v.push(path, "must start with '/'");
    }
    if let Err(e) = parse_template(p) {
        v.push(path, format!("invalid template: {e}"));
    }
}
