use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::{Extensions, FailoverDocument};

use super::rules;

/// Operation ids and strategy names.
pub(crate) static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid"));

/// Document format versions this crate understands.
const SUPPORTED_MAJOR_MINOR: (&str, &str) = ("1", "0");

/// Collects every rule violation in one pass so a document can be fixed at once.
pub struct Validator {
    found: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self { found: Vec::new() }
    }

    pub fn check(&mut self, doc: &FailoverDocument) {
        rules::document::validate_document(self, doc);
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.found.is_empty() {
            true => Ok(()),
            false => Err(ValidationError::new(self.found)),
        }
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.found.push(Violation::new(path, message));
    }

    pub(crate) fn check_version(&mut self, path: &str, version: &str) {
        let mut parts = version.splitn(3, '.');
        match (parts.next(), parts.next()) {
            (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
                if (major, minor) != SUPPORTED_MAJOR_MINOR {
                    self.push(path, format!("unsupported format version `{version}`, expected 1.0.x"));
                }
            }
            _ => self.push(path, "must look like major.minor[.patch]"),
        }
    }

    /// Only `x-` prefixed keys survive in the flattened extension maps.
    pub(crate) fn check_extensions(&mut self, path: &str, ext: &Extensions) {
        for key in ext.keys().filter(|key| !key.starts_with("x-")) {
            self.push(format!("{path}.{key}"), "unknown field (only x-* extensions are allowed)");
        }
    }
}
