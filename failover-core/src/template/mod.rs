//! `{name}` placeholder templates used in strategy paths, headers and bodies.
//!
//! `{{` and `}}` produce literal braces.

use std::sync::LazyLock;

use regex::Regex;

static VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Var(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unclosed placeholder (missing '}}')")]
    Unclosed,
    #[error("unmatched '}}' (use '}}}}' for a literal brace)")]
    UnmatchedClose,
    #[error("invalid placeholder name: {0:?}")]
    InvalidName(String),
}

pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    let mut segments = Vec::new();
    let mut buf = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                buf.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                buf.push('}');
            }
            '}' => return Err(TemplateError::UnmatchedClose),
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(TemplateError::Unclosed);
                }
                let name = name.trim();
                if !VAR_RE.is_match(name) {
                    return Err(TemplateError::InvalidName(name.to_string()));
                }
                if !buf.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut buf)));
                }
                segments.push(Segment::Var(name.to_string()));
            }
            _ => buf.push(ch),
        }
    }

    if !buf.is_empty() {
        segments.push(Segment::Literal(buf));
    }

    Ok(Template { segments })
}

impl Template {
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Var(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// The variable name if the whole template is exactly one placeholder.
    pub fn as_single_var(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [Segment::Var(name)] => Some(name),
            _ => None,
        }
    }

    /// Substitute every placeholder through `lookup`.
    ///
    /// On failure returns the names that `lookup` could not resolve, in order of
    /// first appearance.
    pub fn render<F>(&self, mut lookup: F) -> Result<String, Vec<String>>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::new();
        let mut missing: Vec<String> = Vec::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Var(name) => match lookup(name) {
                    Some(v) => out.push_str(&v),
                    None => {
                        if !missing.iter().any(|m| m == name) {
                            missing.push(name.clone());
                        }
                    }
                },
            }
        }
        if missing.is_empty() {
            Ok(out)
        } else {
            Err(missing)
        }
    }
}

/// Placeholder names found anywhere inside a JSON value's strings.
pub fn value_placeholders(value: &serde_json::Value) -> Result<Vec<String>, TemplateError> {
    let mut out = Vec::new();
    collect_value_placeholders(value, &mut out)?;
    Ok(out)
}

fn collect_value_placeholders(
    value: &serde_json::Value,
    out: &mut Vec<String>,
) -> Result<(), TemplateError> {
    match value {
        serde_json::Value::String(s) => {
            for name in parse_template(s)?.placeholders() {
                if !out.iter().any(|o| o == name) {
                    out.push(name.to_string());
                }
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_value_placeholders(v, out)?;
            }
        }
        serde_json::Value::Object(map) => {
            for v in map.values() {
                collect_value_placeholders(v, out)?;
            }
        }
        serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {}
    }
    Ok(())
}
