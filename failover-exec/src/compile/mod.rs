use std::collections::BTreeMap;

use failover_core::template::{parse_template, TemplateError};
use failover_core::types::{HttpMethod, OperationSpec};
use serde_json::Value;

use crate::executor::ExecutorConfig;
use crate::retry::RetryClassifier;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledOperation {
    pub operation_id: String,
    pub config: ExecutorConfig,
    pub strategies: Vec<CompiledStrategy>,
    pub verify: Option<CompiledVerify>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStrategy {
    pub name: String,
    pub method: HttpMethod,
    /// Rendered, percent-encoded path.
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub classifier: Option<RetryClassifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledVerify {
    pub path: String,
    pub select: String,
    pub equals: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MissingVariable {
    pub name: String,
    /// Where the placeholder appears, e.g. `strategies[0].path`.
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("missing variables: {}", format_missing(.0))]
    MissingVariables(Vec<MissingVariable>),
    #[error("invalid template at {location}: {source}")]
    Template {
        location: String,
        source: TemplateError,
    },
}

fn format_missing(missing: &[MissingVariable]) -> String {
    missing
        .iter()
        .map(|m| format!("{} ({})", m.name, m.location))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Turns an operation document entry plus variables into concrete calls.
pub struct Compiler {
    defaults: ExecutorConfig,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

impl Compiler {
    pub fn new(defaults: ExecutorConfig) -> Self {
        Self { defaults }
    }

    pub fn compile(
        &self,
        op: &OperationSpec,
        vars: &BTreeMap<String, Value>,
    ) -> Result<CompiledOperation, CompileError> {
        let mut ctx = RenderCtx {
            vars,
            missing: Vec::new(),
        };

        let mut strategies = Vec::with_capacity(op.strategies.len());
        for (idx, s) in op.strategies.iter().enumerate() {
            let loc = format!("strategies[{idx}]");
            let path = ctx.render_str(&s.path, &format!("{loc}.path"), true)?;

            let mut headers = BTreeMap::new();
            for (name, value) in &s.headers {
                let rendered = ctx.render_str(value, &format!("{loc}.headers.{name}"), false)?;
                headers.insert(name.clone(), rendered);
            }

            let body = match &s.body {
                Some(b) => Some(ctx.render_value(b, &format!("{loc}.body"))?),
                None => None,
            };

            strategies.push(CompiledStrategy {
                name: s.name.clone(),
                method: s.method,
                path,
                headers,
                body,
                classifier: s
                    .non_retryable_statuses
                    .as_ref()
                    .map(|st| RetryClassifier::new(st.iter().copied())),
            });
        }

        let verify = match &op.verify {
            Some(v) => Some(CompiledVerify {
                path: ctx.render_str(&v.path, "verify.path", true)?,
                select: ctx.render_str(&v.select, "verify.select", false)?,
                equals: v.equals.clone(),
            }),
            None => None,
        };

        if !ctx.missing.is_empty() {
            return Err(CompileError::MissingVariables(ctx.missing));
        }

        let config = match &op.retry {
            Some(r) => self.defaults.with_overrides(r),
            None => self.defaults.clone(),
        };

        Ok(CompiledOperation {
            operation_id: op.operation_id.clone(),
            config,
            strategies,
            verify,
        })
    }
}

struct RenderCtx<'a> {
    vars: &'a BTreeMap<String, Value>,
    missing: Vec<MissingVariable>,
}

impl RenderCtx<'_> {
    fn render_str(&mut self, input: &str, location: &str, encode: bool) -> Result<String, CompileError> {
        let template = parse_template(input).map_err(|source| CompileError::Template {
            location: location.to_string(),
            source,
        })?;
        let vars = self.vars;
        let rendered = template.render(|name| {
            vars.get(name).map(|v| {
                let raw = value_to_string(v);
                if encode {
                    urlencoding::encode(&raw).into_owned()
                } else {
                    raw
                }
            })
        });
        match rendered {
            Ok(s) => Ok(s),
            Err(names) => {
                self.missing.extend(names.into_iter().map(|name| MissingVariable {
                    name,
                    location: location.to_string(),
                }));
                Ok(String::new())
            }
        }
    }

    fn render_value(&mut self, value: &Value, location: &str) -> Result<Value, CompileError> {
        match value {
            Value::String(s) => {
                let template = parse_template(s).map_err(|source| CompileError::Template {
                    location: location.to_string(),
                    source,
                })?;
                // A lone placeholder keeps the variable's JSON type (null, number, object).
                if let Some(name) = template.as_single_var() {
                    return match self.vars.get(name) {
                        Some(v) => Ok(v.clone()),
                        None => {
                            self.missing.push(MissingVariable {
                                name: name.to_string(),
                                location: location.to_string(),
                            });
                            Ok(Value::Null)
                        }
                    };
                }
                self.render_str(s, location, false).map(Value::String)
            }
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| self.render_value(v, &format!("{location}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    out.insert(k.clone(), self.render_value(v, &format!("{location}.{k}"))?);
                }
                Ok(Value::Object(out))
            }
            other => Ok(other.clone()),
        }
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
