use std::path::Path;

use failover_core::types::OperationSpec;
use failover_exec::retry::{Jitter, RetryClassifier};
use failover_exec::{Compiler, ExecutorConfig};
use serde::Serialize;
use serde_json::Value;

use crate::exit_codes;
use crate::utils::load_vars;
use crate::{OutputArgs, RetryArgs, VarsArgs};

use super::config::RetryOverrides;
use super::operations::resolve_document;

#[derive(Serialize)]
struct PlanStrategy {
    name: String,
    method: String,
    path: String,
    non_retryable: Vec<u16>,
}

#[derive(Serialize)]
struct PlanVerify {
    path: String,
    select: String,
    equals: Value,
}

#[derive(Serialize)]
struct PlanOperation {
    operation_id: String,
    max_attempts_per_strategy: usize,
    backoff_ms: Vec<u64>,
    jitter: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    deadline_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempt_timeout_ms: Option<u64>,
    strategies: Vec<PlanStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify: Option<PlanVerify>,
}

#[derive(Serialize)]
struct PlanResult {
    source: String,
    rendered: bool,
    operations: Vec<PlanOperation>,
}

pub async fn plan_cmd(
    path: Option<&Path>,
    operation: Option<&str>,
    vars: VarsArgs,
    output: OutputArgs,
    retry: RetryArgs,
) -> i32 {
    let (source, doc) = match resolve_document(path, &output) {
        Ok(v) => v,
        Err(code) => return code,
    };
    let overrides = match RetryOverrides::from_args(&retry) {
        Ok(o) => o,
        Err(e) => {
            output.error(&e);
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let selected: Vec<&OperationSpec> = match operation {
        Some(id) => match doc.operation(id) {
            Some(op) => vec![op],
            None => {
                output.error(&format!("operation `{id}` not found in {source}"));
                return exit_codes::VALIDATION_FAILED;
            }
        },
        None => doc.operations.iter().collect(),
    };

    // Paths are only rendered when variables are supplied.
    let render = vars.vars.is_some() || !vars.set_vars.is_empty();
    let vars = match load_vars(&vars, &output) {
        Some(v) => v,
        None => return exit_codes::RUNTIME_ERROR,
    };

    let mut operations = Vec::with_capacity(selected.len());
    for op in selected {
        let planned = if render {
            match Compiler::default().compile(op, &vars) {
                Ok(compiled) => {
                    let config = overrides.apply(&compiled.config);
                    let strategies = compiled
                        .strategies
                        .iter()
                        .map(|s| PlanStrategy {
                            name: s.name.clone(),
                            method: s.method.to_string(),
                            path: s.path.clone(),
                            non_retryable: statuses(s.classifier.as_ref(), &config),
                        })
                        .collect();
                    let verify = compiled.verify.map(|v| PlanVerify {
                        path: v.path,
                        select: v.select,
                        equals: v.equals,
                    });
                    plan_operation(&op.operation_id, &config, strategies, verify)
                }
                Err(e) => {
                    output.error(&format!("{}: {e}", op.operation_id));
                    return exit_codes::VALIDATION_FAILED;
                }
            }
        } else {
            let base = match &op.retry {
                Some(r) => ExecutorConfig::default().with_overrides(r),
                None => ExecutorConfig::default(),
            };
            let config = overrides.apply(&base);
            let strategies = op
                .strategies
                .iter()
                .map(|s| {
                    let own = s
                        .non_retryable_statuses
                        .as_ref()
                        .map(|st| RetryClassifier::new(st.iter().copied()));
                    PlanStrategy {
                        name: s.name.clone(),
                        method: s.method.to_string(),
                        path: s.path.clone(),
                        non_retryable: statuses(own.as_ref(), &config),
                    }
                })
                .collect();
            let verify = op.verify.as_ref().map(|v| PlanVerify {
                path: v.path.clone(),
                select: v.select.clone(),
                equals: v.equals.clone(),
            });
            plan_operation(&op.operation_id, &config, strategies, verify)
        };
        operations.push(planned);
    }

    let result = PlanResult {
        source,
        rendered: render,
        operations,
    };

    if output.wants_text() {
        print_text(&result);
    } else {
        output.result(&result);
    }
    exit_codes::SUCCESS
}

fn statuses(own: Option<&RetryClassifier>, config: &ExecutorConfig) -> Vec<u16> {
    own.unwrap_or(&config.classifier)
        .non_retryable_statuses()
        .collect()
}

fn plan_operation(
    operation_id: &str,
    config: &ExecutorConfig,
    strategies: Vec<PlanStrategy>,
    verify: Option<PlanVerify>,
) -> PlanOperation {
    PlanOperation {
        operation_id: operation_id.to_string(),
        max_attempts_per_strategy: config.retry.max_attempts_per_strategy,
        backoff_ms: config
            .retry
            .schedule()
            .iter()
            .map(|d| d.as_millis() as u64)
            .collect(),
        jitter: config.retry.jitter == Jitter::Full,
        deadline_ms: config.deadline.map(|d| d.as_millis() as u64),
        attempt_timeout_ms: config.attempt_timeout.map(|d| d.as_millis() as u64),
        strategies,
        verify,
    }
}

fn print_text(result: &PlanResult) {
    println!("Plan for {}:", result.source);
    for op in &result.operations {
        let backoff: Vec<String> = op.backoff_ms.iter().map(|ms| format!("{ms}ms")).collect();
        println!(
            "  {} ({} attempt(s) per strategy, backoff [{}]{})",
            op.operation_id,
            op.max_attempts_per_strategy,
            backoff.join(", "),
            if op.jitter { ", full jitter" } else { "" }
        );
        if let Some(ms) = op.deadline_ms {
            println!("    deadline: {ms}ms");
        }
        for (i, s) in op.strategies.iter().enumerate() {
            let codes: Vec<String> = s.non_retryable.iter().map(u16::to_string).collect();
            println!(
                "    {}. {} {} {} (fall back on {})",
                i + 1,
                s.name,
                s.method,
                s.path,
                codes.join(",")
            );
        }
        if let Some(v) = &op.verify {
            println!("    verify: GET {} {} == {}", v.path, v.select, v.equals);
        }
    }
}
