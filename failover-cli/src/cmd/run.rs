use std::path::Path;
use std::sync::Arc;

use failover_exec::executor::{ExecutionAttempt, MetricsCollector};
use failover_exec::{ExecutionResult, RunError};
use serde::Serialize;
use serde_json::Value;

use crate::exit_codes;
use crate::utils::{load_document, load_vars};
use crate::{EventsArgs, OutputArgs, RetryArgs, SessionArgs, VarsArgs};

use super::config::prepare_run;

#[derive(Serialize)]
struct RunResult {
    invocation_id: String,
    operation: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    attempts: Vec<ExecutionAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<Value>,
}

pub async fn run_cmd(
    path: &Path,
    operation: &str,
    vars: VarsArgs,
    output: OutputArgs,
    session: SessionArgs,
    retry: RetryArgs,
    events: EventsArgs,
) -> i32 {
    let parsed = match load_document(path, &output) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let Some(op) = parsed.document.operation(operation) else {
        output.error(&format!("operation `{operation}` not found in {}", path.display()));
        return exit_codes::VALIDATION_FAILED;
    };
    let Some(vars) = load_vars(&vars, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };
    let Some(ctx) = prepare_run(operation, &session, &retry, &events, &output) else {
        return exit_codes::RUNTIME_ERROR;
    };

    let mut compiled = match ctx.runner.compile(&ctx.session, op, &vars) {
        Ok(c) => c,
        Err(e) => return report(Err(e.into()), None, &output).await,
    };
    compiled.config = ctx.overrides.apply(&compiled.config);
    tracing::debug!(
        operation,
        strategies = compiled.strategies.len(),
        "running operation"
    );

    let result = ctx.runner.run_compiled(&ctx.session, &compiled).await;
    report(result, ctx.metrics, &output).await
}

/// Print the terminal result and map it to an exit code.
pub async fn report(
    result: Result<ExecutionResult<Value>, RunError>,
    metrics: Option<Arc<MetricsCollector>>,
    output: &OutputArgs,
) -> i32 {
    let result = match result {
        Ok(r) => r,
        Err(e @ RunError::Compile(_)) => {
            output.error(&e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
        Err(e) => {
            output.error(&e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };

    let metrics = match metrics {
        Some(m) => Some(m.get_metrics().await.to_json()),
        None => None,
    };
    let code = match result.error() {
        None => exit_codes::SUCCESS,
        Some(e) if e.is_configuration() => exit_codes::VALIDATION_FAILED,
        Some(_) => exit_codes::OPERATION_FAILED,
    };

    let res = RunResult {
        invocation_id: result.invocation_id.to_string(),
        operation: result.operation.clone(),
        status: if result.success() { "succeeded" } else { "failed" },
        strategy: result.strategy().map(String::from),
        data: result.data().cloned(),
        error: result.error_message(),
        error_kind: result.error().map(|e| e.kind()),
        attempts: result.attempts.clone(),
        metrics,
    };

    if output.wants_text() {
        print_text(&res);
    } else {
        output.result(&res);
    }
    code
}

fn print_text(res: &RunResult) {
    match (&res.strategy, &res.error) {
        (Some(strategy), _) => println!(
            "ok: {} succeeded via `{strategy}` ({} attempt(s))",
            res.operation,
            res.attempts.len()
        ),
        (None, Some(error)) => eprintln!("error: {error}"),
        (None, None) => {}
    }
    for a in &res.attempts {
        if let failover_exec::executor::AttemptOutcome::Failed { error, .. } = &a.outcome {
            eprintln!("  - {} #{}: {error}", a.strategy, a.attempt_no);
        }
    }
    if let Some(data) = res.data.as_ref().filter(|d| !d.is_null()) {
        if let Ok(json) = serde_json::to_string_pretty(data) {
            println!("{json}");
        }
    }
    if let Some(metrics) = &res.metrics {
        if let Ok(json) = serde_json::to_string_pretty(metrics) {
            println!("{json}");
        }
    }
}
