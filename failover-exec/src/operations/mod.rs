pub mod assignments;
mod verify;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use failover_core::types::{HttpMethod, OperationSpec};
use serde_json::Value;

use crate::compile::{CompileError, CompiledOperation, CompiledStrategy, Compiler};
use crate::executor::{
    EventSink, ExecutionResult, ExecutorConfig, HttpClient, HttpRequestParts, NoOpEventSink,
    ResilientExecutor, Scope,
};
use crate::session::{SessionContext, SessionError};
use crate::strategy::{HttpStrategy, Strategy};

pub use verify::{check_verification, VerificationError};

/// Template variable that carries the session's user id when one is set.
pub const SESSION_USER_VAR: &str = "sessionUserId";

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to encode request body for strategy `{strategy}`: {message}")]
    Body { strategy: String, message: String },
}

/// Compiles an operation, runs it over HTTP, and confirms the effect if asked to.
pub struct OperationRunner {
    http: Arc<dyn HttpClient>,
    compiler: Compiler,
    events: Arc<dyn EventSink>,
    request_timeout: Duration,
    max_response_bytes: usize,
}

impl OperationRunner {
    pub fn new(http: Arc<dyn HttpClient>, defaults: ExecutorConfig) -> Self {
        Self {
            http,
            compiler: Compiler::new(defaults),
            events: Arc::new(NoOpEventSink),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_response_bytes(mut self, max: usize) -> Self {
        self.max_response_bytes = max;
        self
    }

    pub fn compile(
        &self,
        session: &SessionContext,
        op: &OperationSpec,
        vars: &BTreeMap<String, Value>,
    ) -> Result<CompiledOperation, CompileError> {
        let mut vars = vars.clone();
        if let Some(user_id) = session.user_id() {
            vars.entry(SESSION_USER_VAR.to_string())
                .or_insert_with(|| Value::String(user_id.to_string()));
        }
        self.compiler.compile(op, &vars)
    }

    pub async fn run(
        &self,
        session: &SessionContext,
        op: &OperationSpec,
        vars: &BTreeMap<String, Value>,
    ) -> Result<ExecutionResult<Value>, RunError> {
        let compiled = self.compile(session, op, vars)?;
        self.run_compiled(session, &compiled).await
    }

    pub async fn run_compiled(
        &self,
        session: &SessionContext,
        compiled: &CompiledOperation,
    ) -> Result<ExecutionResult<Value>, RunError> {
        let strategies = compiled
            .strategies
            .iter()
            .map(|s| self.http_strategy(session, s))
            .collect::<Result<Vec<_>, _>>()?;

        let executor = ResilientExecutor::new(compiled.config.clone())
            .with_event_sink(self.events.clone());

        let Some(verify) = &compiled.verify else {
            return Ok(executor.execute(&compiled.operation_id, strategies).await);
        };

        // Success is only announced once the effect has been read back.
        let scope = Scope {
            parent: None,
            defer_success: true,
        };
        let result = executor
            .execute_scoped(&compiled.operation_id, strategies, scope)
            .await;
        if !result.success() {
            return Ok(result);
        }

        let outcome = match session.endpoint(&verify.path) {
            Ok(url) => {
                let request = HttpRequestParts {
                    method: HttpMethod::Get,
                    url,
                    headers: session.request_headers(),
                    body: Vec::new(),
                };
                let check = Strategy::new(
                    "verify",
                    HttpStrategy::new(
                        self.http.clone(),
                        request,
                        self.request_timeout,
                        self.max_response_bytes,
                    ),
                );
                let scope = Scope {
                    parent: Some(result.invocation_id),
                    defer_success: false,
                };
                let verify_op = format!("{}.verify", compiled.operation_id);
                match executor.execute_scoped(&verify_op, vec![check], scope).await.into_result() {
                    Ok(body) => check_verification(&body, &verify.select, &verify.equals),
                    Err(e) => Err(VerificationError::Unreachable(e.to_string())),
                }
            }
            Err(e) => Err(VerificationError::Unreachable(e.to_string())),
        };

        let result = match outcome {
            Ok(()) => result,
            Err(e) => result.fail_verification(e.to_string()),
        };
        executor.report_outcome(&result).await;
        Ok(result)
    }

    fn http_strategy(
        &self,
        session: &SessionContext,
        s: &CompiledStrategy,
    ) -> Result<Strategy<Value>, RunError> {
        let mut headers = session.request_headers();
        headers.extend(s.headers.clone());

        let body = match &s.body {
            Some(b) => {
                headers
                    .entry("Content-Type".to_string())
                    .or_insert_with(|| "application/json".to_string());
                serde_json::to_vec(b).map_err(|e| RunError::Body {
                    strategy: s.name.clone(),
                    message: e.to_string(),
                })?
            }
            None => Vec::new(),
        };

        let request = HttpRequestParts {
            method: s.method,
            url: session.endpoint(&s.path)?,
            headers,
            body,
        };
        let strategy = Strategy::new(
            s.name.clone(),
            HttpStrategy::new(
                self.http.clone(),
                request,
                self.request_timeout,
                self.max_response_bytes,
            ),
        );
        Ok(match &s.classifier {
            Some(c) => strategy.with_classifier(c.clone()),
            None => strategy,
        })
    }
}
