use std::sync::Arc;
use std::time::Duration;

use failover_core::types::RetrySpec;
use failover_exec::executor::{
    EventSink, HttpClient, JsonLinesEventSink, LineTarget, MetricsCollector, MetricsEventSink,
    NoOpEventSink, ReqwestHttpClient, TracingEventSink, WebhookEventSink,
};
use failover_exec::retry::Jitter;
use failover_exec::{ExecutorConfig, OperationRunner, SessionContext};

use crate::output::OutputFormat;
use crate::{EventsArgs, OutputArgs, RetryArgs, SessionArgs};

/// Retry flags, applied last so they win over document settings.
pub struct RetryOverrides {
    spec: RetrySpec,
    jitter: Option<Jitter>,
}

impl RetryOverrides {
    pub fn from_args(retry: &RetryArgs) -> Result<Self, String> {
        let jitter = retry.jitter.as_deref().map(str::parse::<Jitter>).transpose()?;
        if retry.max_attempts == Some(0) {
            return Err("--max-attempts must be at least 1".to_string());
        }
        Ok(Self {
            spec: RetrySpec {
                max_attempts_per_strategy: retry.max_attempts,
                base_delay_ms: retry.base_delay,
                max_delay_ms: retry.max_delay,
                non_retryable_statuses: (!retry.non_retryable.is_empty())
                    .then(|| retry.non_retryable.clone()),
                deadline_ms: retry.deadline,
                attempt_timeout_ms: retry.attempt_timeout,
                ..Default::default()
            },
            jitter,
        })
    }

    pub fn apply(&self, config: &ExecutorConfig) -> ExecutorConfig {
        let mut config = config.with_overrides(&self.spec);
        if let Some(jitter) = self.jitter {
            config.retry.jitter = jitter;
        }
        config
    }
}

pub struct RunContext {
    pub runner: OperationRunner,
    pub session: SessionContext,
    pub overrides: RetryOverrides,
    pub metrics: Option<Arc<MetricsCollector>>,
}

pub fn prepare_run(
    operation: &str,
    session: &SessionArgs,
    retry: &RetryArgs,
    events: &EventsArgs,
    output: &OutputArgs,
) -> Option<RunContext> {
    let fail = |message: String| {
        output.error(&message);
    };

    let overrides = match RetryOverrides::from_args(retry) {
        Ok(o) => o,
        Err(e) => {
            fail(e);
            return None;
        }
    };
    let session_ctx = match build_session(session) {
        Ok(s) => s,
        Err(e) => {
            fail(e);
            return None;
        }
    };
    let http: Arc<dyn HttpClient> = match ReqwestHttpClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            fail(e.to_string());
            return None;
        }
    };

    let metrics = events
        .metrics
        .then(|| Arc::new(MetricsCollector::new(operation)));
    let sink = match build_event_sink(events, output, http.clone(), metrics.clone()) {
        Ok(s) => s,
        Err(e) => {
            fail(e);
            return None;
        }
    };

    let runner = OperationRunner::new(http, overrides.apply(&ExecutorConfig::default()))
        .with_event_sink(sink)
        .with_request_timeout(Duration::from_millis(session.timeout))
        .with_max_response_bytes(session.max_response_bytes);

    Some(RunContext {
        runner,
        session: session_ctx,
        overrides,
        metrics,
    })
}

fn build_session(args: &SessionArgs) -> Result<SessionContext, String> {
    let base_url = args
        .base_url
        .as_deref()
        .ok_or("missing base URL (use --base-url or FAILOVER_BASE_URL)")?;
    let mut session = SessionContext::new(base_url).map_err(|e| e.to_string())?;

    if let Some(token) = std::env::var(&args.token_env).ok().filter(|t| !t.is_empty()) {
        session = session.with_bearer_token(token);
    } else {
        tracing::debug!(token_env = %args.token_env, "no bearer token in environment");
    }
    if let Some(user_id) = &args.user_id {
        session = session.with_user_id(user_id.clone());
    }
    for h in &args.headers {
        let (name, value) = h
            .split_once('=')
            .ok_or_else(|| format!("invalid --header `{h}` (expected NAME=VALUE)"))?;
        session = session.with_header(name.trim(), value.trim());
    }
    Ok(session)
}

/// `--format json` reserves stdout for the single result document.
fn event_line_target(output: &OutputArgs) -> LineTarget {
    match output.format {
        OutputFormat::Json => LineTarget::Stderr,
        OutputFormat::Text => LineTarget::Stdout,
    }
}

fn build_event_sink(
    events: &EventsArgs,
    output: &OutputArgs,
    http: Arc<dyn HttpClient>,
    metrics: Option<Arc<MetricsCollector>>,
) -> Result<Arc<dyn EventSink>, String> {
    let mut sink: Arc<dyn EventSink> = match events.events.as_str() {
        "none" => Arc::new(NoOpEventSink),
        "stdout" => Arc::new(JsonLinesEventSink::new(event_line_target(output))),
        "tracing" => Arc::new(TracingEventSink),
        other => return Err(format!("unknown event sink: {other}")),
    };

    if let Some(raw) = &events.webhook_url {
        let url = url::Url::parse(raw).map_err(|e| format!("invalid webhook URL `{raw}`: {e}"))?;
        sink = Arc::new(WebhookEventSink::new(url, http, sink));
    }
    if let Some(collector) = metrics {
        sink = Arc::new(MetricsEventSink::new(collector, sink));
    }
    Ok(sink)
}
