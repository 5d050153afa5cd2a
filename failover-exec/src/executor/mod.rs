mod config;
pub mod events;
pub mod http;
pub mod metrics;
mod result;
mod runner;
pub mod webhook;

pub use config::ExecutorConfig;
pub use events::{
    CompositeEventSink, Event, EventSink, JsonLinesEventSink, LineTarget, NoOpEventSink,
    TracingEventSink,
};
pub use http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient};
pub use metrics::{MetricsCollector, MetricsEventSink, OperationMetrics};
pub use result::{AttemptOutcome, ExecutionAttempt, ExecutionError, ExecutionResult};
pub use runner::ResilientExecutor;
pub(crate) use runner::Scope;
pub use webhook::WebhookEventSink;
