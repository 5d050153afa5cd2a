use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use failover_core::types::HttpMethod;

use crate::executor::http::{HttpClient, HttpRequestParts};
use crate::executor::{Event, EventSink};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ACK_BYTES: usize = 64 * 1024;

/// Posts terminal operation events to a webhook. Delivery is best effort and
/// bounded by a 5s timeout; failures are logged, never propagated.
pub struct WebhookEventSink {
    url: url::Url,
    http: Arc<dyn HttpClient>,
    base: Arc<dyn EventSink>,
}

impl WebhookEventSink {
    pub fn new(url: url::Url, http: Arc<dyn HttpClient>, base: Arc<dyn EventSink>) -> Self {
        Self { url, http, base }
    }
}

#[async_trait]
impl EventSink for WebhookEventSink {
    async fn emit(&self, event: Event) {
        let terminal = matches!(
            event,
            Event::OperationSucceeded { .. } | Event::OperationFailed { .. }
        );
        let payload = terminal.then(|| event.to_json());
        self.base.emit(event).await;

        let Some(payload) = payload else {
            return;
        };
        let req = HttpRequestParts {
            method: HttpMethod::Post,
            url: self.url.clone(),
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
            body: serde_json::to_vec(&payload).unwrap_or_default(),
        };

        // Delivered before returning: callers may exit right after the last event.
        let sent = tokio::time::timeout(
            WEBHOOK_TIMEOUT,
            self.http.send(req, WEBHOOK_TIMEOUT, MAX_ACK_BYTES),
        )
        .await;
        match sent {
            Ok(Ok(resp)) if resp.is_success() => {}
            Ok(Ok(resp)) => tracing::warn!(status = resp.status, "webhook rejected event"),
            Ok(Err(e)) => tracing::warn!(error = %e, "webhook delivery failed"),
            Err(_) => tracing::warn!("webhook delivery timed out"),
        }
    }
}
