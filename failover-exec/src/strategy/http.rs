use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde_json::Value;

use crate::executor::http::{HttpClient, HttpRequestParts};
use crate::retry::parse_retry_after;
use crate::strategy::{Invoke, StrategyError};

const ERROR_SNIPPET_BYTES: usize = 256;

/// One fully rendered HTTP call. 2xx is success; anything else is a status failure.
pub struct HttpStrategy {
    client: Arc<dyn HttpClient>,
    request: HttpRequestParts,
    timeout: Duration,
    max_response_bytes: usize,
}

impl HttpStrategy {
    pub fn new(
        client: Arc<dyn HttpClient>,
        request: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Self {
        Self {
            client,
            request,
            timeout,
            max_response_bytes,
        }
    }

    pub fn request(&self) -> &HttpRequestParts {
        &self.request
    }
}

#[async_trait]
impl Invoke<Value> for HttpStrategy {
    async fn invoke(&self) -> Result<Value, StrategyError> {
        let resp = self
            .client
            .send(self.request.clone(), self.timeout, self.max_response_bytes)
            .await?;

        if resp.is_success() {
            return Ok(parse_body(&resp.body));
        }

        let end = resp.body.len().min(ERROR_SNIPPET_BYTES);
        let snippet = String::from_utf8_lossy(&resp.body[..end]).trim().to_string();
        let message = if snippet.is_empty() {
            format!("{} {}", self.request.method, self.request.url.path())
        } else {
            format!("{} {}: {snippet}", self.request.method, self.request.url.path())
        };
        Err(StrategyError::http(resp.status, message)
            .with_retry_after(parse_retry_after(&resp.headers, SystemTime::now())))
    }
}

/// Empty bodies become `null`; bodies that are not JSON become a string.
pub fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
