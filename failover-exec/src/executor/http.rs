use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use failover_core::types::HttpMethod;

/// One fully rendered call against the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequestParts {
    pub method: HttpMethod,
    pub url: url::Url,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseParts {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponseParts {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport failures. Non-2xx statuses are responses, not errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("timeout")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("response too large (>{max_bytes} bytes)")]
    ResponseTooLarge { max_bytes: usize },
    #[error("http error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_connect() || e.is_request() {
            HttpError::Network(e.to_string())
        } else {
            HttpError::Other(e.to_string())
        }
    }
}

/// Seam between strategies and the network; tests script it.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(
        &self,
        req: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError>;
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Redirects stay disabled: a redirected DELETE or PATCH must not silently
    /// change shape into a GET.
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("failover-exec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HttpError::Other(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

async fn read_capped(resp: reqwest::Response, cap: usize) -> Result<Vec<u8>, HttpError> {
    let too_large = HttpError::ResponseTooLarge { max_bytes: cap };
    if resp.content_length().is_some_and(|len| len > cap as u64) {
        return Err(too_large);
    }
    let body = resp.bytes().await?;
    if body.len() > cap {
        return Err(too_large);
    }
    Ok(body.to_vec())
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        tracing::debug!(method = %req.method, url = %req.url, "sending request");

        let mut builder = self
            .client
            .request(reqwest_method(req.method), req.url)
            .timeout(timeout);
        for (name, value) in req.headers {
            builder = builder.header(name, value);
        }
        if !req.body.is_empty() {
            builder = builder.body(req.body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let body = read_capped(resp, max_response_bytes).await?;

        Ok(HttpResponseParts {
            status,
            headers,
            body,
        })
    }
}
