//! Caller identity and backend location, passed explicitly into every operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use zeroize::Zeroizing;

/// Secret string that is not `Debug`-printable and is zeroized on drop.
#[derive(Clone)]
pub struct SecretValue(Arc<Zeroizing<String>>);

impl SecretValue {
    pub fn new(s: String) -> Self {
        Self(Arc::new(Zeroizing::new(s)))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid base URL `{url}`: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("base URL must use http or https, got `{0}`")]
    UnsupportedScheme(String),
    #[error("invalid endpoint `{path}`: {message}")]
    InvalidEndpoint { path: String, message: String },
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    base_url: url::Url,
    token: Option<SecretValue>,
    user_id: Option<String>,
    headers: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let parsed = url::Url::parse(base_url).map_err(|e| SessionError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(SessionError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        Ok(Self {
            base_url: parsed,
            token: None,
            user_id: None,
            headers: BTreeMap::new(),
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretValue::new(token.into()));
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Header sent with every request of this session.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Resolve an absolute path against the base URL, keeping any base path prefix.
    pub fn endpoint(&self, path: &str) -> Result<url::Url, SessionError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = format!("{base}/{}", path.trim_start_matches('/'));
        url::Url::parse(&joined).map_err(|e| SessionError::InvalidEndpoint {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Session headers plus `Authorization` when a token is present.
    pub fn request_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.headers.clone();
        if let Some(token) = &self.token {
            headers.insert(
                "Authorization".to_string(),
                format!("Bearer {}", token.expose()),
            );
        }
        headers
    }
}
