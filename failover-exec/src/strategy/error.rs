use std::time::Duration;

use crate::executor::http::HttpError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error("HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

impl StrategyError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(self, delay: Option<Duration>) -> Self {
        match self {
            Self::Status { status, message, .. } => Self::Status {
                status,
                message,
                retry_after: delay,
            },
            other => other,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<HttpError> for StrategyError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Timeout => StrategyError::Timeout("request timed out".to_string()),
            HttpError::Network(msg) => StrategyError::Network(msg),
            other => StrategyError::Other(other.to_string()),
        }
    }
}
