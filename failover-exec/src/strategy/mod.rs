mod error;
mod http;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::retry::RetryClassifier;

pub use error::StrategyError;
pub use http::{parse_body, HttpStrategy};

/// A zero-argument remote call that achieves an operation's effect.
///
/// Implementations must be idempotent: the executor may call them several times,
/// and a call can take effect server-side without the client seeing success.
#[async_trait]
pub trait Invoke<T>: Send + Sync {
    async fn invoke(&self) -> Result<T, StrategyError>;
}

pub struct Strategy<T> {
    name: String,
    invoker: Arc<dyn Invoke<T>>,
    classifier: Option<RetryClassifier>,
}

impl<T> Clone for Strategy<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            invoker: self.invoker.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Strategy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Strategy<T> {
    pub fn new(name: impl Into<String>, invoker: impl Invoke<T> + 'static) -> Self {
        Self {
            name: name.into(),
            invoker: Arc::new(invoker),
            classifier: None,
        }
    }

    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, StrategyError>> + Send + 'static,
    {
        Self::new(name, FnInvoker(f))
    }

    /// Override the executor-wide classification for this strategy only.
    pub fn with_classifier(mut self, classifier: RetryClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classifier(&self) -> Option<&RetryClassifier> {
        self.classifier.as_ref()
    }

    pub async fn invoke(&self) -> Result<T, StrategyError> {
        self.invoker.invoke().await
    }
}

struct FnInvoker<F>(F);

#[async_trait]
impl<T, F, Fut> Invoke<T> for FnInvoker<F>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, StrategyError>> + Send,
{
    async fn invoke(&self) -> Result<T, StrategyError> {
        (self.0)().await
    }
}
