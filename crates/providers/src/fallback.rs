//! Provider fallback: ordered retry chain with per-provider timeouts.
//!
//! When a provider fails (timeout, rate limit, error), the next provider in
//! the chain is tried. If every entry fails, the last real failure is
//! returned; an entry that does not support the operation only supplies the
//! error when nothing else failed.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use studyplan_core::{
    ContentProvider, EvaluationRequest, EvaluationResult, ExercisePayload, GenerationRequest,
    ProviderError,
};
use tracing::{debug, info, warn};

/// A provider that wraps an ordered list of providers and falls back on failure.
pub struct FallbackContentProvider {
    name: String,
    chain: Vec<FallbackEntry>,
}

/// A single entry in the fallback chain.
struct FallbackEntry {
    provider: Arc<dyn ContentProvider>,
    timeout: Duration,
}

impl FallbackContentProvider {
    /// Create a new fallback provider with no entries.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chain: Vec::new(),
        }
    }

    /// Add a provider to the fallback chain with a custom timeout.
    pub fn add(mut self, provider: Arc<dyn ContentProvider>, timeout: Duration) -> Self {
        self.chain.push(FallbackEntry { provider, timeout });
        self
    }

    /// Add a provider with the default timeout (120s).
    pub fn add_default(self, provider: Arc<dyn ContentProvider>) -> Self {
        self.add(provider, Duration::from_secs(120))
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Run `call` against each entry in order until one succeeds.
    async fn first_success<'a, T, F, Fut>(&'a self, operation: &str, call: F) -> Result<T, ProviderError>
    where
        F: Fn(&'a Arc<dyn ContentProvider>) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut last_error = ProviderError::NotConfigured("No providers in fallback chain".into());
        let mut saw_failure = false;

        for (i, entry) in self.chain.iter().enumerate() {
            let provider_name = entry.provider.name();

            debug!(
                provider = %provider_name,
                attempt = i + 1,
                total = self.chain.len(),
                operation,
                "Fallback: trying provider"
            );

            match tokio::time::timeout(entry.timeout, call(&entry.provider)).await {
                Ok(Ok(value)) => {
                    if i > 0 {
                        info!(provider = %provider_name, operation, "Fallback: served by backup provider");
                    }
                    return Ok(value);
                }
                // Expected for the local generator, which cannot grade
                Ok(Err(e @ ProviderError::Unsupported { .. })) => {
                    debug!(provider = %provider_name, error = %e, operation, "Fallback: unsupported, trying next");
                    if !saw_failure {
                        last_error = e;
                    }
                }
                Ok(Err(e)) => {
                    warn!(
                        provider = %provider_name,
                        error = %e,
                        operation,
                        "Fallback: provider failed, trying next"
                    );
                    saw_failure = true;
                    last_error = e;
                }
                Err(_) => {
                    warn!(
                        provider = %provider_name,
                        timeout_secs = entry.timeout.as_secs(),
                        operation,
                        "Fallback: provider timed out, trying next"
                    );
                    saw_failure = true;
                    last_error = ProviderError::Timeout(format!(
                        "Provider '{}' timed out after {}s",
                        provider_name,
                        entry.timeout.as_secs()
                    ));
                }
            }
        }

        Err(last_error)
    }
}

#[async_trait]
impl ContentProvider for FallbackContentProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ExercisePayload, ProviderError> {
        self.first_success("generate", |provider| provider.generate(request.clone()))
            .await
    }

    async fn evaluate(&self, request: EvaluationRequest) -> Result<EvaluationResult, ProviderError> {
        self.first_success("evaluate", |provider| provider.evaluate(request.clone()))
            .await
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        for entry in &self.chain {
            if let Ok(true) = entry.provider.health_check().await {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
