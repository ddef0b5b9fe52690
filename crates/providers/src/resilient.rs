//! Resilient provider — bounded timeout with a single retry.
//!
//! Wraps one provider. Each attempt runs under `tokio::time::timeout`;
//! transient failures (network, timeout, rate limit, 5xx) are retried at
//! most `max_retries` times (0 or 1). Anything else fails immediately.

use async_trait::async_trait;
use rustedtutor_core::error::ProviderError;
use rustedtutor_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// A provider that bounds each call and retries transient failures once.
pub struct ResilientProvider {
    inner: Arc<dyn Provider>,
    timeout: Duration,
    max_retries: u32,
    backoff: Duration,
}

impl ResilientProvider {
    /// Wrap `inner` with the default policy (60s timeout, one retry).
    pub fn new(inner: Arc<dyn Provider>) -> Self {
        Self {
            inner,
            timeout: Duration::from_secs(60),
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }

    /// Build from the `[model_call]` config section.
    pub fn from_config(
        inner: Arc<dyn Provider>,
        config: &rustedtutor_config::ModelCallConfig,
    ) -> Self {
        Self::new(inner)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_max_retries(config.max_retries)
            .with_backoff(Duration::from_millis(config.retry_backoff_ms))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Clamped to at most one retry.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn attempt(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "Provider '{}' timed out after {}s",
                self.inner.name(),
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl Provider for ResilientProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let attempts = self.max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.attempt(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < attempts => {
                    warn!(
                        provider = %self.inner.name(),
                        attempt,
                        error = %e,
                        "Transient provider failure, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    info!(
                        provider = %self.inner.name(),
                        attempt,
                        error = %e,
                        "Provider call failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        self.inner.health_check().await
    }
}
