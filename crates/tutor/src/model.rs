//! Thin handle on the chat model used by every tutoring operation.

use std::sync::Arc;

use rustedtutor_config::AppConfig;
use rustedtutor_core::error::ProviderError;
use rustedtutor_core::message::Message;
use rustedtutor_core::provider::{Provider, ProviderRequest};
use tracing::debug;

/// Provider plus the model parameters requests are built with.
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ModelClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Model name and sampling defaults from the root config section.
    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self::new(provider, config.default_model.clone())
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Send one chat request at the default temperature and return the text.
    pub async fn generate(&self, messages: Vec<Message>) -> Result<String, ProviderError> {
        self.generate_at(messages, self.temperature).await
    }

    /// Send one chat request at an explicit temperature.
    pub async fn generate_at(
        &self,
        messages: Vec<Message>,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let mut request =
            ProviderRequest::new(self.model.clone(), messages).with_temperature(temperature);
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            temperature,
            "Calling model"
        );

        let response = self.provider.complete(request).await?;
        let text = response.message.content.trim().to_string();
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}
