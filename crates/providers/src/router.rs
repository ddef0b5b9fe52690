//! Provider router — selects the correct LLM provider based on config.
//!
//! Handles provider creation and wraps every provider handed to the
//! tutoring layer in a [`ResilientProvider`].

use rustedtutor_config::{AppConfig, ProviderConfig};
use rustedtutor_core::error::ProviderError;
use rustedtutor_core::provider::Provider;
use std::collections::HashMap;
use std::sync::Arc;

use crate::openai_compat::{OPENAI_BASE_URL, OpenAiCompatProvider};
use crate::resilient::ResilientProvider;

/// Routes LLM requests to the correct provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }
}

/// Build providers from configuration.
pub fn build_from_config(config: &AppConfig) -> ProviderRouter {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let provider = build_provider(name, provider_config, config);
        router.register(name.clone(), wrap(provider, config));
    }

    // Ensure the default provider exists (even if not explicitly configured)
    if router.get(&config.default_provider).is_none() {
        let provider = build_provider(
            &config.default_provider,
            &ProviderConfig::default(),
            config,
        );
        router.register(config.default_provider.clone(), wrap(provider, config));
    }

    router
}

/// The configured default provider, ready for the tutoring layer.
pub fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    build_from_config(config).default().ok_or_else(|| {
        ProviderError::NotConfigured(format!(
            "default provider '{}' is not registered",
            config.default_provider
        ))
    })
}

fn build_provider(
    name: &str,
    provider_config: &ProviderConfig,
    config: &AppConfig,
) -> Arc<dyn Provider> {
    let api_key = provider_config
        .api_key
        .clone()
        .or_else(|| config.api_key.clone())
        .unwrap_or_default();

    let base_url = provider_config
        .api_url
        .clone()
        .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

    if provider_config.is_azure() || name == "azure" {
        let deployment = provider_config
            .deployment
            .clone()
            .unwrap_or_else(|| config.default_model.clone());
        let api_version = provider_config
            .api_version
            .clone()
            .unwrap_or_else(|| "2024-06-01".into());
        Arc::new(OpenAiCompatProvider::azure(
            base_url,
            deployment,
            api_version,
            api_key,
        ))
    } else {
        Arc::new(OpenAiCompatProvider::new(name, base_url, api_key))
    }
}

fn wrap(provider: Arc<dyn Provider>, config: &AppConfig) -> Arc<dyn Provider> {
    Arc::new(ResilientProvider::from_config(provider, &config.model_call))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_register_and_lookup() {
        let mut router = ProviderRouter::new("openai");
        let provider = Arc::new(OpenAiCompatProvider::openai("sk-test"));
        router.register("openai", provider);

        assert!(router.get("openai").is_some());
        assert!(router.get("nonexistent").is_none());
        assert!(router.default().is_some());
    }

    #[test]
    fn named_compatible_endpoint_uses_its_api_url() {
        let mut config = AppConfig::default();
        config.default_provider = "campus".into();
        config.providers.insert(
            "campus".into(),
            ProviderConfig {
                api_key: Some("k".into()),
                api_url: Some("https://llm.campus.edu/v1".into()),
                ..ProviderConfig::default()
            },
        );

        let provider = default_provider(&config).unwrap();
        assert_eq!(provider.name(), "campus");
    }

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config);
        let provider = router.default().unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn azure_entry_builds_azure_provider() {
        let mut config = AppConfig::default();
        config.default_provider = "azure".into();
        config.providers.insert(
            "azure".into(),
            ProviderConfig {
                api_key: Some("k".into()),
                api_url: Some("https://acme.openai.azure.com".into()),
                deployment: Some("tutor".into()),
                api_version: Some("2024-06-01".into()),
                ..ProviderConfig::default()
            },
        );

        let provider = default_provider(&config).unwrap();
        assert_eq!(provider.name(), "azure");
    }
}
