//! Configuration loading, validation, and management for RustedTutor.
//!
//! Loads configuration from `~/.rustedtutor/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.rustedtutor/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Model call timeout and retry policy
    #[serde(default)]
    pub model_call: ModelCallConfig,

    /// Tutoring behaviour (history windows, thresholds, limits)
    #[serde(default)]
    pub tutor: TutorConfig,

    /// Retrieval backend and per-operation top_k
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("model_call", &self.model_call)
            .field("tutor", &self.tutor)
            .field("retrieval", &self.retrieval)
            .field("gateway", &self.gateway)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .field("api_version", &self.api_version)
            .field("deployment", &self.deployment)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCallConfig {
    /// Per-attempt timeout
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,

    /// Retries of transient failures (0 or 1)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_model_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    1
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for ModelCallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_model_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Exchanges kept per user (turns kept = 2 × max_history)
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// History turns sent on the general-knowledge path
    #[serde(default = "default_general_history_turns")]
    pub general_history_turns: usize,

    /// History turns sent on the retrieval and fallback paths
    #[serde(default = "default_grounded_history_turns")]
    pub grounded_history_turns: usize,

    /// Top-chunk similarity below which the answer blends in general knowledge
    #[serde(default = "default_blend_threshold")]
    pub blend_threshold: f32,

    #[serde(default = "default_source_preview_chars")]
    pub source_preview_chars: usize,

    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    #[serde(default = "default_socratic_temperature")]
    pub socratic_temperature: f32,

    /// Let explicit material references ("according to", "in my notes")
    /// override the general-conversation route.
    #[serde(default)]
    pub explicit_reference_forces_retrieval: bool,

    #[serde(default = "default_max_quiz_questions")]
    pub max_quiz_questions: usize,

    #[serde(default = "default_max_flashcards")]
    pub max_flashcards: usize,
}

fn default_max_history() -> usize {
    10
}
fn default_general_history_turns() -> usize {
    6
}
fn default_grounded_history_turns() -> usize {
    4
}
fn default_blend_threshold() -> f32 {
    0.3
}
fn default_source_preview_chars() -> usize {
    200
}
fn default_max_sources() -> usize {
    3
}
fn default_socratic_temperature() -> f32 {
    0.8
}
fn default_max_quiz_questions() -> usize {
    25
}
fn default_max_flashcards() -> usize {
    50
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
            general_history_turns: default_general_history_turns(),
            grounded_history_turns: default_grounded_history_turns(),
            blend_threshold: default_blend_threshold(),
            source_preview_chars: default_source_preview_chars(),
            max_sources: default_max_sources(),
            socratic_temperature: default_socratic_temperature(),
            explicit_reference_forces_retrieval: false,
            max_quiz_questions: default_max_quiz_questions(),
            max_flashcards: default_max_flashcards(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// "http" or "none"
    #[serde(default = "default_retrieval_backend")]
    pub backend: String,

    #[serde(default = "default_retrieval_url")]
    pub url: String,

    #[serde(default = "default_retrieval_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_answer_top_k")]
    pub answer_top_k: usize,

    #[serde(default = "default_quiz_top_k")]
    pub quiz_top_k: usize,

    #[serde(default = "default_flashcard_top_k")]
    pub flashcard_top_k: usize,

    #[serde(default = "default_socratic_top_k")]
    pub socratic_top_k: usize,
}

fn default_retrieval_backend() -> String {
    "http".into()
}
fn default_retrieval_url() -> String {
    "http://localhost:5001".into()
}
fn default_retrieval_timeout() -> u64 {
    30
}
fn default_answer_top_k() -> usize {
    5
}
fn default_quiz_top_k() -> usize {
    10
}
fn default_flashcard_top_k() -> usize {
    15
}
fn default_socratic_top_k() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: default_retrieval_backend(),
            url: default_retrieval_url(),
            timeout_secs: default_retrieval_timeout(),
            answer_top_k: default_answer_top_k(),
            quiz_top_k: default_quiz_top_k(),
            flashcard_top_k: default_flashcard_top_k(),
            socratic_top_k: default_socratic_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins; empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Azure OpenAI `api-version` query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Azure OpenAI deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
}

impl ProviderConfig {
    /// Whether this entry describes an Azure OpenAI deployment.
    pub fn is_azure(&self) -> bool {
        self.deployment.is_some() || self.api_version.is_some()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.rustedtutor/config.toml).
    ///
    /// Also checks environment variables:
    /// - `RUSTEDTUTOR_API_KEY` / `OPENAI_API_KEY`
    /// - `RUSTEDTUTOR_PROVIDER`, `RUSTEDTUTOR_MODEL`, `RUSTEDTUTOR_RETRIEVAL_URL`
    /// - `AZURE_OPENAI_API_BASE`, `AZURE_OPENAI_API_KEY`,
    ///   `AZURE_OPENAI_API_VERSION`, `AZURE_OPENAI_API_NAME`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("RUSTEDTUTOR_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("RUSTEDTUTOR_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("RUSTEDTUTOR_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = lookup("RUSTEDTUTOR_RETRIEVAL_URL") {
            self.retrieval.url = url;
        }

        // An Azure OpenAI deployment in the environment becomes the default provider.
        if let Some(endpoint) = lookup("AZURE_OPENAI_API_BASE") {
            let entry = self.providers.entry("azure".into()).or_default();
            entry.api_url = Some(endpoint);
            if let Some(key) = lookup("AZURE_OPENAI_API_KEY") {
                entry.api_key = Some(key);
            }
            if let Some(version) = lookup("AZURE_OPENAI_API_VERSION") {
                entry.api_version = Some(version);
            }
            if let Some(deployment) = lookup("AZURE_OPENAI_API_NAME") {
                entry.deployment = Some(deployment);
            }
            self.default_provider = "azure".into();
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rustedtutor")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.tutor.socratic_temperature < 0.0 || self.tutor.socratic_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "tutor.socratic_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.tutor.blend_threshold) {
            return Err(ConfigError::ValidationError(
                "tutor.blend_threshold must be between 0.0 and 1.0".into(),
            ));
        }

        if self.tutor.max_history == 0 {
            return Err(ConfigError::ValidationError(
                "tutor.max_history must be at least 1".into(),
            ));
        }

        if self.model_call.max_retries > 1 {
            return Err(ConfigError::ValidationError(
                "model_call.max_retries must be 0 or 1".into(),
            ));
        }

        if self.model_call.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "model_call.timeout_secs must be > 0".into(),
            ));
        }

        let r = &self.retrieval;
        if [r.answer_top_k, r.quiz_top_k, r.flashcard_top_k, r.socratic_top_k].contains(&0) {
            return Err(ConfigError::ValidationError(
                "retrieval top_k values must be > 0".into(),
            ));
        }

        if !matches!(r.backend.as_str(), "http" | "none") {
            return Err(ConfigError::ValidationError(format!(
                "unknown retrieval.backend '{}' (expected 'http' or 'none')",
                r.backend
            )));
        }

        Ok(())
    }

    /// Check if an API key is available for the default provider.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            model_call: ModelCallConfig::default(),
            tutor: TutorConfig::default(),
            retrieval: RetrievalConfig::default(),
            gateway: GatewayConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
