//! Model factory for creating model instances from configuration.
//!
//! Configuration is explicit: a `ModelConfig` is built by the caller (from a
//! config file, flags and environment) and handed to `ModelFactory::create`.
//! Nothing here reads process-wide state.

use crate::universal::DEFAULT_BASE_URL;
use crate::{ScriptedModel, UniversalModel};
use precis_abstraction::{ModelError, StreamEvent, StreamingModel};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Model identifier used when none is configured.
pub const DEFAULT_MODEL_ID: &str = "gpt-4-turbo";

/// Environment variable overriding the model endpoint.
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
/// Environment variable carrying the model credential.
pub const ENV_API_KEY: &str = "API_KEY";
/// Environment variable selecting the model identifier.
pub const ENV_API_MODEL: &str = "API_MODEL";

/// Model type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Universal OpenAI-compatible model.
    Universal,
    /// Scripted offline model echoing a fixed answer.
    Mock,
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "universal" | "openai" | "openai-compatible" | "local" => Ok(Self::Universal),
            "mock" | "scripted" => Ok(Self::Mock),
            other => Err(ModelError::UnsupportedModelProvider(other.to_string())),
        }
    }
}

/// Model configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// The type of model to create.
    pub model_type: ModelType,
    /// The model ID (e.g., "gpt-4-turbo").
    pub model_id: String,
    /// Optional API key; requests are sent unauthenticated without one.
    pub api_key: Option<String>,
    /// Optional endpoint override; defaults to the OpenAI API.
    pub base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(ModelType::Universal, DEFAULT_MODEL_ID.to_string())
    }
}

impl ModelConfig {
    /// Creates a new `ModelConfig` with the given type and model ID.
    #[must_use]
    pub fn new(model_type: ModelType, model_id: String) -> Self {
        Self { model_type, model_id, api_key: None, base_url: None }
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the base URL for this configuration.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Endpoint requests go to.
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

/// Factory for creating model instances.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a model instance from the given configuration.
    ///
    /// # Errors
    /// Returns a `ModelError` if the configuration cannot produce a model.
    pub fn create(config: ModelConfig) -> Result<Arc<dyn StreamingModel>, ModelError> {
        debug!(
            model_type = ?config.model_type,
            model_id = %config.model_id,
            base_url = %config.effective_base_url(),
            "Creating model instance"
        );

        match config.model_type {
            ModelType::Universal => {
                let base_url = config.effective_base_url().to_string();
                let model = match config.api_key {
                    Some(api_key) => UniversalModel::with_api_key(config.model_id, base_url, api_key),
                    None => UniversalModel::without_auth(config.model_id, base_url),
                };
                Ok(Arc::new(model))
            }
            ModelType::Mock => {
                let model = ScriptedModel::new(
                    config.model_id,
                    vec![StreamEvent::TextDelta("Mock answer from the offline model.".to_string())],
                );
                Ok(Arc::new(model))
            }
        }
    }
}
