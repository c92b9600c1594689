//! CLI configuration loading and merging.
//!
//! Configuration precedence (highest first):
//! 1. CLI arguments (handled by clap)
//! 2. Environment variables
//! 3. File given with `--config`
//! 4. Local config file (./.precisrc)
//! 5. Global config file (~/.precis/config.toml)
//! 6. Defaults

use precis_models::factory::{DEFAULT_MODEL_ID, ENV_API_BASE_URL, ENV_API_KEY, ENV_API_MODEL};
use precis_models::{ModelConfig, ModelType};
use precis_orchestrator::OrchestratorConfig;
use precis_orchestrator::summarize::{DEFAULT_SUMMARIZE_BASE_URL, ENV_SUMMARIZE_API_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    pub model: ModelSection,
    pub summarize: SummarizeSection,
    pub orchestrator: OrchestratorSection,
}

/// `[model]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    /// Provider name (universal, mock)
    pub provider: Option<String>,
    pub model_id: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// `[summarize]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeSection {
    pub base_url: Option<String>,
}

/// `[orchestrator]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSection {
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub specific_model: Option<bool>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl PrecisConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".precis").join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".precisrc")
    }

    /// Discover and load configuration files.
    ///
    /// Missing discovered files are skipped; a missing or unreadable
    /// `explicit` file is an error, as is a discovered file that fails to parse.
    pub fn discover_and_load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            match Self::load_from_file(&path) {
                Ok(found) => config.merge(&found),
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if let Some(path) = explicit {
            config.merge(&Self::load_from_file(path)?);
        }

        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        fn take<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }

        take(&mut self.log_level, other.log_level.as_ref());
        take(&mut self.model.provider, other.model.provider.as_ref());
        take(&mut self.model.model_id, other.model.model_id.as_ref());
        take(&mut self.model.base_url, other.model.base_url.as_ref());
        take(&mut self.model.api_key, other.model.api_key.as_ref());
        take(&mut self.summarize.base_url, other.summarize.base_url.as_ref());
        take(&mut self.orchestrator.system_prompt, other.orchestrator.system_prompt.as_ref());
        take(&mut self.orchestrator.max_tokens, other.orchestrator.max_tokens.as_ref());
        take(&mut self.orchestrator.specific_model, other.orchestrator.specific_model.as_ref());
    }

    /// Overlay environment variables as resolved by `lookup`. Empty values are ignored.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(base_url) = non_empty(ENV_API_BASE_URL) {
            self.model.base_url = Some(base_url);
        }
        if let Some(api_key) = non_empty(ENV_API_KEY) {
            self.model.api_key = Some(api_key);
        }
        if let Some(model_id) = non_empty(ENV_API_MODEL) {
            self.model.model_id = Some(model_id);
        }
        if let Some(base_url) = non_empty(ENV_SUMMARIZE_API_BASE_URL) {
            self.summarize.base_url = Some(base_url);
        }
        self
    }

    /// Model configuration for the factory.
    pub fn model_config(&self) -> ConfigResult<ModelConfig> {
        let model_type = match self.model.provider.as_deref() {
            Some(provider) => provider
                .parse::<ModelType>()
                .map_err(|_| ConfigError::InvalidValue(format!("unknown provider '{provider}'")))?,
            None => ModelType::Universal,
        };

        let model_id = self.model.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID);
        let mut config = ModelConfig::new(model_type, model_id.to_string());
        config.api_key.clone_from(&self.model.api_key);
        config.base_url.clone_from(&self.model.base_url);
        Ok(config)
    }

    pub fn summarize_base_url(&self) -> &str {
        self.summarize.base_url.as_deref().unwrap_or(DEFAULT_SUMMARIZE_BASE_URL)
    }

    /// Orchestrator settings with defaults filled in.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::default();
        if let Some(system_prompt) = &self.orchestrator.system_prompt {
            config.system_prompt.clone_from(system_prompt);
        }
        if let Some(max_tokens) = self.orchestrator.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(specific_model) = self.orchestrator.specific_model {
            config.specific_model = specific_model;
        }
        config
    }
}
