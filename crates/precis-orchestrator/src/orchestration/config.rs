// Orchestrator configuration
//
// Everything a run needs besides the model and the tool invoker. Built once by
// the caller and passed to the orchestrator constructor.

use precis_abstraction::{ToolDeclaration, ToolParameters};
use serde::{Deserialize, Serialize};

/// Instruction sent ahead of the conversation history.
pub const DEFAULT_SYSTEM_PROMPT: &str = "As a professional summariser, you have the ability to use a url and summarise its details. For each user query, make full use of the summarised results to provide more information and help with your response. Please match the language of the response to the user's language.";

/// Upper bound on generated tokens per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Name the summarization tool is declared under.
pub const DEFAULT_TOOL_NAME: &str = "search";

/// Label shown on the tool badge.
pub const DEFAULT_TOOL_LABEL: &str = "summarize";

const TOOL_DESCRIPTION: &str = "Summarize the web page content by provide a url";

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// System instruction for every completion
    pub system_prompt: String,
    /// Maximum output tokens requested from the model
    pub max_tokens: u32,
    /// When set, a successful tool call does not open the answer section
    pub specific_model: bool,
    /// Declared tool name
    pub tool_name: String,
    /// Badge label for the tool
    pub tool_label: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            specific_model: false,
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            tool_label: DEFAULT_TOOL_LABEL.to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_specific_model(mut self, specific_model: bool) -> Self {
        self.specific_model = specific_model;
        self
    }

    #[must_use]
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Declaration of the summarization tool sent with every request.
    pub fn tool_declaration(&self) -> ToolDeclaration {
        ToolDeclaration::new(
            self.tool_name.clone(),
            TOOL_DESCRIPTION,
            ToolParameters::new().add_property("url", "string", "The URL to summarize", true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_tokens, 4096);
        assert!(!config.specific_model);
        assert_eq!(config.tool_label, "summarize");
        assert!(config.system_prompt.starts_with("As a professional summariser"));
    }

    #[test]
    fn test_tool_declaration() {
        let declaration = OrchestratorConfig::default().tool_declaration();
        assert_eq!(declaration.name, "search");
        assert_eq!(declaration.description, "Summarize the web page content by provide a url");
        assert_eq!(declaration.parameters.required, vec!["url".to_string()]);
        assert_eq!(declaration.parameters.properties["url"].property_type, "string");
    }

    #[test]
    fn test_partial_toml_like_input_keeps_defaults() {
        let config: OrchestratorConfig = serde_json::from_str(r#"{"specific_model": true}"#).unwrap();
        assert!(config.specific_model);
        assert_eq!(config.tool_name, "search");
    }
}
