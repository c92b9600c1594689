// Tool declarations
//
// A declaration tells the model which side capability it may call and what
// arguments that call takes. The parameter schema is a JSON-schema object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tool the model may call during a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool name (used in function calls)
    pub name: String,
    /// Tool description shown to the model
    pub description: String,
    /// Parameter schema
    pub parameters: ToolParameters,
}

impl ToolDeclaration {
    /// Create a new declaration
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
    ) -> Self {
        Self { name: name.into(), description: description.into(), parameters }
    }
}

/// Tool parameters schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// Type (always "object" for function parameters)
    #[serde(rename = "type")]
    pub param_type: String,
    /// Property definitions
    pub properties: BTreeMap<String, ToolPropertySchema>,
    /// Required property names
    pub required: Vec<String>,
}

impl ToolParameters {
    /// Create a new tool parameters schema
    pub fn new() -> Self {
        Self { param_type: "object".to_string(), properties: BTreeMap::new(), required: Vec::new() }
    }

    /// Add a property to the schema
    #[must_use]
    pub fn add_property(
        mut self,
        name: impl Into<String>,
        property_type: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            ToolPropertySchema {
                property_type: property_type.into(),
                description: description.into(),
            },
        );
        if required {
            self.required.push(name);
        }
        self
    }
}

impl Default for ToolParameters {
    fn default() -> Self {
        Self::new()
    }
}

/// Tool property schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPropertySchema {
    /// Property type
    #[serde(rename = "type")]
    pub property_type: String,
    /// Property description
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_parameters_builder() {
        let params = ToolParameters::new()
            .add_property("url", "string", "The URL to summarize", true)
            .add_property("lang", "string", "Answer language", false);

        assert_eq!(params.properties.len(), 2);
        assert_eq!(params.required, vec!["url".to_string()]);
    }

    #[test]
    fn test_declaration_serializes_as_json_schema() {
        let declaration = ToolDeclaration::new(
            "search",
            "Summarize the web page content by provide a url",
            ToolParameters::new().add_property("url", "string", "The URL to summarize", true),
        );

        let value = serde_json::to_value(&declaration).unwrap();
        assert_eq!(value["name"], "search");
        assert_eq!(value["parameters"]["type"], "object");
        assert_eq!(value["parameters"]["properties"]["url"]["type"], "string");
        assert_eq!(value["parameters"]["required"][0], "url");
    }
}
