use serde::{Deserialize, Serialize};

use super::common::CacheControl;

/// Tool definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tool {
    /// Tool name.
    pub name: String,
    /// What the tool does, shown to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema for the tool input.
    pub input_schema: serde_json::Value,
    /// Optional cache control marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    /// Require strict schema conformance (structured outputs beta).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl Tool {
    /// Creates a tool definition from a name, description, and input schema.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema,
            cache_control: None,
            strict: None,
        }
    }
}

/// Tool choice strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools.
    Auto {
        /// Disable parallel tool use.
        #[serde(skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
    /// Force the model to use at least one tool.
    Any {
        /// Disable parallel tool use.
        #[serde(skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
    /// Disable tool use.
    #[serde(rename = "none")]
    None,
    /// Force the model to use a specific tool.
    Tool {
        /// Name of the tool to use.
        name: String,
        /// Disable parallel tool use.
        #[serde(skip_serializing_if = "Option::is_none")]
        disable_parallel_tool_use: Option<bool>,
    },
}

impl Default for ToolChoice {
    fn default() -> Self {
        Self::Auto {
            disable_parallel_tool_use: None,
        }
    }
}

/// Type-safe tool schema generation (requires the `schemars` feature).
#[cfg(feature = "schemars")]
pub mod schema {
    use super::*;
    use schemars::JsonSchema;

    /// Generates a [`Tool`] definition from a type implementing `JsonSchema`.
    ///
    /// # Panics
    ///
    /// Panics if the generated schema cannot be represented as JSON, which
    /// does not happen for derived schemas.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn tool_from_schema<T: JsonSchema>(name: &str, description: Option<&str>) -> Tool {
        let root = schemars::schema_for!(T);
        let schema_value = serde_json::to_value(root.schema).expect("valid schema");
        Tool {
            name: name.to_string(),
            description: description.map(std::string::ToString::to_string),
            input_schema: schema_value,
            cache_control: None,
            strict: None,
        }
    }

    /// Parses a tool-use input back into a typed value.
    pub fn try_parse_tool_use<T: serde::de::DeserializeOwned>(
        name: &str,
        input: &serde_json::Value,
    ) -> serde_json::Result<T> {
        let wrapped = serde_json::json!({
            "action": name,
            "params": input
        });
        serde_json::from_value(wrapped)
    }
}
