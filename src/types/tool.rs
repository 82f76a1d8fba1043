//! Tool calling definitions in the OpenAI function-calling shape

use serde::{Deserialize, Serialize};

/// Tool offered to the model (forwarded to the inner client untouched)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessageTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: serde_json::Value, // JSON Schema
}

impl PromptMessageTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Tool call (invocation from model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}
