//! Completion results returned by the wrapped client

use serde::{Deserialize, Serialize};

use super::message::PromptMessage;

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl LlmUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// A complete (non-streaming) completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResult {
    pub model: String,
    /// The prompt as actually sent, i.e. after directive removal.
    pub prompt_messages: Vec<PromptMessage>,
    pub message: PromptMessage,
    #[serde(default)]
    pub usage: LlmUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

/// One incremental fragment of a streamed completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResultChunk {
    pub model: String,
    pub delta: LlmResultChunkDelta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResultChunkDelta {
    pub index: u32,
    pub message: PromptMessage,
    /// Only present on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl LlmResultChunk {
    pub fn text(model: impl Into<String>, index: u32, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            delta: LlmResultChunkDelta {
                index,
                message: PromptMessage::assistant(text),
                usage: None,
                finish_reason: None,
            },
        }
    }
}
