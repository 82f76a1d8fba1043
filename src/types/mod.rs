//! Core data types shared with the host framework.
//!
//! These mirror the host's OpenAI-compatible chat shapes. The adapter only
//! reads and reshapes them; it never invents new message kinds.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PromptMessage`] | Chat message with role and content |
//! | [`PromptMessageRole`] | system, user, assistant, tool |
//! | [`PromptMessageTool`] | Tool definition forwarded to the backend |
//! | [`LlmResult`] | Complete (non-streaming) completion |
//! | [`LlmResultChunk`] | One streamed completion fragment |

pub mod message;
pub mod result;
pub mod tool;

pub use message::{ContentPart, MessageContent, PromptMessage, PromptMessageRole};
pub use result::{LlmResult, LlmResultChunk, LlmResultChunkDelta, LlmUsage};
pub use tool::{PromptMessageTool, ToolCall};

/// Provider credentials as configured in the host (endpoint url, api key, ...).
pub type Credentials = serde_json::Map<String, serde_json::Value>;
