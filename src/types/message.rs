//! Prompt messages in the OpenAI chat shape

use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// A role-tagged prompt message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptMessageRole,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Set on tool messages: the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Set on assistant messages that requested tool calls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl PromptMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self::with_content(PromptMessageRole::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(PromptMessageRole::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_content(
            PromptMessageRole::Assistant,
            MessageContent::Text(text.into()),
        )
    }

    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut msg = Self::with_content(PromptMessageRole::Tool, MessageContent::Text(text.into()));
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    pub fn with_content(role: PromptMessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            name: None,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == PromptMessageRole::Assistant
    }

    /// Plain text content, `None` for multi-part content.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t.as_str()),
            MessageContent::Parts(_) => None,
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Message content (a plain string or a list of content parts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part of a multi-part message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String, // data: URI or remote URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_roundtrips_as_plain_string() {
        let msg = PromptMessage::assistant("hi");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v, serde_json::json!({"role": "assistant", "content": "hi"}));
        assert_eq!(msg.text(), Some("hi"));
    }

    #[test]
    fn test_parts_content_has_no_text() {
        let msg = PromptMessage::with_content(
            PromptMessageRole::User,
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "describe".into(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: "https://example.com/cat.png".into(),
                        detail: None,
                    },
                },
            ]),
        );
        assert_eq!(msg.text(), None);
        assert_eq!(
            serde_json::to_value(&msg).unwrap()["content"][1],
            serde_json::json!({"type": "image_url", "image_url": {"url": "https://example.com/cat.png"}})
        );
    }

    #[test]
    fn test_deserialize_parts() {
        let msg: PromptMessage = serde_json::from_value(serde_json::json!({
            "role": "user",
            "content": [{"type": "text", "text": "hello"}]
        }))
        .unwrap();
        assert_eq!(msg.role, PromptMessageRole::User);
        assert!(matches!(msg.content, MessageContent::Parts(ref p) if p.len() == 1));
    }
}
