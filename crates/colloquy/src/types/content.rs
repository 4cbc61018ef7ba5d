use serde::{Deserialize, Serialize};

use super::common::CacheControl;

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// User message.
    User,
    /// Assistant message.
    Assistant,
}

/// Content block in a response.
///
/// Closed set discriminated by the `type` tag. Response blocks are separate
/// from the request-side [`ContentBlockParam`] because the API accepts more
/// content kinds than it returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text span.
    Text {
        /// The text content.
        text: String,
        /// Citations attached to this span, when citation delivery is enabled.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        citations: Vec<serde_json::Value>,
    },
    /// Tool invocation to be executed by the caller.
    ToolUse {
        /// Unique id correlating the eventual tool result.
        id: String,
        /// Name of the requested tool.
        name: String,
        /// Parsed tool input.
        input: serde_json::Value,
    },
    /// Tool invocation executed by the provider itself.
    ///
    /// Its output is interleaved by the provider within the same turn; no
    /// local execution or tool result is expected for these.
    ServerToolUse {
        /// Unique invocation id.
        id: String,
        /// Name of the provider-side tool.
        name: String,
        /// Parsed tool input.
        input: serde_json::Value,
    },
    /// Internal reasoning span.
    Thinking {
        /// The reasoning text.
        thinking: String,
        /// Integrity signature over the reasoning.
        #[serde(default)]
        signature: String,
    },
    /// Reasoning span withheld by the provider.
    RedactedThinking {
        /// Opaque encrypted payload.
        data: String,
    },
}

/// Image source for multimodal content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Base64-encoded image data.
    Base64 {
        /// Media type (e.g. `image/png`).
        media_type: String,
        /// Base64-encoded bytes.
        data: String,
    },
    /// Image URL.
    Url {
        /// URL to the image.
        url: String,
    },
}

/// Content carried by a tool result.
///
/// Either a plain string or an array of content blocks (text or image).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Simple string content.
    String(String),
    /// Array of content blocks.
    Blocks(Vec<ToolResultContentBlock>),
}

impl From<&str> for ToolResultContent {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ToolResultContent {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Content block allowed inside a tool result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContentBlock {
    /// Text block.
    Text {
        /// The text content.
        text: String,
    },
    /// Image block.
    Image {
        /// Image source.
        source: ImageSource,
    },
}

/// Content block parameter for requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockParam {
    /// Text block.
    Text {
        /// The text content.
        text: String,
        /// Optional cache control marker.
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Tool invocation echoed back in an assistant message.
    ToolUse {
        /// Invocation id.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input.
        input: serde_json::Value,
    },
    /// Provider-executed tool invocation echoed back in an assistant message.
    ServerToolUse {
        /// Invocation id.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input.
        input: serde_json::Value,
    },
    /// Result of a caller-executed tool, sent in a user message.
    ToolResult {
        /// Id of the originating tool invocation.
        tool_use_id: String,
        /// Result content, absent for empty results.
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// Marks the result as an execution failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
        /// Optional cache control marker.
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Image block.
    Image {
        /// Image source.
        source: ImageSource,
        /// Optional cache control marker.
        #[serde(skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
    /// Reasoning block echoed back in an assistant message.
    Thinking {
        /// The reasoning text.
        thinking: String,
        /// Integrity signature over the reasoning.
        signature: String,
    },
    /// Redacted reasoning block echoed back in an assistant message.
    RedactedThinking {
        /// Opaque encrypted payload.
        data: String,
    },
}

impl From<&ContentBlock> for ContentBlockParam {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text, .. } => Self::Text {
                text: text.clone(),
                cache_control: None,
            },
            ContentBlock::ToolUse { id, name, input } => Self::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
            ContentBlock::ServerToolUse { id, name, input } => Self::ServerToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
            ContentBlock::Thinking {
                thinking,
                signature,
            } => Self::Thinking {
                thinking: thinking.clone(),
                signature: signature.clone(),
            },
            ContentBlock::RedactedThinking { data } => Self::RedactedThinking { data: data.clone() },
        }
    }
}

/// System prompt parameter: a plain string or text blocks with cache control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SystemParam {
    /// Simple string system prompt.
    String(String),
    /// Text blocks with optional cache control.
    Blocks(Vec<TextBlockParam>),
}

/// Message content parameter: a plain string or content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageContentParam {
    /// Simple string content.
    String(String),
    /// Array of content blocks.
    Blocks(Vec<ContentBlockParam>),
}

/// Text block parameter for system prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBlockParam {
    /// The text content.
    pub text: String,
    /// Type discriminant, always `"text"`.
    #[serde(rename = "type", default = "text_type", skip_serializing_if = "is_text")]
    pub kind: String,
    /// Optional cache control marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
}

fn text_type() -> String {
    "text".to_string()
}

fn is_text(s: &str) -> bool {
    s == "text"
}

impl TextBlockParam {
    /// Creates a text block without cache control.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: "text".to_string(),
            cache_control: None,
        }
    }

    /// Creates a text block with cache control.
    #[must_use]
    pub fn with_cache_control(text: impl Into<String>, cache_control: CacheControl) -> Self {
        Self {
            text: text.into(),
            kind: "text".to_string(),
            cache_control: Some(cache_control),
        }
    }
}

/// One message in a conversation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageParam {
    /// Role of the message.
    pub role: MessageRole,
    /// Content of the message.
    pub content: MessageContentParam,
}

impl MessageParam {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<MessageContentParam>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<MessageContentParam>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&str> for MessageContentParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for MessageContentParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<ContentBlockParam>> for MessageContentParam {
    fn from(blocks: Vec<ContentBlockParam>) -> Self {
        Self::Blocks(blocks)
    }
}

impl From<&str> for SystemParam {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for SystemParam {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
