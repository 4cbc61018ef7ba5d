use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::common::{Metadata, StopReason, Usage};
use super::content::{
    ContentBlock, ContentBlockParam, MessageContentParam, MessageParam, MessageRole, SystemParam,
};
use super::tools::{Tool, ToolChoice};

/// Structured output constraint for a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputFormat {
    /// Constrain the response to a JSON schema.
    JsonSchema {
        /// The JSON schema to conform to.
        schema: serde_json::Value,
    },
}

/// Request to create a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder, Default)]
#[builder(setter(into, strip_option), default)]
pub struct MessagesCreateRequest {
    /// Model to use for generation.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemParam>,
    /// Conversation messages.
    pub messages: Vec<MessageParam>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Custom stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    /// Nucleus sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k sampling parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Request metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// Tools advertised to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Tool choice strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Request a streaming response. Set automatically by the streaming API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Structured output constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
}

/// One complete model-generated conversation turn.
///
/// Immutable once produced: either deserialized whole from a blocking
/// response, or assembled by the
/// [`MessageAccumulator`](crate::streaming::MessageAccumulator) after
/// `message_stop`. A message synthesized from a partial stream carries no
/// `stop_reason`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Message id.
    pub id: String,
    /// Object type, always `"message"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Role, always assistant for generated turns.
    pub role: MessageRole,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
    /// Model that produced the turn.
    pub model: String,
    /// Why generation stopped; absent while incomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Which stop sequence fired, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
    /// Token accounting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Message {
    /// Concatenation of all text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Converts this turn into a request-side assistant message, preserving
    /// tool invocations and reasoning blocks for the follow-up request.
    #[must_use]
    pub fn to_param(&self) -> MessageParam {
        MessageParam {
            role: self.role,
            content: MessageContentParam::Blocks(
                self.content.iter().map(ContentBlockParam::from).collect(),
            ),
        }
    }
}

/// Request to count tokens for a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageTokensCountRequest {
    /// Model to count against.
    pub model: String,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemParam>,
    /// Conversation messages.
    pub messages: Vec<MessageParam>,
    /// Tools that would be advertised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Tool choice strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// Response from counting tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageTokensCountResponse {
    /// Number of input tokens the request would consume.
    pub input_tokens: u64,
}
