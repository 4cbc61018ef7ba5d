//! Typed streaming events and frame-to-event decoding.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sse::SseFrame;
use crate::types::common::{ServerToolUsage, StopReason};
use crate::types::messages::Message;

/// How the decoder treats malformed records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Drop malformed payloads and keep the stream alive. The default.
    #[default]
    Lenient,
    /// Surface malformed payloads as recoverable [`Error::Decode`] items
    /// without terminating the stream.
    Strict,
}

/// Streaming event for a message turn.
///
/// Closed set mirroring the wire protocol; one value per SSE record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The turn opened: seeds id, model, role, and initial usage.
    MessageStart {
        /// The nascent message; content is empty at this point.
        message: Message,
    },
    /// A content block opened at `index`.
    ContentBlockStart {
        /// Position of the new block; always the current end of the list.
        index: usize,
        /// Initial shape of the block.
        content_block: BlockStart,
    },
    /// Incremental update to the block at `index`.
    ContentBlockDelta {
        /// Block being updated.
        index: usize,
        /// The increment.
        delta: BlockDelta,
    },
    /// The block at `index` closed; its buffered tool input may now parse.
    ContentBlockStop {
        /// Block that closed.
        index: usize,
    },
    /// Turn-level metadata update: stop reason and usage increments.
    MessageDelta {
        /// Stop reason / stop sequence, once known.
        delta: MessageDeltaBody,
        /// Usage counters accompanying this delta.
        #[serde(skip_serializing_if = "Option::is_none")]
        usage: Option<DeltaUsage>,
    },
    /// The turn is complete; accumulated state is now authoritative.
    MessageStop,
    /// Keep-alive, carries nothing.
    Ping,
    /// Provider-reported stream error; surfaced to the caller, never merged.
    Error {
        /// Error details.
        error: StreamError,
    },
}

/// Initial shape of a content block from `content_block_start`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockStart {
    /// Text block, seeded with (usually empty) text.
    Text {
        /// Initial text.
        text: String,
    },
    /// Caller-executed tool invocation; input arrives via JSON deltas.
    ToolUse {
        /// Invocation id.
        id: String,
        /// Tool name.
        name: String,
        /// Seed input, usually an empty object.
        input: serde_json::Value,
    },
    /// Provider-executed tool invocation.
    ServerToolUse {
        /// Invocation id.
        id: String,
        /// Tool name.
        name: String,
        /// Seed input, usually an empty object.
        input: serde_json::Value,
    },
    /// Reasoning block.
    Thinking {
        /// Initial reasoning text.
        #[serde(default)]
        thinking: String,
    },
    /// Redacted reasoning block.
    RedactedThinking {
        /// Opaque payload.
        #[serde(default)]
        data: String,
    },
}

/// Incremental content update from `content_block_delta`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    /// Text to append to a text block.
    TextDelta {
        /// The text fragment.
        text: String,
    },
    /// Raw JSON fragment to append to a tool input buffer.
    InputJsonDelta {
        /// The JSON fragment; only parseable once the block closes.
        partial_json: String,
    },
    /// Reasoning text to append.
    ThinkingDelta {
        /// The reasoning fragment.
        thinking: String,
    },
    /// Signature covering the reasoning block.
    SignatureDelta {
        /// Signature fragment.
        signature: String,
    },
    /// Citation attached to a text block.
    CitationsDelta {
        /// The citation object.
        citation: serde_json::Value,
    },
    /// Forward-compatible catch-all for unknown delta kinds.
    #[serde(other)]
    Unknown,
}

/// Body of a `message_delta` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageDeltaBody {
    /// Stop reason, present once generation halted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// The stop sequence that fired, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
}

/// Usage counters carried by a `message_delta` event.
///
/// `output_tokens` and `server_tool_use` overwrite accumulated values;
/// `input_tokens` does so only when explicitly present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeltaUsage {
    /// Output tokens generated so far.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Corrected input token count, rarely present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Provider-side tool usage counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_tool_use: Option<ServerToolUsage>,
}

/// Provider-reported error inside a stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamError {
    /// Machine-readable error type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<StreamError> for Error {
    fn from(e: StreamError) -> Self {
        Self::Api(crate::error::ApiError {
            status: None,
            kind: Some(e.kind),
            message: e.message,
            request_id: None,
        })
    }
}

// Wire envelopes for the event payloads.

#[derive(Deserialize)]
struct MessageStartWire {
    message: Message,
}

#[derive(Deserialize)]
struct BlockStartWire {
    index: usize,
    content_block: BlockStart,
}

#[derive(Deserialize)]
struct BlockDeltaWire {
    index: usize,
    delta: BlockDelta,
}

#[derive(Deserialize)]
struct BlockStopWire {
    index: usize,
}

#[derive(Deserialize)]
struct MessageDeltaWire {
    delta: MessageDeltaBody,
    #[serde(default)]
    usage: Option<DeltaUsage>,
}

#[derive(Deserialize)]
struct ErrorWire {
    error: StreamError,
}

impl StreamEvent {
    /// Decodes a typed event from a raw SSE frame.
    ///
    /// Returns `Ok(None)` for unrecognized event types (skipped for forward
    /// compatibility) and `Err` for payloads that fail to parse; the caller
    /// applies the configured [`DecodeMode`] to the latter.
    pub fn from_frame(frame: &SseFrame) -> Result<Option<Self>, Error> {
        fn parse<'a, T: Deserialize<'a>>(kind: &str, data: &'a str) -> Result<T, Error> {
            serde_json::from_str(data).map_err(|e| Error::Decode(format!("{kind}: {e}")))
        }

        let event_type = frame.event.as_deref().unwrap_or_default();
        match event_type {
            "message_start" => {
                let wire: MessageStartWire = parse("message_start", &frame.data)?;
                Ok(Some(Self::MessageStart {
                    message: wire.message,
                }))
            }
            "content_block_start" => {
                let wire: BlockStartWire = parse("content_block_start", &frame.data)?;
                Ok(Some(Self::ContentBlockStart {
                    index: wire.index,
                    content_block: wire.content_block,
                }))
            }
            "content_block_delta" => {
                let wire: BlockDeltaWire = parse("content_block_delta", &frame.data)?;
                Ok(Some(Self::ContentBlockDelta {
                    index: wire.index,
                    delta: wire.delta,
                }))
            }
            "content_block_stop" => {
                let wire: BlockStopWire = parse("content_block_stop", &frame.data)?;
                Ok(Some(Self::ContentBlockStop { index: wire.index }))
            }
            "message_delta" => {
                let wire: MessageDeltaWire = parse("message_delta", &frame.data)?;
                Ok(Some(Self::MessageDelta {
                    delta: wire.delta,
                    usage: wire.usage,
                }))
            }
            "message_stop" => Ok(Some(Self::MessageStop)),
            "ping" => Ok(Some(Self::Ping)),
            "error" => {
                let wire: ErrorWire = parse("error", &frame.data)?;
                Ok(Some(Self::Error { error: wire.error }))
            }
            _ => Ok(None),
        }
    }
}
