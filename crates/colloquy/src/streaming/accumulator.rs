//! Event-to-message accumulation.

use tracing::warn;

use crate::error::Error;
use crate::streaming::events::{BlockDelta, BlockStart, StreamEvent};
use crate::types::common::Usage;
use crate::types::content::{ContentBlock, MessageRole};
use crate::types::messages::Message;

/// Accumulation phase.
///
/// `Empty → Started → Building → Finalized`, driven exclusively by the
/// owning stream's events. Any read before `Finalized` is best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No events applied yet.
    Empty,
    /// `message_start` observed; identity and initial usage are seeded.
    Started,
    /// Content blocks are accumulating.
    Building,
    /// `message_stop` observed; the snapshot is authoritative.
    Finalized,
}

#[derive(Debug, Clone)]
enum BlockAcc {
    Text {
        text: String,
        citations: Vec<serde_json::Value>,
    },
    ToolUse {
        id: String,
        name: String,
        input_json: String,
        input: Option<serde_json::Value>,
        server: bool,
    },
    Thinking {
        thinking: String,
        signature: String,
    },
    RedactedThinking {
        data: String,
    },
}

impl BlockAcc {
    fn seed(start: &BlockStart) -> Self {
        match start {
            BlockStart::Text { text } => Self::Text {
                text: text.clone(),
                citations: Vec::new(),
            },
            BlockStart::ToolUse { id, name, .. } => Self::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input_json: String::new(),
                input: None,
                server: false,
            },
            BlockStart::ServerToolUse { id, name, .. } => Self::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input_json: String::new(),
                input: None,
                server: true,
            },
            BlockStart::Thinking { thinking } => Self::Thinking {
                thinking: thinking.clone(),
                signature: String::new(),
            },
            BlockStart::RedactedThinking { data } => Self::RedactedThinking { data: data.clone() },
        }
    }

    /// Parses the buffered tool input, remembering the result.
    ///
    /// An empty buffer resolves to `{}`. `strict` decides whether a
    /// malformed buffer is an error or falls back to `{}`.
    fn resolve_input(&mut self, strict: bool) -> Result<(), Error> {
        if let Self::ToolUse {
            name,
            input_json,
            input,
            ..
        } = self
            && input.is_none()
        {
            if input_json.is_empty() {
                *input = Some(serde_json::Value::Object(serde_json::Map::new()));
            } else {
                match serde_json::from_str(input_json) {
                    Ok(v) => *input = Some(v),
                    Err(e) if strict => {
                        return Err(Error::Decode(format!("tool '{name}' input JSON: {e}")));
                    }
                    Err(e) => {
                        warn!(tool = %name, error = %e, "unparseable tool input, defaulting to {{}}");
                        *input = Some(serde_json::Value::Object(serde_json::Map::new()));
                    }
                }
            }
        }
        Ok(())
    }

    fn to_content_block(&self) -> ContentBlock {
        match self {
            Self::Text { text, citations } => ContentBlock::Text {
                text: text.clone(),
                citations: citations.clone(),
            },
            Self::ToolUse {
                id,
                name,
                input,
                server,
                ..
            } => {
                let input = input
                    .clone()
                    .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
                if *server {
                    ContentBlock::ServerToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input,
                    }
                } else {
                    ContentBlock::ToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input,
                    }
                }
            }
            Self::Thinking {
                thinking,
                signature,
            } => ContentBlock::Thinking {
                thinking: thinking.clone(),
                signature: signature.clone(),
            },
            Self::RedactedThinking { data } => ContentBlock::RedactedThinking { data: data.clone() },
        }
    }
}

/// Folds one stream's events into a single [`Message`].
///
/// Create one accumulator per in-flight request, feed it every event from
/// that request's stream, and read the final message after `message_stop`.
/// Ordering anomalies (a delta naming an unknown block, a start whose index
/// is not the current end of the list) are logged and ignored: the provider
/// is the trusted source and a client cannot repair a broken stream.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    phase_started: bool,
    id: Option<String>,
    model: Option<String>,
    role: Option<MessageRole>,
    blocks: Vec<BlockAcc>,
    stop_reason: Option<crate::types::common::StopReason>,
    stop_sequence: Option<String>,
    usage: Usage,
    saw_usage: bool,
    snapshot: Option<Message>,
}

impl MessageAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase of the state machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.snapshot.is_some() {
            Phase::Finalized
        } else if !self.blocks.is_empty() {
            Phase::Building
        } else if self.phase_started {
            Phase::Started
        } else {
            Phase::Empty
        }
    }

    /// Whether `message_stop` has been observed.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Applies one event.
    ///
    /// Returns an error only for a provider [`StreamEvent::Error`] (surfaced
    /// as-is, never merged) or for tool input that fails to parse at
    /// finalization. Events arriving after finalization are ignored.
    pub fn apply(&mut self, event: &StreamEvent) -> Result<(), Error> {
        if let StreamEvent::Error { error } = event {
            return Err(error.clone().into());
        }
        if self.is_final() {
            if !matches!(event, StreamEvent::Ping) {
                warn!("event after message_stop ignored");
            }
            return Ok(());
        }

        match event {
            StreamEvent::MessageStart { message } => {
                self.phase_started = true;
                self.id = Some(message.id.clone());
                self.model = Some(message.model.clone());
                self.role = Some(message.role);
                if let Some(usage) = &message.usage {
                    self.usage = usage.clone();
                    self.saw_usage = true;
                }
            }
            StreamEvent::ContentBlockStart {
                index,
                content_block,
            } => {
                if *index == self.blocks.len() {
                    self.blocks.push(BlockAcc::seed(content_block));
                } else {
                    warn!(
                        index,
                        blocks = self.blocks.len(),
                        "content_block_start out of order, ignored"
                    );
                }
            }
            StreamEvent::ContentBlockDelta { index, delta } => {
                let Some(block) = self.blocks.get_mut(*index) else {
                    warn!(index, "delta for unknown block index, ignored");
                    return Ok(());
                };
                Self::merge_delta(block, delta);
            }
            StreamEvent::ContentBlockStop { index } => {
                if let Some(block) = self.blocks.get_mut(*index) {
                    // Lenient here; a bad buffer is re-checked strictly at
                    // message_stop.
                    let _ = block.resolve_input(false);
                } else {
                    warn!(index, "stop for unknown block index, ignored");
                }
            }
            StreamEvent::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.stop_reason = Some(reason);
                }
                if let Some(seq) = &delta.stop_sequence {
                    self.stop_sequence = Some(seq.clone());
                }
                if let Some(u) = usage {
                    self.saw_usage = true;
                    if let Some(out) = u.output_tokens {
                        self.usage.output_tokens = Some(out);
                    }
                    if let Some(inp) = u.input_tokens {
                        self.usage.input_tokens = Some(inp);
                    }
                    if let Some(stu) = &u.server_tool_use {
                        self.usage.server_tool_use = Some(stu.clone());
                    }
                }
            }
            StreamEvent::MessageStop => {
                self.snapshot = Some(self.build(true)?);
            }
            // Returned early above; never merged into turn state.
            StreamEvent::Ping | StreamEvent::Error { .. } => {}
        }
        Ok(())
    }

    fn merge_delta(block: &mut BlockAcc, delta: &BlockDelta) {
        match (block, delta) {
            (BlockAcc::Text { text, .. }, BlockDelta::TextDelta { text: t }) => {
                text.push_str(t);
            }
            (BlockAcc::Text { citations, .. }, BlockDelta::CitationsDelta { citation }) => {
                citations.push(citation.clone());
            }
            (BlockAcc::ToolUse { input_json, .. }, BlockDelta::InputJsonDelta { partial_json }) => {
                input_json.push_str(partial_json);
            }
            (BlockAcc::Thinking { thinking, .. }, BlockDelta::ThinkingDelta { thinking: t }) => {
                thinking.push_str(t);
            }
            (BlockAcc::Thinking { signature, .. }, BlockDelta::SignatureDelta { signature: s }) => {
                signature.push_str(s);
            }
            // Mismatched or unknown delta kinds are ignored.
            _ => {}
        }
    }

    fn build(&mut self, strict: bool) -> Result<Message, Error> {
        let mut content = Vec::with_capacity(self.blocks.len());
        for block in &mut self.blocks {
            block.resolve_input(strict)?;
            content.push(block.to_content_block());
        }

        Ok(Message {
            id: self.id.clone().unwrap_or_default(),
            kind: "message".to_string(),
            role: self.role.unwrap_or(MessageRole::Assistant),
            content,
            model: self.model.clone().unwrap_or_default(),
            stop_reason: self.stop_reason,
            stop_sequence: self.stop_sequence.clone(),
            usage: self.saw_usage.then(|| self.usage.clone()),
        })
    }

    /// The finalized message, if `message_stop` has been observed.
    ///
    /// Repeated calls return the same cached value; no further events are
    /// required or consumed.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.snapshot.as_ref()
    }

    /// Concatenation of all text blocks accumulated so far.
    ///
    /// Available at any point; not authoritative until finalized (usage and
    /// stop reason may still change).
    #[must_use]
    pub fn partial_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                BlockAcc::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Buffered text of the block at `index`, if it is a text block.
    #[must_use]
    pub fn block_text(&self, index: usize) -> Option<&str> {
        match self.blocks.get(index) {
            Some(BlockAcc::Text { text, .. }) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Synthesizes a best-effort message from current state.
    ///
    /// Escape hatch for abandoning a stream early: the result is marked
    /// non-final by construction (no `message_stop` was observed, and unless
    /// a `message_delta` said otherwise, `stop_reason` is absent). Tool
    /// inputs that do not yet parse resolve to `{}`. Once finalized this
    /// returns the authoritative snapshot instead.
    #[must_use]
    pub fn finalize_now(&mut self) -> Message {
        if let Some(snapshot) = &self.snapshot {
            return snapshot.clone();
        }
        // Lenient build cannot fail.
        self.build(false).unwrap_or_else(|_| Message {
            id: self.id.clone().unwrap_or_default(),
            kind: "message".to_string(),
            role: MessageRole::Assistant,
            content: Vec::new(),
            model: self.model.clone().unwrap_or_default(),
            stop_reason: None,
            stop_sequence: None,
            usage: None,
        })
    }
}
