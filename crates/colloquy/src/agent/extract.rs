//! Extraction of tool invocation requests from a completed turn.

use crate::types::content::ContentBlock;
use crate::types::messages::Message;

/// Who executes a requested tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRequestKind {
    /// Executed by the SDK caller through a registered handler.
    Client,
    /// Already executed by the provider; no local dispatch, no tool result.
    Server,
}

/// One tool invocation requested by a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    /// Invocation id, echoed in the eventual tool result.
    pub id: String,
    /// Requested tool name.
    pub name: String,
    /// Parsed tool input.
    pub input: serde_json::Value,
    /// Who executes it.
    pub kind: ToolRequestKind,
}

/// Scans a turn for tool invocations, in content order.
#[must_use]
pub fn tool_requests(message: &Message) -> Vec<ToolRequest> {
    message
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolRequest {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
                kind: ToolRequestKind::Client,
            }),
            ContentBlock::ServerToolUse { id, name, input } => Some(ToolRequest {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
                kind: ToolRequestKind::Server,
            }),
            _ => None,
        })
        .collect()
}
