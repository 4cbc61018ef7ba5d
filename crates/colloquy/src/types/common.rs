use serde::{Deserialize, Serialize};

/// Cache time-to-live for prompt caching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CacheTtl {
    /// Five minute TTL.
    #[serde(rename = "5m")]
    FiveMinutes,
    /// One hour TTL.
    #[serde(rename = "1h")]
    OneHour,
}

/// Cache control marker attached to cacheable content blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheControl {
    /// Cache type, always `"ephemeral"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional TTL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<CacheTtl>,
}

impl CacheControl {
    /// Ephemeral cache entry with a five minute TTL.
    #[must_use]
    pub fn ephemeral_5m() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: Some(CacheTtl::FiveMinutes),
        }
    }

    /// Ephemeral cache entry with a one hour TTL.
    #[must_use]
    pub fn ephemeral_1h() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: Some(CacheTtl::OneHour),
        }
    }

    /// Ephemeral cache entry with the default TTL.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self {
            kind: "ephemeral".into(),
            ttl: None,
        }
    }
}

/// Validate that when mixing TTLs, `OneHour` entries appear before `FiveMinutes`.
#[must_use]
pub fn validate_mixed_ttl_order(block_ttls: impl IntoIterator<Item = CacheTtl>) -> bool {
    let mut seen_5m = false;
    for ttl in block_ttls {
        match ttl {
            CacheTtl::OneHour if seen_5m => return false,
            CacheTtl::FiveMinutes => seen_5m = true,
            CacheTtl::OneHour => {}
        }
    }
    true
}

/// Why generation stopped.
///
/// A message still being streamed carries no stop reason; only a finalized
/// message observed through `message_stop` has an authoritative value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its turn naturally.
    EndTurn,
    /// The `max_tokens` limit was reached.
    MaxTokens,
    /// A configured stop sequence was generated.
    StopSequence,
    /// The model is requesting tool execution.
    ToolUse,
    /// A long-running turn was paused by the provider.
    PauseTurn,
    /// The model refused to continue.
    Refusal,
}

/// Server-side tool usage counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ServerToolUsage {
    /// Number of web search requests issued by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_search_requests: Option<u64>,
}

/// Token accounting for a message.
///
/// Fields are populated incrementally while streaming: `message_start` seeds
/// `input_tokens` and the cache counters, later `message_delta` events
/// overwrite `output_tokens` and `server_tool_use` (and `input_tokens` only
/// when explicitly present). Until the message is final these figures are
/// best-effort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Usage {
    /// Tokens in the request.
    pub input_tokens: Option<u64>,
    /// Tokens generated in the response.
    pub output_tokens: Option<u64>,
    /// Tokens written to the prompt cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_creation_input_tokens: Option<u64>,
    /// Tokens served from the prompt cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_read_input_tokens: Option<u64>,
    /// Provider-executed tool usage counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_tool_use: Option<ServerToolUsage>,
}

/// Request metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Opaque end-user identifier for abuse detection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
