#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_docs)]

//! # `colloquy`
//!
//! Async client for Anthropic-compatible conversational Messages APIs,
//! built around two cooperating cores: the **streaming reconstruction
//! protocol** (SSE bytes → typed events → one immutable [`Message`] per
//! turn) and the **tool-use execution loop** (turn → extract → execute →
//! continue, bounded by an iteration cap).
//!
//! ## Quick start
//!
//! ```no_run
//! use colloquy::{Client, types::{MessageParam, MessagesCreateRequest}};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new();
//!
//! let req = MessagesCreateRequest {
//!     model: "claude-sonnet-4-5".into(),
//!     max_tokens: 256,
//!     messages: vec![MessageParam::user("Hello!")],
//!     ..Default::default()
//! };
//!
//! let message = client.messages().create(req).await?;
//! println!("{}", message.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! ```no_run
//! # use colloquy::{Client, types::{MessageParam, MessagesCreateRequest}};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::new();
//! # let req = MessagesCreateRequest::default();
//! let mut stream = client.messages().create_stream(req).await?;
//! while let Some(event) = stream.next_event().await {
//!     let _ = event?;
//!     print!("\r{}", stream.partial_text());
//! }
//! let _message = stream.final_message().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Tool loop
//!
//! ```no_run
//! # use colloquy::{Client, agent::{ToolRunner, ToolRegistry, RunOutcome}};
//! # use colloquy::types::{MessagesCreateRequest, Tool, ToolResultContent};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::new();
//! # let req = MessagesCreateRequest::default();
//! let registry = ToolRegistry::new().register_fn(
//!     Tool::new("echo", "Echoes its input", serde_json::json!({"type": "object"})),
//!     |input| async move { Ok(ToolResultContent::String(input.to_string())) },
//! );
//!
//! let mut runner = ToolRunner::new(&client, registry, req).with_max_iterations(5);
//! match runner.run().await? {
//!     RunOutcome::Complete(message) => println!("{}", message.text()),
//!     RunOutcome::IterationsExhausted { iterations } => {
//!         eprintln!("gave up after {iterations} turns");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Tool-use execution loop
pub mod agent;
/// HTTP client implementation
pub mod client;
/// Configuration types for the client
pub mod config;
/// Error types
pub mod error;
/// API resource implementations
pub mod resources;
/// Retry logic utilities
pub mod retry;
/// Server-sent events framing
pub mod sse;
/// Streaming reconstruction: events, accumulation, structured outputs
pub mod streaming;
/// Test-only helpers for process-global state
pub mod test_support;
/// Request and response types
pub mod types;

pub use crate::client::Client;
pub use crate::config::{ApiConfig, Auth, BetaFeature, Config};
pub use crate::error::{ApiError, Error};
pub use crate::types::messages::Message;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::agent::{RunOutcome, ToolRegistry, ToolRunner};
    pub use crate::streaming::{DecodeMode, MessageAccumulator, MessageStream, StreamEvent};
    pub use crate::types::common::*;
    pub use crate::types::content::*;
    pub use crate::types::messages::*;
    pub use crate::{ApiConfig, Client};
}
