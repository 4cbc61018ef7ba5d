//! Tool registry: definitions advertised to the model, plus optional local
//! handlers for the tools the caller executes.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::types::content::ToolResultContent;
use crate::types::tools::Tool;

/// Error type produced by tool handlers.
///
/// The runner never propagates these: a handler failure becomes an
/// `is_error` tool result fed back into the conversation.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Locally executed tool.
///
/// Implemented automatically for async closures via
/// [`ToolRegistry::register_fn`]; implement it directly for stateful tools.
pub trait ToolHandler: Send + Sync {
    /// Executes the tool against its parsed input.
    fn call(&self, input: serde_json::Value)
    -> BoxFuture<'_, Result<ToolResultContent, HandlerError>>;
}

struct FnHandler<F>(F);

impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolResultContent, HandlerError>> + Send + 'static,
{
    fn call(
        &self,
        input: serde_json::Value,
    ) -> BoxFuture<'_, Result<ToolResultContent, HandlerError>> {
        Box::pin((self.0)(input))
    }
}

/// Maps tool names to definitions and, for caller-executed tools, handlers.
///
/// A definition registered without a handler is advertised to the model but
/// treated as provider-/model-side: the runner produces an error tool result
/// if the model nevertheless requests it as a client tool.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool definition with a handler.
    #[must_use]
    pub fn register(mut self, tool: Tool, handler: impl ToolHandler + 'static) -> Self {
        self.handlers
            .insert(tool.name.clone(), Arc::new(handler) as Arc<dyn ToolHandler>);
        self.tools.push(tool);
        self
    }

    /// Registers a tool definition with an async closure handler.
    #[must_use]
    pub fn register_fn<F, Fut>(self, tool: Tool, f: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResultContent, HandlerError>> + Send + 'static,
    {
        self.register(tool, FnHandler(f))
    }

    /// Advertises a tool definition without a local handler.
    #[must_use]
    pub fn advertise(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// The definitions to advertise with each request.
    #[must_use]
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Looks up the handler for a tool name.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Whether no definitions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
