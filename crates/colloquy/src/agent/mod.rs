//! The tool-use execution loop.
//!
//! [`ToolRunner`] drives repeated turn → extract → execute → continue cycles
//! against the Messages API: each iteration produces one assistant turn,
//! executes any caller-side tool invocations it requested, and feeds the
//! results back as a single user message. The loop ends when a turn stops
//! for any reason other than `tool_use`, or when the iteration cap is
//! reached. Exhaustion is a distinct [`RunOutcome::IterationsExhausted`]
//! value, never an error and never a silently partial turn.

use tracing::{debug, warn};

use crate::client::Client;
use crate::config::Config;
use crate::error::Error;
use crate::streaming::DecodeMode;
use crate::types::common::StopReason;
use crate::types::content::{ContentBlockParam, MessageParam, ToolResultContent};
use crate::types::messages::{Message, MessagesCreateRequest};

/// Tool invocation extraction
pub mod extract;
/// Tool definitions and handlers
pub mod registry;

pub use extract::{ToolRequest, ToolRequestKind, tool_requests};
pub use registry::{HandlerError, ToolHandler, ToolRegistry};

/// How the runner produces each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnMode {
    /// One blocking request per turn.
    #[default]
    Buffered,
    /// Stream each turn and drain it through `message_stop` before any tool
    /// executes. The turn's transport resource is released as soon as the
    /// turn finalizes.
    Streamed,
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The conversation ended with a turn that requested no further tools.
    Complete(Message),
    /// The iteration cap was reached while the model still wanted tools.
    ///
    /// Not an error: callers must branch on this explicitly rather than
    /// treating it as success.
    IterationsExhausted {
        /// How many turns were produced.
        iterations: usize,
    },
}

/// Outcome of a single loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The turn requested tools; results were appended and the loop can
    /// continue.
    Continue(Message),
    /// The turn ended the conversation.
    Complete(Message),
    /// The iteration cap was reached.
    IterationsExhausted {
        /// How many turns were produced.
        iterations: usize,
    },
}

const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Drives a multi-turn tool-use conversation.
///
/// The runner owns the conversation's growing message list; one instance is
/// one conversation, driven by one caller. Restarting means constructing a
/// new runner.
pub struct ToolRunner<'c, C: Config> {
    client: &'c Client<C>,
    registry: ToolRegistry,
    request: MessagesCreateRequest,
    max_iterations: usize,
    iterations: usize,
    mode: TurnMode,
    decode_mode: DecodeMode,
    terminal: Option<RunOutcome>,
}

impl<'c, C: Config> ToolRunner<'c, C> {
    /// Creates a runner from a request template and a tool registry.
    ///
    /// `request.messages` seeds the conversation. If the request does not
    /// already advertise tools, the registry's definitions are attached.
    #[must_use]
    pub fn new(
        client: &'c Client<C>,
        registry: ToolRegistry,
        mut request: MessagesCreateRequest,
    ) -> Self {
        if request.tools.is_none() && !registry.is_empty() {
            request.tools = Some(registry.tools().to_vec());
        }
        Self {
            client,
            registry,
            request,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            iterations: 0,
            mode: TurnMode::default(),
            decode_mode: DecodeMode::default(),
            terminal: None,
        }
    }

    /// Caps the number of turns produced before the loop gives up.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Produces each turn by streaming instead of a blocking call.
    #[must_use]
    pub fn streamed(mut self) -> Self {
        self.mode = TurnMode::Streamed;
        self
    }

    /// Sets the decode mode used for streamed turns.
    #[must_use]
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// The conversation so far, including synthesized tool-result messages.
    #[must_use]
    pub fn messages(&self) -> &[MessageParam] {
        &self.request.messages
    }

    /// Number of turns produced so far.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Runs one iteration: produce a turn, execute its client tool
    /// requests, append the tool results.
    ///
    /// After a terminal outcome this returns that same outcome without
    /// further network calls.
    pub async fn step(&mut self) -> Result<StepOutcome, Error> {
        if let Some(terminal) = &self.terminal {
            return Ok(match terminal {
                RunOutcome::Complete(message) => StepOutcome::Complete(message.clone()),
                RunOutcome::IterationsExhausted { iterations } => StepOutcome::IterationsExhausted {
                    iterations: *iterations,
                },
            });
        }

        let message = self.produce_turn().await?;
        self.iterations += 1;
        self.request.messages.push(message.to_param());

        if message.stop_reason != Some(StopReason::ToolUse) {
            debug!(
                iterations = self.iterations,
                stop_reason = ?message.stop_reason,
                "conversation complete"
            );
            self.terminal = Some(RunOutcome::Complete(message.clone()));
            return Ok(StepOutcome::Complete(message));
        }

        let results = self.execute_tools(&message).await;
        if !results.is_empty() {
            self.request.messages.push(MessageParam::user(results));
        }

        if self.iterations >= self.max_iterations {
            warn!(
                iterations = self.iterations,
                "iteration cap reached with tools still pending"
            );
            self.terminal = Some(RunOutcome::IterationsExhausted {
                iterations: self.iterations,
            });
            return Ok(StepOutcome::IterationsExhausted {
                iterations: self.iterations,
            });
        }

        Ok(StepOutcome::Continue(message))
    }

    /// Runs the loop to completion.
    pub async fn run(&mut self) -> Result<RunOutcome, Error> {
        loop {
            match self.step().await? {
                StepOutcome::Continue(_) => {}
                StepOutcome::Complete(message) => return Ok(RunOutcome::Complete(message)),
                StepOutcome::IterationsExhausted { iterations } => {
                    return Ok(RunOutcome::IterationsExhausted { iterations });
                }
            }
        }
    }

    /// Consumes the runner into a lazy stream of iteration outcomes.
    ///
    /// Yields one [`StepOutcome`] per produced turn, ending after the first
    /// terminal outcome or error. Restarting requires a new runner.
    pub fn turns(self) -> impl futures::Stream<Item = Result<StepOutcome, Error>> + 'c {
        futures::stream::unfold((self, false), |(mut runner, stopped)| async move {
            if stopped {
                return None;
            }
            match runner.step().await {
                Ok(outcome) => {
                    let stop = !matches!(outcome, StepOutcome::Continue(_));
                    Some((Ok(outcome), (runner, stop)))
                }
                Err(e) => Some((Err(e), (runner, true))),
            }
        })
    }

    async fn produce_turn(&self) -> Result<Message, Error> {
        let request = self.request.clone();
        match self.mode {
            TurnMode::Buffered => self.client.messages().create(request).await,
            TurnMode::Streamed => {
                // The stream lives only as long as this scope: drained to
                // message_stop, then dropped, releasing the connection
                // before any tool executes.
                let mut stream = self
                    .client
                    .messages()
                    .create_stream_with(request, self.decode_mode)
                    .await?;
                stream.final_message().await
            }
        }
    }

    /// Executes all client tool requests of a turn, in request order.
    ///
    /// Handler failures and unregistered tools become `is_error` results;
    /// server requests are passed through without local dispatch.
    async fn execute_tools(&self, message: &Message) -> Vec<ContentBlockParam> {
        let mut results = Vec::new();
        for request in tool_requests(message) {
            if request.kind == ToolRequestKind::Server {
                debug!(tool = %request.name, "server tool already resolved by provider");
                continue;
            }

            let (content, is_error) = match self.registry.handler(&request.name) {
                Some(handler) => match handler.call(request.input.clone()).await {
                    Ok(content) => (content, false),
                    Err(e) => {
                        warn!(tool = %request.name, error = %e, "tool handler failed");
                        (
                            ToolResultContent::String(format!(
                                "tool '{}' failed: {e}",
                                request.name
                            )),
                            true,
                        )
                    }
                },
                None => {
                    warn!(tool = %request.name, "no handler registered");
                    (
                        ToolResultContent::String(format!(
                            "no handler registered for tool '{}'",
                            request.name
                        )),
                        true,
                    )
                }
            };

            results.push(ContentBlockParam::ToolResult {
                tool_use_id: request.id,
                content: Some(content),
                is_error: is_error.then_some(true),
                cache_control: None,
            });
        }
        results
    }
}

impl<C: Config> std::fmt::Debug for ToolRunner<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRunner")
            .field("iterations", &self.iterations)
            .field("max_iterations", &self.max_iterations)
            .field("mode", &self.mode)
            .field("messages", &self.request.messages.len())
            .finish_non_exhaustive()
    }
}
