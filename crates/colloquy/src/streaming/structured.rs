//! Opportunistic structured-output parsing on top of the accumulator.

use serde::de::DeserializeOwned;

use crate::error::Error;
use crate::streaming::accumulator::MessageAccumulator;
use crate::streaming::events::{BlockDelta, StreamEvent};
use crate::types::messages::Message;

/// Accumulator overlay that re-parses streaming text against a target type.
///
/// After every text delta the affected block's buffered text is tried against
/// `T`; a parse failure just means "not yet parseable" and is retried on the
/// next delta. Canonical accumulation is untouched; this only attaches
/// snapshots. Pair with a request whose `output_format` constrains the model
/// to JSON matching `T`.
///
/// ```no_run
/// # use colloquy::streaming::{StructuredAccumulator, StreamEvent};
/// # #[derive(serde::Deserialize)]
/// # struct Review { rating: f32 }
/// # fn demo(events: Vec<StreamEvent>) -> Result<(), colloquy::Error> {
/// let mut acc = StructuredAccumulator::<Review>::new();
/// for event in &events {
///     if let Some(review) = acc.apply(event)? {
///         println!("parses so far: {}", review.rating);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StructuredAccumulator<T> {
    inner: MessageAccumulator,
    parsed: Option<T>,
}

impl<T: DeserializeOwned> Default for StructuredAccumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> StructuredAccumulator<T> {
    /// Creates an empty overlay.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MessageAccumulator::new(),
            parsed: None,
        }
    }

    /// Applies one event, returning a parsed snapshot when this event's text
    /// delta made its block parse as `T`.
    ///
    /// Non-text events and not-yet-parseable text yield `None`; errors are
    /// exactly those of [`MessageAccumulator::apply`].
    pub fn apply(&mut self, event: &StreamEvent) -> Result<Option<&T>, Error> {
        self.inner.apply(event)?;

        if let StreamEvent::ContentBlockDelta {
            index,
            delta: BlockDelta::TextDelta { .. },
        } = event
            && let Some(text) = self.inner.block_text(*index)
            && let Ok(value) = serde_json::from_str::<T>(text)
        {
            self.parsed = Some(value);
            return Ok(self.parsed.as_ref());
        }
        Ok(None)
    }

    /// The most recent successful parse, if any.
    #[must_use]
    pub fn parsed(&self) -> Option<&T> {
        self.parsed.as_ref()
    }

    /// The finalized message, once `message_stop` has been observed.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        self.inner.message()
    }

    /// The wrapped accumulator.
    #[must_use]
    pub fn inner(&self) -> &MessageAccumulator {
        &self.inner
    }
}
