//! Streaming reconstruction: SSE bytes → typed events → a complete message.
//!
//! [`event_stream_from_response`] adapts a live HTTP response into a lazy,
//! single-pass [`EventStream`]. [`MessageStream`] couples that stream with a
//! [`MessageAccumulator`] so callers can watch events, read partial text, and
//! obtain the final message once `message_stop` arrives. Dropping a
//! [`MessageStream`] mid-flight drops the response body and closes the
//! underlying connection.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use tracing::warn;

use crate::error::Error;
use crate::sse::{SseDecoder, SseFrame};
use crate::types::messages::Message;

/// Event accumulation
pub mod accumulator;
/// Typed stream events and decoding
pub mod events;
/// Opportunistic structured-output parsing
pub mod structured;

pub use accumulator::{MessageAccumulator, Phase};
pub use events::{
    BlockDelta, BlockStart, DecodeMode, DeltaUsage, MessageDeltaBody, StreamError, StreamEvent,
};
pub use structured::StructuredAccumulator;

/// Lazy, single-pass stream of typed events for one turn.
///
/// Ends cleanly at EOF or on a `[DONE]` sentinel record. Reusing an
/// exhausted stream yields nothing.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send + 'static>>;

struct DecodeState {
    bytes: futures::stream::BoxStream<'static, reqwest::Result<bytes::Bytes>>,
    decoder: SseDecoder,
    pending: VecDeque<SseFrame>,
    mode: DecodeMode,
    eof: bool,
    finished: bool,
}

/// Adapts a streaming HTTP response into an [`EventStream`].
///
/// The stream owns the response; dropping it closes the connection. Frames
/// whose payload fails to decode are dropped in [`DecodeMode::Lenient`] and
/// yielded as recoverable [`Error::Decode`] items in [`DecodeMode::Strict`];
/// either way the stream stays alive.
#[must_use]
#[allow(unused_assignments)]
pub fn event_stream_from_response(response: reqwest::Response, mode: DecodeMode) -> EventStream {
    let state = DecodeState {
        bytes: response.bytes_stream().boxed(),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        mode,
        eof: false,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            while let Some(frame) = st.pending.pop_front() {
                if frame.is_done() {
                    st.finished = true;
                    return None;
                }
                match StreamEvent::from_frame(&frame) {
                    Ok(Some(event)) => return Some((Ok(event), st)),
                    // Unknown event type: skipped for forward compatibility.
                    Ok(None) => {}
                    Err(e) => match st.mode {
                        DecodeMode::Lenient => {
                            warn!(error = %e, "dropping malformed stream record");
                        }
                        DecodeMode::Strict => return Some((Err(e), st)),
                    },
                }
            }

            if st.eof {
                st.finished = true;
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    st.pending.extend(st.decoder.push(&chunk));
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(Error::Transport(e)), st));
                }
                None => {
                    st.eof = true;
                    if let Some(frame) = st.decoder.flush() {
                        st.pending.push_back(frame);
                    }
                }
            }
        }
    }))
}

/// A turn in flight: an event stream plus its accumulator.
///
/// One instance per request, driven by one consumer. Abandoning the stream
/// (dropping this value) releases the transport resource; a message is only
/// authoritative once [`is_final`](Self::is_final) is true.
pub struct MessageStream {
    events: EventStream,
    acc: MessageAccumulator,
    exhausted: bool,
}

impl MessageStream {
    /// Wraps an event stream with a fresh accumulator.
    #[must_use]
    pub fn new(events: EventStream) -> Self {
        Self {
            events,
            acc: MessageAccumulator::new(),
            exhausted: false,
        }
    }

    /// Pulls the next event, folding it into the accumulator first.
    ///
    /// Returns `None` once the underlying stream is exhausted. Provider
    /// error events and strict-mode decode failures surface as `Err` items.
    pub async fn next_event(&mut self) -> Option<Result<StreamEvent, Error>> {
        if self.exhausted {
            return None;
        }
        match self.events.next().await {
            Some(Ok(event)) => {
                if let Err(e) = self.acc.apply(&event) {
                    return Some(Err(e));
                }
                Some(Ok(event))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.exhausted = true;
                None
            }
        }
    }

    /// Drains the stream through `message_stop` and returns the final turn.
    ///
    /// Idempotent: once finalized, repeated calls return the cached message
    /// without touching the network. A stream that ends without
    /// `message_stop` is an error; [`finalize_now`](Self::finalize_now)
    /// remains available for a best-effort read.
    pub async fn final_message(&mut self) -> Result<Message, Error> {
        loop {
            if let Some(message) = self.acc.message() {
                return Ok(message.clone());
            }
            match self.next_event().await {
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(Error::Decode(
                        "stream ended before message_stop".to_string(),
                    ));
                }
            }
        }
    }

    /// Whether `message_stop` has been observed.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.acc.is_final()
    }

    /// Text accumulated so far; best-effort until final.
    #[must_use]
    pub fn partial_text(&self) -> String {
        self.acc.partial_text()
    }

    /// Synthesizes a best-effort message from current state without waiting
    /// for `message_stop`. See [`MessageAccumulator::finalize_now`].
    #[must_use]
    pub fn finalize_now(&mut self) -> Message {
        self.acc.finalize_now()
    }

    /// The underlying accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &MessageAccumulator {
        &self.acc
    }
}

impl std::fmt::Debug for MessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStream")
            .field("phase", &self.acc.phase())
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
