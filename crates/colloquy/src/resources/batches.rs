//! Message batches: submit many requests at once, download results as
//! newline-delimited JSON.
//!
//! The results download applies the same cross-chunk line-buffering
//! discipline as the SSE decoder, minus event-type framing: a line is only
//! decoded once its terminating newline has arrived, each line parses
//! independently, and malformed lines follow the configured [`DecodeMode`].

use std::pin::Pin;

use futures::{Stream, StreamExt};
use tracing::warn;

use crate::{
    client::Client,
    config::Config,
    error::Error,
    sse::LineBuffer,
    streaming::DecodeMode,
    types::batches::{BatchResultEntry, MessageBatch, MessageBatchCreateRequest},
};

/// Lazy stream of per-request batch results.
pub type BatchResultStream =
    Pin<Box<dyn Stream<Item = Result<BatchResultEntry, Error>> + Send + 'static>>;

struct ResultState {
    bytes: futures::stream::BoxStream<'static, reqwest::Result<bytes::Bytes>>,
    lines: LineBuffer,
    pending: std::collections::VecDeque<String>,
    mode: DecodeMode,
    eof: bool,
    finished: bool,
}

fn parse_line(line: &str, mode: DecodeMode) -> Option<Result<BatchResultEntry, Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(entry) => Some(Ok(entry)),
        Err(e) => match mode {
            DecodeMode::Lenient => {
                warn!(error = %e, "dropping malformed batch result line");
                None
            }
            DecodeMode::Strict => Some(Err(Error::Decode(format!("batch result line: {e}")))),
        },
    }
}

/// Adapts a results download into a [`BatchResultStream`].
#[must_use]
#[allow(unused_assignments)]
pub fn result_stream_from_response(
    response: reqwest::Response,
    mode: DecodeMode,
) -> BatchResultStream {
    let state = ResultState {
        bytes: response.bytes_stream().boxed(),
        lines: LineBuffer::default(),
        pending: std::collections::VecDeque::new(),
        mode,
        eof: false,
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            while let Some(line) = st.pending.pop_front() {
                if let Some(item) = parse_line(&line, st.mode) {
                    return Some((item, st));
                }
            }

            if st.eof {
                st.finished = true;
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    st.lines.push(&chunk);
                    while let Some(line) = st.lines.next_line() {
                        st.pending.push_back(line);
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(Error::Transport(e)), st));
                }
                None => {
                    st.eof = true;
                    if let Some(rest) = st.lines.take_remainder() {
                        st.pending.push_back(rest);
                    }
                }
            }
        }
    }))
}

/// API resource for the `/v1/messages/batches` endpoints.
pub struct Batches<'c, C: Config> {
    client: &'c Client<C>,
}

impl<'c, C: Config> Batches<'c, C> {
    /// Creates a new Batches resource.
    #[must_use]
    pub const fn new(client: &'c Client<C>) -> Self {
        Self { client }
    }

    /// Submits a batch of message creation requests.
    pub async fn create(&self, req: MessageBatchCreateRequest) -> Result<MessageBatch, Error> {
        self.client.post("/v1/messages/batches", req).await
    }

    /// Retrieves a batch by id.
    pub async fn get(&self, batch_id: &str) -> Result<MessageBatch, Error> {
        self.client
            .get(&format!("/v1/messages/batches/{batch_id}"))
            .await
    }

    /// Streams the results of an ended batch, with lenient decoding.
    pub async fn results(&self, batch: &MessageBatch) -> Result<BatchResultStream, Error> {
        self.results_with(batch, DecodeMode::default()).await
    }

    /// Streams batch results with an explicit [`DecodeMode`].
    pub async fn results_with(
        &self,
        batch: &MessageBatch,
        mode: DecodeMode,
    ) -> Result<BatchResultStream, Error> {
        let url = batch.results_url.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "batch {} has no results_url (processing_status: {:?})",
                batch.id, batch.processing_status
            ))
        })?;
        let response = self.client.get_stream(url).await?;
        Ok(result_stream_from_response(response, mode))
    }
}

impl<C: Config> Client<C> {
    /// Returns the Batches API resource.
    #[must_use]
    pub const fn batches(&self) -> Batches<'_, C> {
        Batches::new(self)
    }
}
