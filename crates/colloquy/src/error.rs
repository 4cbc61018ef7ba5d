use thiserror::Error;

/// Errors produced by the client, the stream decoder, and the tool runner.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: connection, timeout, TLS, body read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API returned a structured error response.
    #[error("api error: {0}")]
    Api(ApiError),

    /// The client was misconfigured (bad credentials, invalid parameters).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A frame or payload could not be decoded.
    ///
    /// Only surfaced when the decoder runs in strict mode or when a buffered
    /// tool-input payload turns out to be unparseable at finalization. In
    /// lenient mode malformed records are dropped instead.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Structured error object returned by the API.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code, if the error originated from a response.
    pub status: Option<u16>,
    /// Machine-readable error type (e.g. `overloaded_error`).
    pub kind: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Request id echoed by the server, when present.
    pub request_id: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "{status} ")?;
        }
        if let Some(kind) = &self.kind {
            write!(f, "[{kind}] ")?;
        }
        write!(f, "{}", self.message)
    }
}

#[derive(serde::Deserialize)]
struct WireError {
    error: WireErrorBody,
    #[serde(default)]
    request_id: Option<String>,
}

#[derive(serde::Deserialize)]
struct WireErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: String,
}

/// Builds an [`Error::Api`] from a non-2xx response body.
///
/// Falls back to the raw body text when the error envelope cannot be parsed.
pub(crate) fn deserialize_api_error(status: reqwest::StatusCode, bytes: &[u8]) -> Error {
    match serde_json::from_slice::<WireError>(bytes) {
        Ok(wire) => Error::Api(ApiError {
            status: Some(status.as_u16()),
            kind: wire.error.kind,
            message: wire.error.message,
            request_id: wire.request_id,
        }),
        Err(_) => Error::Api(ApiError {
            status: Some(status.as_u16()),
            kind: None,
            message: String::from_utf8_lossy(bytes).into_owned(),
            request_id: None,
        }),
    }
}

/// Maps a body deserialization failure to [`Error::Decode`] with context.
pub(crate) fn map_deser(err: &serde_json::Error, bytes: &[u8]) -> Error {
    let preview: String = String::from_utf8_lossy(bytes).chars().take(256).collect();
    Error::Decode(format!("response body: {err} (body starts: {preview:?})"))
}
