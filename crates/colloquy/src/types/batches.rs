use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::messages::{Message, MessagesCreateRequest};

/// Processing state of a message batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Requests are still being processed.
    InProgress,
    /// Cancellation was requested and is draining.
    Canceling,
    /// All requests reached a terminal state.
    Ended,
}

/// Per-outcome request counts for a batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RequestCounts {
    /// Requests still in flight.
    pub processing: u64,
    /// Requests that produced a message.
    pub succeeded: u64,
    /// Requests that failed.
    pub errored: u64,
    /// Requests canceled before completion.
    pub canceled: u64,
    /// Requests that expired before processing.
    pub expired: u64,
}

/// A message batch object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageBatch {
    /// Batch id.
    pub id: String,
    /// Object type, always `"message_batch"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Current processing state.
    pub processing_status: ProcessingStatus,
    /// Per-outcome request counts.
    pub request_counts: RequestCounts,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When processing finished, if it has.
    pub ended_at: Option<DateTime<Utc>>,
    /// When unprocessed requests expire.
    pub expires_at: DateTime<Utc>,
    /// Where to download newline-delimited results once ended.
    pub results_url: Option<String>,
}

/// One request within a batch creation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchRequest {
    /// Caller-chosen id correlating the result entry.
    pub custom_id: String,
    /// The message creation parameters.
    pub params: MessagesCreateRequest,
}

/// Request to create a message batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageBatchCreateRequest {
    /// The batched requests.
    pub requests: Vec<BatchRequest>,
}

/// Terminal outcome of one batched request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchResult {
    /// The request produced a message.
    Succeeded {
        /// The generated turn.
        message: Message,
    },
    /// The request failed.
    Errored {
        /// The error envelope as returned by the API.
        error: serde_json::Value,
    },
    /// The request was canceled.
    Canceled,
    /// The request expired before processing.
    Expired,
}

/// One line of a batch results download.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchResultEntry {
    /// The caller-chosen id from the originating request.
    pub custom_id: String,
    /// The terminal outcome.
    pub result: BatchResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_entry_de_succeeded() {
        let line = r#"{"custom_id":"req-1","result":{"type":"succeeded","message":{"id":"msg_1","type":"message","role":"assistant","model":"claude-sonnet-4-5","content":[{"type":"text","text":"ok"}],"stop_reason":"end_turn"}}}"#;
        let entry: BatchResultEntry = serde_json::from_str(line).unwrap();
        assert_eq!(entry.custom_id, "req-1");
        match entry.result {
            BatchResult::Succeeded { message } => assert_eq!(message.text(), "ok"),
            other => panic!("expected Succeeded, got {other:?}"),
        }
    }

    #[test]
    fn result_entry_de_errored() {
        let line = r#"{"custom_id":"req-2","result":{"type":"errored","error":{"type":"invalid_request_error","message":"bad"}}}"#;
        let entry: BatchResultEntry = serde_json::from_str(line).unwrap();
        assert!(matches!(entry.result, BatchResult::Errored { .. }));
    }

    #[test]
    fn batch_de() {
        let json = r#"{
            "id": "msgbatch_1",
            "type": "message_batch",
            "processing_status": "ended",
            "request_counts": {"processing":0,"succeeded":2,"errored":0,"canceled":0,"expired":0},
            "created_at": "2024-09-24T18:37:24.100435Z",
            "ended_at": "2024-09-24T18:44:22.100435Z",
            "expires_at": "2024-09-25T18:37:24.100435Z",
            "results_url": "https://api.anthropic.com/v1/messages/batches/msgbatch_1/results"
        }"#;
        let batch: MessageBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.processing_status, ProcessingStatus::Ended);
        assert_eq!(batch.request_counts.succeeded, 2);
        assert!(batch.results_url.is_some());
    }
}
