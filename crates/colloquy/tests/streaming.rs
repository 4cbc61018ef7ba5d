//! End-to-end streaming tests: SSE bytes served over HTTP, reconstructed
//! into complete messages.

use colloquy::streaming::{BlockDelta, BlockStart, DecodeMode, MessageAccumulator, Phase, StreamEvent};
use colloquy::types::common::StopReason;
use colloquy::types::content::ContentBlock;
use colloquy::{ApiConfig, Client, Error};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sse_record(event: &str, data: &str) -> String {
    format!("event: {event}\ndata: {data}\n\n")
}

fn text_turn_body() -> String {
    [
        sse_record(
            "message_start",
            r#"{"type":"message_start","message":{"id":"msg_1","type":"message","role":"assistant","model":"claude-sonnet-4-5","content":[],"stop_reason":null,"stop_sequence":null,"usage":{"input_tokens":10,"output_tokens":1}}}"#,
        ),
        sse_record(
            "content_block_start",
            r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
        ),
        sse_record(
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
        ),
        sse_record(
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":", world"}}"#,
        ),
        sse_record(
            "content_block_stop",
            r#"{"type":"content_block_stop","index":0}"#,
        ),
        sse_record(
            "message_delta",
            r#"{"type":"message_delta","delta":{"stop_reason":"end_turn","stop_sequence":null},"usage":{"output_tokens":4}}"#,
        ),
        sse_record("message_stop", r#"{"type":"message_stop"}"#),
    ]
    .concat()
}

async fn client_for(server: &MockServer) -> Client<ApiConfig> {
    let cfg = ApiConfig::new()
        .with_base_url(server.uri())
        .with_api_key("test");
    Client::with_config(cfg)
}

async fn mount_sse(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

fn request() -> colloquy::types::MessagesCreateRequest {
    colloquy::types::MessagesCreateRequest {
        model: "claude-sonnet-4-5".into(),
        max_tokens: 64,
        messages: vec![colloquy::types::MessageParam::user("hi")],
        ..Default::default()
    }
}

#[tokio::test]
async fn text_turn_reconstructed() {
    let server = MockServer::start().await;
    mount_sse(&server, text_turn_body()).await;
    let client = client_for(&server).await;

    let mut stream = client.messages().create_stream(request()).await.unwrap();
    let message = stream.final_message().await.unwrap();

    assert_eq!(message.id, "msg_1");
    assert_eq!(message.text(), "Hello, world");
    assert_eq!(message.stop_reason, Some(StopReason::EndTurn));
    let usage = message.usage.clone().unwrap();
    assert_eq!(usage.input_tokens, Some(10));
    assert_eq!(usage.output_tokens, Some(4));

    // Idempotent drain: no further network reads, equal value.
    let again = stream.final_message().await.unwrap();
    assert_eq!(message, again);
}

#[tokio::test]
async fn tool_use_input_assembled_from_json_deltas() {
    let body = [
        sse_record(
            "message_start",
            r#"{"type":"message_start","message":{"id":"msg_2","type":"message","role":"assistant","model":"m","content":[],"usage":{"input_tokens":3,"output_tokens":1}}}"#,
        ),
        sse_record(
            "content_block_start",
            r#"{"type":"content_block_start","index":0,"content_block":{"type":"tool_use","id":"toolu_1","name":"get_weather","input":{}}}"#,
        ),
        sse_record(
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"{\"city\":"}}"#,
        ),
        sse_record(
            "content_block_delta",
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"\"Paris\"}"}}"#,
        ),
        sse_record(
            "content_block_stop",
            r#"{"type":"content_block_stop","index":0}"#,
        ),
        sse_record(
            "message_delta",
            r#"{"type":"message_delta","delta":{"stop_reason":"tool_use"},"usage":{"output_tokens":9}}"#,
        ),
        sse_record("message_stop", r#"{"type":"message_stop"}"#),
    ]
    .concat();

    let server = MockServer::start().await;
    mount_sse(&server, body).await;
    let client = client_for(&server).await;

    let mut stream = client.messages().create_stream(request()).await.unwrap();
    let message = stream.final_message().await.unwrap();

    assert_eq!(message.stop_reason, Some(StopReason::ToolUse));
    match &message.content[0] {
        ContentBlock::ToolUse { id, name, input } => {
            assert_eq!(id, "toolu_1");
            assert_eq!(name, "get_weather");
            assert_eq!(input["city"], "Paris");
        }
        other => panic!("expected ToolUse block, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_record_dropped_by_default() {
    let mut body = text_turn_body();
    // Inject a record with an unparseable payload before message_stop.
    body = body.replace(
        "event: message_stop",
        "event: message_delta\ndata: {broken json\n\nevent: message_stop",
    );

    let server = MockServer::start().await;
    mount_sse(&server, body).await;
    let client = client_for(&server).await;

    let mut stream = client.messages().create_stream(request()).await.unwrap();
    let message = stream.final_message().await.unwrap();
    assert_eq!(message.text(), "Hello, world");
}

#[tokio::test]
async fn malformed_record_surfaced_in_strict_mode() {
    let mut body = text_turn_body();
    body = body.replace(
        "event: message_stop",
        "event: message_delta\ndata: {broken json\n\nevent: message_stop",
    );

    let server = MockServer::start().await;
    mount_sse(&server, body).await;
    let client = client_for(&server).await;

    let mut stream = client
        .messages()
        .create_stream_with(request(), DecodeMode::Strict)
        .await
        .unwrap();

    let mut saw_decode_error = false;
    while let Some(item) = stream.next_event().await {
        if let Err(Error::Decode(_)) = item {
            saw_decode_error = true;
        }
    }
    assert!(saw_decode_error, "strict mode should surface the bad record");
    // The error is recoverable: the stream still finalized.
    assert!(stream.is_final());
    assert_eq!(stream.finalize_now().text(), "Hello, world");
}

#[tokio::test]
async fn done_sentinel_ends_stream_cleanly() {
    let body = format!("{}data: [DONE]\n\n", text_turn_body());

    let server = MockServer::start().await;
    mount_sse(&server, body).await;
    let client = client_for(&server).await;

    let mut stream = client.messages().create_stream(request()).await.unwrap();
    let message = stream.final_message().await.unwrap();
    assert_eq!(message.text(), "Hello, world");
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn provider_error_event_surfaces() {
    let body = [
        sse_record(
            "message_start",
            r#"{"type":"message_start","message":{"id":"msg_3","type":"message","role":"assistant","model":"m","content":[],"usage":{"input_tokens":1,"output_tokens":1}}}"#,
        ),
        sse_record(
            "error",
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        ),
    ]
    .concat();

    let server = MockServer::start().await;
    mount_sse(&server, body).await;
    let client = client_for(&server).await;

    let mut stream = client.messages().create_stream(request()).await.unwrap();
    let err = stream.final_message().await.unwrap_err();
    match err {
        Error::Api(api) => assert_eq!(api.message, "Overloaded"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

// =============================================================================
// Accumulator behavior through the public event types
// =============================================================================

fn start_event() -> StreamEvent {
    serde_json::from_str(
        r#"{"type":"message_start","message":{"id":"msg_a","type":"message","role":"assistant","model":"m","content":[],"usage":{"input_tokens":20,"output_tokens":1,"cache_read_input_tokens":8}}}"#,
    )
    .unwrap()
}

#[test]
fn phases_progress_in_order() {
    let mut acc = MessageAccumulator::new();
    assert_eq!(acc.phase(), Phase::Empty);

    acc.apply(&start_event()).unwrap();
    assert_eq!(acc.phase(), Phase::Started);

    acc.apply(&StreamEvent::ContentBlockStart {
        index: 0,
        content_block: BlockStart::Text {
            text: String::new(),
        },
    })
    .unwrap();
    assert_eq!(acc.phase(), Phase::Building);

    acc.apply(&StreamEvent::MessageStop).unwrap();
    assert_eq!(acc.phase(), Phase::Finalized);
    assert!(acc.is_final());
}

#[test]
fn usage_merge_precedence() {
    let mut acc = MessageAccumulator::new();
    acc.apply(&start_event()).unwrap();

    // Two message_deltas; output_tokens takes the last value, input_tokens
    // keeps the message_start seed because no delta overrides it.
    let d1: StreamEvent = serde_json::from_str(
        r#"{"type":"message_delta","delta":{},"usage":{"output_tokens":2}}"#,
    )
    .unwrap();
    let d2: StreamEvent = serde_json::from_str(
        r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":7,"server_tool_use":{"web_search_requests":1}}}"#,
    )
    .unwrap();
    acc.apply(&d1).unwrap();
    acc.apply(&d2).unwrap();
    acc.apply(&StreamEvent::MessageStop).unwrap();

    let usage = acc.message().unwrap().usage.clone().unwrap();
    assert_eq!(usage.input_tokens, Some(20));
    assert_eq!(usage.cache_read_input_tokens, Some(8));
    assert_eq!(usage.output_tokens, Some(7));
    assert_eq!(
        usage.server_tool_use.unwrap().web_search_requests,
        Some(1)
    );
}

#[test]
fn explicit_input_token_override() {
    let mut acc = MessageAccumulator::new();
    acc.apply(&start_event()).unwrap();

    let d: StreamEvent = serde_json::from_str(
        r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"},"usage":{"output_tokens":3,"input_tokens":25}}"#,
    )
    .unwrap();
    acc.apply(&d).unwrap();
    acc.apply(&StreamEvent::MessageStop).unwrap();

    let usage = acc.message().unwrap().usage.clone().unwrap();
    assert_eq!(usage.input_tokens, Some(25));
}

#[test]
fn delta_concatenation_exact() {
    let mut acc = MessageAccumulator::new();
    acc.apply(&start_event()).unwrap();
    acc.apply(&StreamEvent::ContentBlockStart {
        index: 0,
        content_block: BlockStart::Text {
            text: String::new(),
        },
    })
    .unwrap();

    let pieces = ["a", "βγ", " ", "🦀", "end"];
    for piece in pieces {
        acc.apply(&StreamEvent::ContentBlockDelta {
            index: 0,
            delta: BlockDelta::TextDelta {
                text: piece.to_string(),
            },
        })
        .unwrap();
    }
    acc.apply(&StreamEvent::ContentBlockStop { index: 0 }).unwrap();
    acc.apply(&StreamEvent::MessageStop).unwrap();

    assert_eq!(acc.message().unwrap().text(), pieces.concat());
}

#[test]
fn ordering_anomalies_ignored_defensively() {
    let mut acc = MessageAccumulator::new();
    acc.apply(&start_event()).unwrap();
    acc.apply(&StreamEvent::ContentBlockStart {
        index: 0,
        content_block: BlockStart::Text {
            text: String::new(),
        },
    })
    .unwrap();

    // Delta naming an unknown block: ignored, never a crash.
    acc.apply(&StreamEvent::ContentBlockDelta {
        index: 5,
        delta: BlockDelta::TextDelta {
            text: "lost".to_string(),
        },
    })
    .unwrap();

    // Start whose index skips ahead: ignored.
    acc.apply(&StreamEvent::ContentBlockStart {
        index: 3,
        content_block: BlockStart::Text {
            text: String::new(),
        },
    })
    .unwrap();

    acc.apply(&StreamEvent::ContentBlockDelta {
        index: 0,
        delta: BlockDelta::TextDelta {
            text: "kept".to_string(),
        },
    })
    .unwrap();
    acc.apply(&StreamEvent::MessageStop).unwrap();

    let message = acc.message().unwrap();
    assert_eq!(message.content.len(), 1);
    assert_eq!(message.text(), "kept");
}

#[test]
fn thinking_blocks_accumulate() {
    let mut acc = MessageAccumulator::new();
    acc.apply(&start_event()).unwrap();
    acc.apply(&StreamEvent::ContentBlockStart {
        index: 0,
        content_block: BlockStart::Thinking {
            thinking: String::new(),
        },
    })
    .unwrap();
    acc.apply(&StreamEvent::ContentBlockDelta {
        index: 0,
        delta: BlockDelta::ThinkingDelta {
            thinking: "step one".to_string(),
        },
    })
    .unwrap();
    acc.apply(&StreamEvent::ContentBlockDelta {
        index: 0,
        delta: BlockDelta::SignatureDelta {
            signature: "sig".to_string(),
        },
    })
    .unwrap();
    acc.apply(&StreamEvent::MessageStop).unwrap();

    match &acc.message().unwrap().content[0] {
        ContentBlock::Thinking {
            thinking,
            signature,
        } => {
            assert_eq!(thinking, "step one");
            assert_eq!(signature, "sig");
        }
        other => panic!("expected Thinking block, got {other:?}"),
    }
}
