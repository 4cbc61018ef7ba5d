//! Tool execution loop behavior against a scripted HTTP double.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colloquy::agent::{RunOutcome, StepOutcome, ToolRegistry, ToolRunner};
use colloquy::types::{
    ContentBlockParam, MessageContentParam, MessageParam, MessageRole, MessagesCreateRequest, Tool,
    ToolResultContent,
};
use colloquy::{ApiConfig, Client};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client<ApiConfig> {
    let cfg = ApiConfig::new()
        .with_base_url(server.uri())
        .with_api_key("test");
    Client::with_config(cfg)
}

fn request() -> MessagesCreateRequest {
    MessagesCreateRequest {
        model: "claude-sonnet-4-5".into(),
        max_tokens: 128,
        messages: vec![MessageParam::user("run the tool")],
        ..Default::default()
    }
}

fn echo_tool() -> Tool {
    Tool::new(
        "echo",
        "Echoes its input back",
        json!({"type": "object", "properties": {"x": {"type": "integer"}}}),
    )
}

fn tool_use_response(tool: &str, input: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "msg_tool",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-5",
        "content": [
            {"type": "text", "text": "Let me check."},
            {"type": "tool_use", "id": "toolu_1", "name": tool, "input": input}
        ],
        "stop_reason": "tool_use",
        "usage": {"input_tokens": 5, "output_tokens": 7}
    })
}

fn end_turn_response(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_final",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-5",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 9, "output_tokens": 3}
    })
}

/// Mounts a double whose n-th response is picked from `bodies` (the last one
/// repeats), counting requests.
async fn mount_script(
    server: &MockServer,
    bodies: Vec<serde_json::Value>,
    counter: Arc<AtomicUsize>,
) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(move |_req: &wiremock::Request| {
            let i = counter.fetch_add(1, Ordering::SeqCst);
            let body = bodies.get(i).unwrap_or_else(|| {
                bodies.last().expect("at least one scripted body")
            });
            ResponseTemplate::new(200).set_body_json(body)
        })
        .mount(server)
        .await;
}

#[tokio::test]
async fn echo_roundtrip_feeds_result_back() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    mount_script(
        &server,
        vec![
            tool_use_response("echo", json!({"x": 1})),
            end_turn_response("The tool said x=1."),
        ],
        calls.clone(),
    )
    .await;

    let handled = Arc::new(AtomicUsize::new(0));
    let handled_in = handled.clone();
    let registry = ToolRegistry::new().register_fn(echo_tool(), move |input| {
        let handled = handled_in.clone();
        async move {
            handled.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResultContent::String(input.to_string()))
        }
    });

    let client = client_for(&server);
    let mut runner = ToolRunner::new(&client, registry, request());
    let outcome = runner.run().await.unwrap();

    match outcome {
        RunOutcome::Complete(message) => assert_eq!(message.text(), "The tool said x=1."),
        other => panic!("expected Complete, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(handled.load(Ordering::SeqCst), 1);

    // Transcript: user, assistant(tool_use), user(tool_result), assistant.
    let messages = runner.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, MessageRole::User);
    let MessageContentParam::Blocks(blocks) = &messages[2].content else {
        panic!("tool results must be a block list");
    };
    assert_eq!(blocks.len(), 1);
    match &blocks[0] {
        ContentBlockParam::ToolResult {
            tool_use_id,
            content,
            is_error,
            ..
        } => {
            assert_eq!(tool_use_id, "toolu_1");
            assert_eq!(
                content,
                &Some(ToolResultContent::String(r#"{"x":1}"#.into()))
            );
            assert_eq!(is_error, &None);
        }
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[tokio::test]
async fn loop_stops_at_exactly_max_iterations() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    mount_script(
        &server,
        vec![tool_use_response("echo", json!({"x": 1}))],
        calls.clone(),
    )
    .await;

    let registry = ToolRegistry::new().register_fn(echo_tool(), |input| async move {
        Ok(ToolResultContent::String(input.to_string()))
    });

    let client = client_for(&server);
    let mut runner = ToolRunner::new(&client, registry, request()).with_max_iterations(3);
    let outcome = runner.run().await.unwrap();

    assert_eq!(outcome, RunOutcome::IterationsExhausted { iterations: 3 });
    assert_eq!(calls.load(Ordering::SeqCst), 3, "never more than the cap");
}

#[tokio::test]
async fn missing_handler_becomes_error_result() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    mount_script(
        &server,
        vec![
            tool_use_response("mystery", json!({})),
            end_turn_response("ok"),
        ],
        calls.clone(),
    )
    .await;

    let client = client_for(&server);
    // Registry advertises echo only; "mystery" has no handler.
    let registry = ToolRegistry::new().advertise(echo_tool());
    let mut runner = ToolRunner::new(&client, registry, request());
    let outcome = runner.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Complete(_)));
    let MessageContentParam::Blocks(blocks) = &runner.messages()[2].content else {
        panic!("tool results must be a block list");
    };
    match &blocks[0] {
        ContentBlockParam::ToolResult {
            is_error, content, ..
        } => {
            assert_eq!(is_error, &Some(true));
            match content {
                Some(ToolResultContent::String(s)) => {
                    assert!(s.contains("no handler registered"));
                    assert!(s.contains("mystery"));
                }
                other => panic!("expected string content, got {other:?}"),
            }
        }
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[tokio::test]
async fn handler_failure_becomes_error_result_and_loop_survives() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    mount_script(
        &server,
        vec![
            tool_use_response("echo", json!({"x": 1})),
            end_turn_response("recovered"),
        ],
        calls.clone(),
    )
    .await;

    let registry = ToolRegistry::new().register_fn(echo_tool(), |_input| async move {
        Err("disk on fire".into())
    });

    let client = client_for(&server);
    let mut runner = ToolRunner::new(&client, registry, request());
    let outcome = runner.run().await.unwrap();

    match outcome {
        RunOutcome::Complete(message) => assert_eq!(message.text(), "recovered"),
        other => panic!("expected Complete, got {other:?}"),
    }
    let MessageContentParam::Blocks(blocks) = &runner.messages()[2].content else {
        panic!("tool results must be a block list");
    };
    match &blocks[0] {
        ContentBlockParam::ToolResult {
            is_error, content, ..
        } => {
            assert_eq!(is_error, &Some(true));
            match content {
                Some(ToolResultContent::String(s)) => assert!(s.contains("disk on fire")),
                other => panic!("expected string content, got {other:?}"),
            }
        }
        other => panic!("expected ToolResult, got {other:?}"),
    }
}

#[tokio::test]
async fn server_tools_pass_through_without_dispatch() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    let body = json!({
        "id": "msg_srv",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-5",
        "content": [
            {"type": "server_tool_use", "id": "srvtoolu_1", "name": "web_search",
             "input": {"query": "weather"}},
            {"type": "text", "text": "Search done."}
        ],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 5, "output_tokens": 9,
                  "server_tool_use": {"web_search_requests": 1}}
    });
    mount_script(&server, vec![body], calls.clone()).await;

    let handled = Arc::new(AtomicUsize::new(0));
    let handled_in = handled.clone();
    let registry = ToolRegistry::new().register_fn(echo_tool(), move |input| {
        let handled = handled_in.clone();
        async move {
            handled.fetch_add(1, Ordering::SeqCst);
            Ok(ToolResultContent::String(input.to_string()))
        }
    });

    let client = client_for(&server);
    let mut runner = ToolRunner::new(&client, registry, request());
    let outcome = runner.run().await.unwrap();

    assert!(matches!(outcome, RunOutcome::Complete(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "ends on first iteration");
    assert_eq!(handled.load(Ordering::SeqCst), 0, "no local dispatch");
    // No tool-result user message was synthesized for server tools.
    assert_eq!(runner.messages().len(), 2);
}

#[tokio::test]
async fn turns_stream_yields_each_assistant_turn() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));
    mount_script(
        &server,
        vec![
            tool_use_response("echo", json!({"x": 1})),
            end_turn_response("done"),
        ],
        calls.clone(),
    )
    .await;

    let registry = ToolRegistry::new().register_fn(echo_tool(), |input| async move {
        Ok(ToolResultContent::String(input.to_string()))
    });

    let client = client_for(&server);
    let runner = ToolRunner::new(&client, registry, request());

    let outcomes: Vec<StepOutcome> = runner
        .turns()
        .map(|item| item.unwrap())
        .collect::<Vec<_>>()
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(&outcomes[0], StepOutcome::Continue(m) if m.text() == "Let me check."));
    assert!(matches!(&outcomes[1], StepOutcome::Complete(m) if m.text() == "done"));
}

#[tokio::test]
async fn registry_tools_are_advertised() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicUsize::new(0));

    let saw_tools = Arc::new(AtomicUsize::new(0));
    let saw_tools_in = saw_tools.clone();
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(move |req: &wiremock::Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            if body["tools"][0]["name"] == "echo" {
                saw_tools_in.fetch_add(1, Ordering::SeqCst);
            }
            ResponseTemplate::new(200).set_body_json(end_turn_response("hi"))
        })
        .mount(&server)
        .await;

    let registry = ToolRegistry::new().register_fn(echo_tool(), |input| async move {
        Ok(ToolResultContent::String(input.to_string()))
    });

    let client = client_for(&server);
    let mut runner = ToolRunner::new(&client, registry, request());
    runner.run().await.unwrap();

    assert_eq!(saw_tools.load(Ordering::SeqCst), 1);
}
