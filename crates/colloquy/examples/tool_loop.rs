//! Run a small agentic conversation with one local tool.
//!
//! ```sh
//! ANTHROPIC_API_KEY=... cargo run --example tool_loop
//! ```

use colloquy::agent::{RunOutcome, ToolRegistry, ToolRunner};
use colloquy::types::{MessageParam, MessagesCreateRequest, Tool, ToolResultContent};
use colloquy::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    let registry = ToolRegistry::new().register_fn(
        Tool::new(
            "current_time",
            "Returns the current UTC time as an RFC 3339 string",
            serde_json::json!({"type": "object", "properties": {}}),
        ),
        |_input| async move {
            Ok(ToolResultContent::String(
                chrono::Utc::now().to_rfc3339(),
            ))
        },
    );

    let req = MessagesCreateRequest {
        model: "claude-sonnet-4-5".into(),
        max_tokens: 512,
        messages: vec![MessageParam::user(
            "What time is it right now? Use the tool, then answer in one sentence.",
        )],
        ..Default::default()
    };

    let mut runner = ToolRunner::new(&client, registry, req)
        .streamed()
        .with_max_iterations(5);

    match runner.run().await? {
        RunOutcome::Complete(message) => println!("{}", message.text()),
        RunOutcome::IterationsExhausted { iterations } => {
            eprintln!("model kept requesting tools for {iterations} turns; giving up");
        }
    }

    println!("({} messages in transcript)", runner.messages().len());
    Ok(())
}
