//! Stream a turn and watch it assemble.
//!
//! ```sh
//! ANTHROPIC_API_KEY=... cargo run --example streaming
//! ```

use std::io::Write;

use colloquy::types::{MessageParam, MessagesCreateRequest};
use colloquy::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    let req = MessagesCreateRequest {
        model: "claude-sonnet-4-5".into(),
        max_tokens: 512,
        messages: vec![MessageParam::user(
            "Write a haiku about reassembling a stream from fragments.",
        )],
        ..Default::default()
    };

    let mut stream = client.messages().create_stream(req).await?;

    while let Some(event) = stream.next_event().await {
        event?;
        print!("\x1b[2K\r{}", stream.partial_text().replace('\n', " / "));
        std::io::stdout().flush()?;
    }

    let message = stream.final_message().await?;
    println!("\n\nstop_reason: {:?}", message.stop_reason);
    if let Some(usage) = &message.usage {
        println!(
            "tokens: {:?} in / {:?} out",
            usage.input_tokens, usage.output_tokens
        );
    }
    Ok(())
}
