//! Terminal chat with the AI assistant.

use astralens_chat::{ChatSession, HttpChatTransport};
use dialoguer::Input;

/// Reads questions until an empty line and prints the answers.
///
/// Rejections (busy, cooldown) are printed and the prompt repeats.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let transport = HttpChatTransport::from_env()?;
    println!("Asking {} (empty line to quit)", transport.endpoint());
    println!();

    let chat = ChatSession::new(transport);

    loop {
        let question: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        if question.trim().is_empty() {
            break;
        }

        match chat.ask(&question).await {
            Ok(reply) => println!("AI: {}\n", reply.text),
            Err(e) => println!("{e}\n"),
        }
    }

    log::debug!("Chat ended after {} messages", chat.history().len());
    Ok(())
}
