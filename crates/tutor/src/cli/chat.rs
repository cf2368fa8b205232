//! The `tutor chat` command: free-form conversation with the virtual consultant.

use super::{handle_interrupt, prompt_theme, spinner};
use clap::Args;
use console::Style;
use dialoguer::Input;
use std::sync::Arc;
use tutor_core::chat::{ChatMessage, ChatSession};
use tutor_core::{Config, GeminiBackend};

/// Arguments for the `chat` command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Send a single message, print the reply and exit
    #[arg(short, long)]
    pub message: Option<String>,
}

/// Execute the chat command.
pub async fn execute(args: ChatArgs, config: &Config) -> anyhow::Result<()> {
    let backend = GeminiBackend::from_config(&config.chat)?;
    let mut session = ChatSession::new(Arc::new(backend));

    if let Some(message) = args.message {
        if let Some(reply) = session.send(&message).await {
            print_reply(reply);
        }
        return Ok(());
    }

    super::print_header("virtual consultant");
    eprintln!("  Type /exit or press Ctrl+C to leave.");
    eprintln!();

    let theme = prompt_theme();
    loop {
        let line = handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("You")
                .allow_empty(true)
                .interact_text(),
        )?;
        let Some(line) = line else { break };
        if is_exit_command(&line) {
            break;
        }

        let progress = spinner("thinking");
        let reply = session.send(&line).await.cloned();
        progress.finish_and_clear();

        if let Some(reply) = reply {
            print_reply(&reply);
        }
    }

    tracing::debug!("Chat ended after {} messages", session.messages().len());
    Ok(())
}

fn is_exit_command(line: &str) -> bool {
    matches!(line.trim(), "/exit" | "/quit")
}

fn print_reply(reply: &ChatMessage) {
    let style = if reply.is_error {
        Style::new().red()
    } else {
        Style::new().cyan()
    };
    println!("{} {}", style.apply_to("Consultant ›"), reply.text);
    println!();
}
