//! Chat commands: an interactive session or a single question about a topic.

use anyhow::Result;
use colored::Colorize;
use dialoguer::Input;
use pulse_core::ai::GeminiClient;
use pulse_core::service::{ChatReply, model_turns};
use pulse_core::{ChatSession, PulseService};

use crate::config::Config;
use crate::context::{open_service, resolve_id};
use crate::render::{html_to_text, spinner};

/// Start an interactive chat. `/exit`, `/quit` or an empty line ends it.
pub async fn interactive(reference: &str, config: &Config) -> Result<()> {
    let mut service = open_service(config)?;
    let topic_id = resolve_id(service.workspace(), reference)?;
    let mut session = ChatSession::new(&topic_id);

    if let Some(topic) = service.workspace().tree().get(&topic_id) {
        println!(
            "{} {} {}",
            "Chatting about".cyan(),
            topic.title.cyan().bold(),
            format!("({} event(s))", topic.events.len()).dimmed()
        );
    }
    println!("{}", "Empty line or /exit to leave.".dimmed());

    loop {
        let line: String = Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();
        if line.is_empty() || line == "/exit" || line == "/quit" {
            break;
        }

        let reply = send(&mut service, &mut session, line).await?;
        print_reply(&reply);
    }

    println!(
        "{}",
        format!("Session ended after {} answer(s).", model_turns(session.transcript())).dimmed()
    );
    Ok(())
}

/// Ask one question and print the answer.
pub async fn ask(reference: &str, question: &str, config: &Config) -> Result<()> {
    let mut service = open_service(config)?;
    let topic_id = resolve_id(service.workspace(), reference)?;
    let mut session = ChatSession::new(&topic_id);

    let reply = send(&mut service, &mut session, question).await?;
    print_reply(&reply);
    if let Some(error) = reply.error {
        return Err(error.into());
    }
    Ok(())
}

async fn send(
    service: &mut PulseService<GeminiClient>,
    session: &mut ChatSession,
    query: &str,
) -> Result<ChatReply> {
    let bar = spinner("Analyzing...");
    let result = service.chat(session, query).await;
    bar.finish_and_clear();
    Ok(result?)
}

fn print_reply(reply: &ChatReply) {
    if reply.is_ok() {
        println!("{}", "pulse".green().bold());
        println!("{}", html_to_text(&reply.message.content));
    } else {
        println!("{}", reply.message.content.red());
    }
    println!();
}
