// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gradient shell` command implementation.
//!
//! An interactive REPL against a running gateway. The chat list and
//! messages are kept locally and saved after every exchange, so a later
//! session resumes the current chat.

use std::path::{Path, PathBuf};

use colored::Colorize;
use gradient_client::{GatewayClient, LocalChats, OutgoingMessage, TRANSPORT_APOLOGY};
use gradient_config::GradientConfig;
use gradient_core::{GradientError, Message, MessagePatch, Role, StreamEvent};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

use crate::ask::{encode_image, print_event, print_recommendations};

/// A parsed line of shell input.
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Help,
    New,
    Chats,
    Switch(&'a str),
    Delete,
    History,
    Image { path: &'a str, message: &'a str },
    Message(&'a str),
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Option<Input<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(Input::Message(line));
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    Some(match command {
        "/quit" | "/exit" => Input::Quit,
        "/help" => Input::Help,
        "/new" => Input::New,
        "/chats" => Input::Chats,
        "/switch" if !rest.is_empty() => Input::Switch(rest),
        "/delete" => Input::Delete,
        "/history" => Input::History,
        "/image" if !rest.is_empty() => {
            let (path, message) = rest.split_once(' ').unwrap_or((rest, ""));
            Input::Image {
                path,
                message: message.trim(),
            }
        }
        _ => Input::Unknown(command),
    })
}

/// Where the shell keeps its local chat state.
fn state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("gradient").join("shell"))
        .unwrap_or_else(|| PathBuf::from(".gradient-shell"))
}

/// Runs the `gradient shell` interactive REPL.
pub async fn run_shell(config: &GradientConfig, server: &str) -> Result<(), GradientError> {
    let client = GatewayClient::new(server)?;
    let dir = state_dir();
    let mut chats = LocalChats::load(&dir).await;
    chats.ensure_current();

    let mut rl = DefaultEditor::new()
        .map_err(|e| GradientError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.assistant.name).bold().green());
    println!("Connected to {}. Type {} for commands.\n", server, "/help".yellow());

    let prompt = format!("{}> ", config.assistant.name.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        let Some(input) = parse_input(&line) else {
            continue;
        };
        let _ = rl.add_history_entry(line.as_str());

        let outcome = match input {
            Input::Quit => break,
            Input::Help => {
                print_help();
                Ok(())
            }
            Input::New => {
                chats.new_chat();
                println!("{}", "started a new chat".dimmed());
                Ok(())
            }
            Input::Chats => {
                print_chats(&chats);
                Ok(())
            }
            Input::Switch(target) => switch(&mut chats, target),
            Input::Delete => delete_current(&client, &mut chats).await,
            Input::History => {
                print_history(chats.current_messages());
                Ok(())
            }
            Input::Image { path, message } => match encode_image(Path::new(path)).await {
                Ok(image_url) => exchange(&client, &mut chats, message, Some(image_url)).await,
                Err(e) => Err(e),
            },
            Input::Message(text) => exchange(&client, &mut chats, text, None).await,
            Input::Unknown(command) => {
                println!("unknown command {}; try {}", command.yellow(), "/help".yellow());
                Ok(())
            }
        };

        if let Err(e) = outcome {
            eprintln!("{}: {e}", "error".red());
        }
        if let Err(e) = chats.save(&dir).await {
            warn!(error = %e, "failed to save local chats");
        }
    }

    chats.save(&dir).await?;
    println!("{}", "sampai jumpa".dimmed());
    Ok(())
}

/// Sends one message in the current chat and streams the reply.
async fn exchange(
    client: &GatewayClient,
    chats: &mut LocalChats,
    text: &str,
    image_url: Option<String>,
) -> Result<(), GradientError> {
    let chat_id = chats.ensure_current();
    chats.add_message(
        Message::new(uuid::Uuid::new_v4().to_string(), &chat_id, Role::User, text)
            .with_image(image_url.clone()),
    );
    let reply_id = uuid::Uuid::new_v4().to_string();
    chats.add_message(Message::new(&reply_id, &chat_id, Role::Assistant, ""));

    let request = OutgoingMessage {
        message: text.to_string(),
        image_url,
        chat_id: Some(chat_id.clone()),
    };

    let mut stdout = std::io::stdout();
    let sent = client
        .send(&request, |event, patch| {
            print_event(&mut stdout, event);
            if !matches!(event, StreamEvent::Complete) {
                chats.update_message(&chat_id, &reply_id, patch);
            }
        })
        .await;
    println!();

    match sent {
        Ok(reply) => {
            print_recommendations(reply.recommendations());
            Ok(())
        }
        Err(e) => {
            // No stream was opened; the placeholder reply gets the apology.
            chats.update_message(&chat_id, &reply_id, &MessagePatch::content(TRANSPORT_APOLOGY));
            Err(e)
        }
    }
}

fn switch(chats: &mut LocalChats, target: &str) -> Result<(), GradientError> {
    let id = match target.parse::<usize>() {
        Ok(n) if n >= 1 => chats.chats().get(n - 1).map(|c| c.id.clone()),
        _ => Some(target.to_string()),
    };
    match id {
        Some(id) if chats.switch_to(&id) => {
            println!("{}", format!("switched to {id}").dimmed());
            Ok(())
        }
        _ => Err(GradientError::NotFound {
            kind: "chat",
            id: target.to_string(),
        }),
    }
}

async fn delete_current(client: &GatewayClient, chats: &mut LocalChats) -> Result<(), GradientError> {
    let Some(id) = chats.current_chat_id().map(str::to_string) else {
        return Ok(());
    };
    match client.delete_chat(&id).await {
        // Chats that never got a reply exist only locally.
        Ok(()) | Err(GradientError::NotFound { .. }) => {}
        Err(e) => return Err(e),
    }
    chats.delete_chat(&id);
    println!("{}", "chat deleted".dimmed());
    Ok(())
}

fn print_help() {
    println!("  /new                 start a new chat");
    println!("  /chats               list chats");
    println!("  /switch <n|id>       switch to a chat");
    println!("  /delete              delete the current chat");
    println!("  /history             show the current chat");
    println!("  /image <path> [msg]  send an image with an optional message");
    println!("  /quit                leave the shell");
}

fn print_chats(chats: &LocalChats) {
    let current = chats.current_chat_id();
    for (i, chat) in chats.chats().iter().enumerate() {
        let marker = if Some(chat.id.as_str()) == current { "*" } else { " " };
        println!(
            "{marker} {:>2}. {} {}",
            i + 1,
            chat.title,
            chat.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
}

fn print_history(messages: &[Message]) {
    for message in messages {
        let who = match message.role {
            Role::User => "kamu".cyan(),
            Role::Assistant => "gradient".green(),
        };
        let image = if message.image_url.is_some() { " [gambar]" } else { "" };
        println!("{who}{image}: {}", message.content);
    }
}
