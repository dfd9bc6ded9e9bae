// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `gradient ask` command implementation: one streamed exchange.

use std::io::Write;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use colored::Colorize;
use gradient_client::{GatewayClient, OutgoingMessage};
use gradient_core::{GradientError, Material, StreamEvent};

/// Sends `message` and prints the reply as it streams.
pub async fn run_ask(
    server: &str,
    message: String,
    chat: Option<String>,
    image: Option<&Path>,
) -> Result<(), GradientError> {
    let client = GatewayClient::new(server)?;
    let image_url = match image {
        Some(path) => Some(encode_image(path).await?),
        None => None,
    };
    let request = OutgoingMessage {
        message,
        image_url,
        chat_id: chat,
    };

    let mut stdout = std::io::stdout();
    let reply = client
        .send(&request, |event, _| print_event(&mut stdout, event))
        .await?;
    println!();

    print_recommendations(reply.recommendations());
    if let Some(chat_id) = reply.chat_id() {
        eprintln!("{}", format!("chat: {chat_id}").dimmed());
    }

    if reply.failed() {
        return Err(GradientError::Provider {
            message: "the assistant could not answer".into(),
            source: None,
        });
    }
    Ok(())
}

/// Writes streamed text as it arrives. An `error` event replaces the reply,
/// so it is printed on its own line.
pub fn print_event(out: &mut impl Write, event: &StreamEvent) {
    match event {
        StreamEvent::Content { content } => {
            let _ = write!(out, "{content}");
            let _ = out.flush();
        }
        StreamEvent::Error { content } => {
            let _ = writeln!(out);
            let _ = write!(out, "{}", content.red());
            let _ = out.flush();
        }
        StreamEvent::Start { .. } | StreamEvent::Complete => {}
    }
}

pub fn print_recommendations(materials: &[Material]) {
    if materials.is_empty() {
        return;
    }
    println!("{}", "Materi terkait:".bold());
    for material in materials {
        println!(
            "  {} {} {}",
            "•".cyan(),
            material.title,
            format!("({}, {})", material.level, material.kind).dimmed()
        );
    }
}

/// Reads an image file into a `data:` URI.
pub async fn encode_image(path: &Path) -> Result<String, GradientError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        GradientError::InvalidInput(format!("cannot read image {}: {e}", path.display()))
    })?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}
