// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events relay for `POST /api/chat`.
//!
//! Each [`StreamEvent`] becomes one unnamed SSE event whose data is the
//! event's JSON:
//! ```text
//! data: {"type":"start","chatId":"...","recommendations":[...]}
//!
//! data: {"type":"content","content":"partial text"}
//!
//! data: {"type":"complete"}
//! ```

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use gradient_agent::ChatTurn;
use gradient_core::StreamEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Runs `turn` in the background and streams its events.
///
/// The relay channel holds at most `buffer` events. Dropping the response
/// body (client disconnect) closes the channel, which cancels the turn.
pub fn stream_turn(
    turn: ChatTurn,
    buffer: usize,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(buffer.max(1));

    tokio::spawn(async move {
        let chat_id = turn.chat_id().to_string();
        let outcome = turn.run(tx).await;
        debug!(chat_id = %chat_id, outcome = ?outcome, "turn finished");
    });

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        Some((Ok(to_sse_event(&event)), rx))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Encodes one stream event as an SSE `data:` frame.
pub fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().json_data(event).unwrap_or_else(|e| {
        warn!(kind = event.kind(), error = %e, "failed to encode stream event");
        Event::default().comment("unencodable event")
    })
}
