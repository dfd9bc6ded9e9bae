// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of anaphoric material requests ("berikan materi tentang itu").
//!
//! A contextual request is re-targeted at the most recent substantive user
//! message. History is scanned newest first; that scan order decides which
//! earlier query wins.

use gradient_core::{Message, Role};
use tracing::debug;

/// Phrases that refer back to an earlier topic instead of naming one.
pub const CONTEXTUAL_PHRASES: &[&str] = &[
    "tentang itu",
    "tentang ini",
    "tentang hal itu",
    "tentang hal tersebut",
    "tentang topik itu",
    "tentang topik tersebut",
    "terkait itu",
    "terkait ini",
    "terkait hal tersebut",
    "terkait topik tersebut",
    "mengenai itu",
    "mengenai ini",
    "mengenai hal tersebut",
    "materi itu",
    "materi tersebut",
    "materinya",
    "about that",
    "about it",
    "about this",
    "more on that",
];

/// Whether `query` asks for materials about a topic it does not name.
pub fn is_contextual_request(query: &str) -> bool {
    let lowered = query.to_lowercase();
    CONTEXTUAL_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// The query actually used for scoring.
///
/// Non-contextual queries come back unchanged. Contextual ones are replaced by
/// the newest prior user message that is neither blank nor contextual itself,
/// falling back to `current` when none exists.
pub fn resolve<'a>(current: &'a str, history: &'a [Message]) -> &'a str {
    if history.is_empty() || !is_contextual_request(current) {
        return current;
    }

    let resolved = history
        .iter()
        .rev()
        .filter(|message| message.role == Role::User)
        .map(|message| message.content.as_str())
        .find(|content| !content.trim().is_empty() && !is_contextual_request(content));

    match resolved {
        Some(previous) => {
            debug!(current, resolved = previous, "resolved contextual request");
            previous
        }
        None => current,
    }
}
