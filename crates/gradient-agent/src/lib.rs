// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming response coordination for the Gradient learning assistant.
//!
//! A send runs in two phases. [`ChatService::begin`] validates the request,
//! stores the user turn, resolves context and scores materials; any failure
//! there is an ordinary error. [`ChatTurn::run`] then relays the generation
//! as [`StreamEvent`](gradient_core::StreamEvent)s and absorbs generation
//! failures into an apology.

pub mod apology;
mod locks;
pub mod service;
pub mod shutdown;
pub mod turn;

pub use apology::apology_for;
pub use service::{ChatService, SendMessage, TurnSettings};
pub use shutdown::install_signal_handler;
pub use turn::{ChatTurn, TurnOutcome, TurnState};
