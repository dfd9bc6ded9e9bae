// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client side of the Gradient gateway.
//!
//! [`FrameDecoder`] turns the send-message byte stream into events,
//! [`ReplyState`] folds them into the assistant message, [`LocalChats`]
//! keeps the chat list between sessions and [`GatewayClient`] talks HTTP.

pub mod client;
pub mod decoder;
pub mod local;
pub mod state;

pub use client::{GatewayClient, OutgoingMessage};
pub use decoder::FrameDecoder;
pub use local::LocalChats;
pub use state::{ReplyState, TRANSPORT_APOLOGY};
