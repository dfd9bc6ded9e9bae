// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries over the chats and messages tables.

pub mod chats;
pub mod messages;
