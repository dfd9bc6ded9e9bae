// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod provider;
pub mod store;

pub use adapter::PluginAdapter;
pub use provider::{ChunkStream, GenerationChunk, GenerationProvider, GenerationRequest};
pub use store::ConversationStore;
