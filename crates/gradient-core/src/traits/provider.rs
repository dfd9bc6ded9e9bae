// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation provider trait for the external language model.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::GradientError;
use crate::traits::adapter::PluginAdapter;
use crate::types::InlineImage;

/// Everything the model receives for one assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
}

/// One item pulled from a generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationChunk {
    /// A text delta, in production order.
    Text(String),
    /// The model finished normally.
    Done,
    /// The model failed mid-stream. No further items follow.
    Failed(String),
}

/// Boxed stream of generation chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = GenerationChunk> + Send>>;

/// Adapter for the external text generator.
///
/// Dropping the returned stream must release the underlying connection.
#[async_trait]
pub trait GenerationProvider: PluginAdapter {
    /// Opens a streaming generation. An `Err` means the stream never opened.
    async fn stream(&self, request: GenerationRequest) -> Result<ChunkStream, GradientError>;
}
