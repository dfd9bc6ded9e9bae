// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Gradient learning assistant.

use thiserror::Error;

/// The primary error type used across all Gradient adapter traits and core operations.
#[derive(Debug, Error)]
pub enum GradientError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation provider errors (API failure, blocked prompt, transport).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Caller supplied a request the system refuses to process.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A chat or message addressed by id does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GradientError {
    /// Wraps any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        GradientError::Storage {
            source: Box::new(err),
        }
    }

    /// Whether this error stems from bad caller input rather than a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GradientError::InvalidInput(_) | GradientError::NotFound { .. }
        )
    }
}
