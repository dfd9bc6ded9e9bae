// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Gradient learning assistant.
//!
//! This crate provides the error type, the domain types (materials, chats,
//! messages), the streamed event format, and the adapter traits that the
//! storage and provider crates implement.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::GradientError;
pub use events::StreamEvent;
pub use types::{
    AdapterType, Chat, DEFAULT_CHAT_TITLE, HealthStatus, InlineImage, Level, Material,
    MaterialType, Message, MessagePatch, Role, derive_chat_title, next_created_at,
};

pub use traits::{
    ChunkStream, ConversationStore, GenerationChunk, GenerationProvider, GenerationRequest,
    PluginAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_error_has_all_variants() {
        let _config = GradientError::Config("test".into());
        let _storage = GradientError::storage(std::io::Error::other("test"));
        let _provider = GradientError::Provider {
            message: "test".into(),
            source: None,
        };
        let _input = GradientError::InvalidInput("test".into());
        let _timeout = GradientError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = GradientError::Internal("test".into());
        let not_found = GradientError::NotFound {
            kind: "chat",
            id: "abc".into(),
        };
        assert_eq!(not_found.to_string(), "chat not found: abc");
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(GradientError::InvalidInput("x".into()).is_client_error());
        assert!(!GradientError::Internal("x".into()).is_client_error());
        assert!(
            !GradientError::Provider {
                message: "x".into(),
                source: None
            }
            .is_client_error()
        );
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Provider, AdapterType::Storage] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn role_display_matches_wire_format() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            r#""assistant""#
        );
    }

    #[test]
    fn all_traits_are_object_safe() {
        fn _assert_provider(_: &dyn GenerationProvider) {}
        fn _assert_store(_: &dyn ConversationStore) {}
        fn _assert_plugin(_: &dyn PluginAdapter) {}
    }
}
