// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the catalog, the conversation store, and the transport.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::GradientError;

/// Title given to a chat before its first user message arrives.
pub const DEFAULT_CHAT_TITLE: &str = "Chat Baru";

/// Maximum number of characters kept from the first user message when titling a chat.
pub const TITLE_MAX_CHARS: usize = 50;

/// MIME type assumed for inline images whose data URI omits one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Delivery format of a learning material.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MaterialType {
    Video,
    Pdf,
    Article,
}

/// Difficulty level of a learning material.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

/// One catalog entry: a learning resource that can be recommended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content_url: String,
    #[serde(rename = "type")]
    pub kind: MaterialType,
    /// Domain subject, e.g. "kalkulus" or "aljabar linear".
    pub topic: String,
    pub thumbnail_url: String,
    pub level: Level,
    pub created_at: DateTime<Utc>,
}

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in a chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub recommendations: Vec<Material>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a message with a fresh id and the current time.
    pub fn new(
        id: impl Into<String>,
        chat_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            chat_id: chat_id.into(),
            role,
            content: content.into(),
            image_url: None,
            recommendations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_image(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_recommendations(mut self, recommendations: Vec<Material>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Merges the fields present in `patch` into this message.
    pub fn apply(&mut self, patch: &MessagePatch) {
        if let Some(content) = &patch.content {
            self.content.clone_from(content);
        }
        if let Some(recommendations) = &patch.recommendations {
            self.recommendations.clone_from(recommendations);
        }
    }
}

/// Partial update merged into an existing message.
///
/// Content is always cumulative, never a delta, so applying the same patch
/// twice leaves the message unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<Material>>,
}

impl MessagePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            recommendations: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.recommendations.is_none()
    }
}

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// A new, untitled chat created now.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Derives a chat title from the first user message.
///
/// Returns `None` for blank text (an image-only first message keeps the
/// default title). Truncation counts characters, not bytes.
pub fn derive_chat_title(first_message: &str) -> Option<String> {
    let trimmed = first_message.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let head: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        Some(format!("{head}..."))
    } else {
        Some(trimmed.to_string())
    }
}

/// Picks the timestamp for a message appended after `last`.
///
/// Clock skew must never place a new message before an older one.
pub fn next_created_at(last: Option<DateTime<Utc>>, candidate: DateTime<Utc>) -> DateTime<Utc> {
    match last {
        Some(last) if last > candidate => last,
        _ => candidate,
    }
}

/// An image attached to a generation request, decoded from a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload, exactly as received.
    pub data: String,
}

impl InlineImage {
    /// Parses `data:<mime>;base64,<payload>`.
    ///
    /// The payload must be valid base64 and decode to at most `max_bytes`.
    pub fn from_data_uri(uri: &str, max_bytes: usize) -> Result<Self, GradientError> {
        let (header, payload) = uri
            .split_once(',')
            .ok_or_else(|| GradientError::InvalidInput("image must be a data URI".into()))?;

        let mime_type = header
            .strip_prefix("data:")
            .map(|rest| rest.split(';').next().unwrap_or_default())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();

        if !mime_type.starts_with("image/") {
            return Err(GradientError::InvalidInput(format!(
                "unsupported attachment type: {mime_type}"
            )));
        }

        let decoded = STANDARD
            .decode(payload.trim())
            .map_err(|e| GradientError::InvalidInput(format!("image is not valid base64: {e}")))?;
        if decoded.is_empty() {
            return Err(GradientError::InvalidInput("image is empty".into()));
        }
        if decoded.len() > max_bytes {
            return Err(GradientError::InvalidInput(format!(
                "image is {} bytes, limit is {max_bytes}",
                decoded.len()
            )));
        }

        Ok(Self {
            mime_type,
            data: payload.trim().to_string(),
        })
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn material_uses_wire_field_names() {
        let json = r#"{
            "id": "1",
            "title": "Kalkulus Diferensial",
            "summary": "Turunan dan limit",
            "contentUrl": "https://example.com/kalkulus",
            "type": "video",
            "topic": "kalkulus",
            "thumbnailUrl": "/images/kalkulus.jpg",
            "level": "Beginner",
            "createdAt": "2023-03-01T00:00:00Z"
        }"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.kind, MaterialType::Video);
        assert_eq!(material.level, Level::Beginner);

        let back = serde_json::to_value(&material).unwrap();
        assert_eq!(back["contentUrl"], "https://example.com/kalkulus");
        assert_eq!(back["type"], "video");
    }

    #[test]
    fn message_omits_absent_image() {
        let msg = Message::new("m1", "c1", Role::User, "halo");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("imageUrl").is_none());
        assert_eq!(json["chatId"], "c1");
        assert_eq!(json["role"], "user");
        assert_eq!(json["recommendations"], serde_json::json!([]));
    }

    #[test]
    fn message_timestamps_round_trip_exactly() {
        let msg = Message::new("m1", "c1", Role::Assistant, "jawaban");
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn patch_application_is_idempotent() {
        let mut msg = Message::new("m1", "c1", Role::Assistant, "");
        let patch = MessagePatch::content("Halo dunia");
        msg.apply(&patch);
        msg.apply(&patch);
        assert_eq!(msg.content, "Halo dunia");
        assert!(msg.recommendations.is_empty());
    }

    #[test]
    fn short_titles_are_kept() {
        assert_eq!(
            derive_chat_title("  Jelaskan integral  ").as_deref(),
            Some("Jelaskan integral")
        );
    }

    #[test]
    fn long_titles_are_truncated_by_chars() {
        let text = "é".repeat(60);
        let title = derive_chat_title(&text).unwrap();
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn blank_first_message_yields_no_title() {
        assert_eq!(derive_chat_title("   "), None);
    }

    #[test]
    fn created_at_never_goes_backwards() {
        let now = Utc::now();
        let earlier = now - Duration::seconds(5);
        assert_eq!(next_created_at(Some(now), earlier), now);
        assert_eq!(next_created_at(Some(earlier), now), now);
        assert_eq!(next_created_at(None, earlier), earlier);
    }

    #[test]
    fn data_uri_with_mime_is_parsed() {
        let image = InlineImage::from_data_uri("data:image/png;base64,aGVsbG8=", 1024).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[test]
    fn data_uri_without_mime_defaults_to_jpeg() {
        let image = InlineImage::from_data_uri("data:;base64,aGVsbG8=", 1024).unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn oversized_or_malformed_images_are_rejected() {
        let err = InlineImage::from_data_uri("data:image/png;base64,aGVsbG8=", 2).unwrap_err();
        assert!(err.is_client_error());

        let err = InlineImage::from_data_uri("data:image/png;base64,@@@", 1024).unwrap_err();
        assert!(matches!(err, GradientError::InvalidInput(_)));

        let err = InlineImage::from_data_uri("not a uri", 1024).unwrap_err();
        assert!(matches!(err, GradientError::InvalidInput(_)));

        let err = InlineImage::from_data_uri("data:text/plain;base64,aGVsbG8=", 1024).unwrap_err();
        assert!(matches!(err, GradientError::InvalidInput(_)));
    }
}
