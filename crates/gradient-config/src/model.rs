// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Gradient learning assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Gradient configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GradientConfig {
    /// Assistant identity and prompt settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// HTTP server and streaming settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini generation API settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Conversation store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Material recommendation settings.
    #[serde(default)]
    pub recommend: RecommendConfig,
}

/// Assistant identity and prompt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Display name used in logs and the shell prompt.
    #[serde(default = "default_assistant_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline system prompt string. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Number of prior messages quoted back to the model.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            history_window: default_history_window(),
        }
    }
}

fn default_assistant_name() -> String {
    "gradient".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_window() -> usize {
    6
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port for the HTTP listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on one streamed assistant turn, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Capacity of the bounded channel between generation and transport.
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,

    /// Largest accepted decoded inline image, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Allow cross-origin requests from any origin.
    #[serde(default = "default_cors_permissive")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            generation_timeout_secs: default_generation_timeout_secs(),
            stream_buffer: default_stream_buffer(),
            max_image_bytes: default_max_image_bytes(),
            cors_permissive: default_cors_permissive(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_generation_timeout_secs() -> u64 {
    120
}

fn default_stream_buffer() -> usize {
    32
}

fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_cors_permissive() -> bool {
    true
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` requires the `GEMINI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for every assistant turn.
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per response. `None` leaves the model default.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,

    /// Sampling temperature. `None` leaves the model default.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Harm-block threshold applied to every safety category.
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,

    /// Retries on transient HTTP statuses before the stream opens.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            max_output_tokens: None,
            temperature: None,
            safety_threshold: default_safety_threshold(),
            max_retries: default_max_retries(),
        }
    }
}

/// Safety thresholds the Gemini API accepts.
pub const SAFETY_THRESHOLDS: &[&str] = &[
    "BLOCK_NONE",
    "BLOCK_ONLY_HIGH",
    "BLOCK_MEDIUM_AND_ABOVE",
    "BLOCK_LOW_AND_ABOVE",
];

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

fn default_max_retries() -> u32 {
    1
}

/// Which conversation store implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Store implementation.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("gradient").join("gradient.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("gradient.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Material recommendation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendConfig {
    /// Result count when a caller does not ask for one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// JSON file holding the catalog. `None` uses the built-in sample catalog.
    #[serde(default)]
    pub catalog_file: Option<String>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            catalog_file: None,
        }
    }
}

fn default_limit() -> usize {
    10
}
