// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express, such as
//! non-zero timeouts, known safety thresholds, and sane temperature ranges.

use crate::diagnostic::ConfigError;
use crate::model::{GradientConfig, SAFETY_THRESHOLDS, StorageBackend};

/// Largest accepted `assistant.history_window`.
pub const MAX_HISTORY_WINDOW: usize = 50;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &GradientConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if config.server.generation_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "server.generation_timeout_secs must be greater than 0",
        ));
    }

    if config.server.stream_buffer == 0 {
        errors.push(ConfigError::validation(
            "server.stream_buffer must be greater than 0",
        ));
    }

    if config.server.max_image_bytes == 0 {
        errors.push(ConfigError::validation(
            "server.max_image_bytes must be greater than 0",
        ));
    }

    if config.assistant.history_window > MAX_HISTORY_WINDOW {
        errors.push(ConfigError::validation(format!(
            "assistant.history_window must be at most {MAX_HISTORY_WINDOW}, got {}",
            config.assistant.history_window
        )));
    }

    if config.storage.backend == StorageBackend::Sqlite
        && config.storage.database_path.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty when backend is sqlite",
        ));
    }

    if config.recommend.default_limit == 0 {
        errors.push(ConfigError::validation(
            "recommend.default_limit must be at least 1",
        ));
    }

    if let Some(temperature) = config.gemini.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        errors.push(ConfigError::validation(format!(
            "gemini.temperature must be between 0 and 2, got {temperature}"
        )));
    }

    if !SAFETY_THRESHOLDS.contains(&config.gemini.safety_threshold.as_str()) {
        errors.push(ConfigError::validation(format!(
            "gemini.safety_threshold `{}` is not one of {}",
            config.gemini.safety_threshold,
            SAFETY_THRESHOLDS.join(", ")
        )));
    }

    if config.gemini.base_url.trim().is_empty() {
        errors.push(ConfigError::validation("gemini.base_url must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
