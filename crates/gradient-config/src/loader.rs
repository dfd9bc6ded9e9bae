// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gradient.toml` > `~/.config/gradient/gradient.toml` > `/etc/gradient/gradient.toml`
//! with environment variable overrides via `GRADIENT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GradientConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gradient/gradient.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "gradient.toml";

/// Sections whose env vars are remapped from `GRADIENT_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &["assistant", "server", "gemini", "storage", "recommend"];

/// Path of the per-user configuration file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gradient").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gradient/gradient.toml` (system-wide)
/// 3. `~/.config/gradient/gradient.toml` (user XDG config)
/// 4. `./gradient.toml` (local directory)
/// 5. `GRADIENT_*` environment variables
pub fn load_config() -> Result<GradientConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<GradientConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GradientConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GradientConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GradientConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GradientConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `GRADIENT_GEMINI_API_KEY` to `gemini.api_key`.
///
/// Figment hands over the stripped key in its original case, so it is
/// lower-cased first. Only the first underscore after the section name
/// becomes a dot, so keys that contain underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("GRADIENT_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key
}
