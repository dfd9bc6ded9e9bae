// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Gradient configuration system.

use std::io::Write;

use gradient_config::diagnostic::ConfigError;
use gradient_config::model::{GradientConfig, StorageBackend};
use gradient_config::{
    load_and_validate_path, load_and_validate_str, load_config_from_path, load_config_from_str,
};
use serial_test::serial;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_gradient_config() {
    let toml = r#"
[assistant]
name = "tutor"
log_level = "debug"
system_prompt = "Kamu adalah tutor."
history_window = 4

[server]
host = "0.0.0.0"
port = 8080
generation_timeout_secs = 30
stream_buffer = 8
max_image_bytes = 1024
cors_permissive = false

[gemini]
api_key = "g-123"
model = "gemini-2.5-pro"
base_url = "http://localhost:9999"
max_output_tokens = 2048
temperature = 0.4
safety_threshold = "BLOCK_ONLY_HIGH"
max_retries = 0

[storage]
backend = "memory"
database_path = "/tmp/test.db"
wal_mode = false

[recommend]
default_limit = 4
catalog_file = "/srv/catalog.json"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.assistant.name, "tutor");
    assert_eq!(config.assistant.history_window, 4);
    assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
    assert_eq!(config.server.generation_timeout_secs, 30);
    assert!(!config.server.cors_permissive);
    assert_eq!(config.gemini.api_key.as_deref(), Some("g-123"));
    assert_eq!(config.gemini.max_output_tokens, Some(2048));
    assert_eq!(config.gemini.temperature, Some(0.4));
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.recommend.default_limit, 4);
    assert_eq!(
        config.recommend.catalog_file.as_deref(),
        Some("/srv/catalog.json")
    );
}

/// An empty document yields the compiled defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.assistant.name, "gradient");
    assert_eq!(config.assistant.history_window, 6);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.generation_timeout_secs, 120);
    assert_eq!(config.gemini.model, "gemini-2.5-flash");
    assert_eq!(config.gemini.safety_threshold, "BLOCK_MEDIUM_AND_ABOVE");
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
    assert_eq!(config.recommend.default_limit, 10);
    assert!(config.recommend.catalog_file.is_none());
}

/// Unknown keys become diagnostics with a suggestion.
#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[gemini]
modle = "gemini-2.5-flash"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("an UnknownKey diagnostic");
    assert_eq!(unknown.0, "modle");
    assert_eq!(unknown.1.as_deref(), Some("model"));
}

/// Unknown top-level sections are rejected too.
#[test]
fn unknown_section_is_rejected() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n").unwrap_err();
    assert!(format!("{err}").contains("telegram"));
}

/// Wrong value types produce InvalidType diagnostics.
#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after deserialization.
#[test]
fn validation_errors_surface_from_str_loader() {
    let errors = load_and_validate_str("[recommend]\ndefault_limit = 0\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

/// Defaults round-trip through serialization.
#[test]
fn default_config_serializes() {
    let json = serde_json::to_value(GradientConfig::default()).unwrap();
    assert_eq!(json["storage"]["backend"], "sqlite");
    assert_eq!(json["server"]["stream_buffer"], 32);
}

/// Environment variables override file values.
#[test]
#[serial]
fn env_overrides_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 4000\n\n[gemini]\nmodel = \"from-file\"").unwrap();

    // SAFETY: test-only env mutation, serialized with #[serial].
    unsafe { std::env::set_var("GRADIENT_SERVER_PORT", "4100") };
    unsafe { std::env::set_var("GRADIENT_GEMINI_MAX_RETRIES", "3") };
    let result = load_config_from_path(file.path());
    unsafe { std::env::remove_var("GRADIENT_SERVER_PORT") };
    unsafe { std::env::remove_var("GRADIENT_GEMINI_MAX_RETRIES") };

    let config = result.expect("config should load");
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.gemini.max_retries, 3);
    assert_eq!(config.gemini.model, "from-file");
}

/// An API key supplied only through the environment lands in `gemini.api_key`.
#[test]
#[serial]
fn env_api_key_maps_into_gemini_section() {
    let file = tempfile::NamedTempFile::new().unwrap();

    // SAFETY: test-only env mutation, serialized with #[serial].
    unsafe { std::env::set_var("GRADIENT_GEMINI_API_KEY", "k") };
    let result = load_config_from_path(file.path());
    unsafe { std::env::remove_var("GRADIENT_GEMINI_API_KEY") };

    let config = result.expect("env-only api key should load");
    assert_eq!(config.gemini.api_key.as_deref(), Some("k"));
}

/// Diagnostics from an explicit file carry the suggestion.
#[test]
#[serial]
fn path_loader_reports_unknown_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[assistant]\nnaem = \"x\"").unwrap();

    let errors = load_and_validate_path(file.path()).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("name"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
