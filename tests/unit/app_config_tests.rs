/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::collections::HashMap;

use capsync::app_config::{Config, DurationPolicy, LogLevel, StorageBackend};
use capsync::compositor::{Horizontal, Vertical};

use crate::common;

/// Test that the default configuration is valid on its own
#[test]
fn test_default_config_shouldValidate() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.server.bind_address, "127.0.0.1:5000");
    assert_eq!(config.storage.backend, StorageBackend::Supabase);
    assert_eq!(config.recognition.model, "whisper-1");
    assert_eq!(config.captions.font, "FreeMono");
    assert_eq!(config.captions.font_size, 24);
    assert_eq!(config.captions.font_color, "white");
    assert_eq!(config.captions.duration_policy, DurationPolicy::Reject);
    assert_eq!(config.captions.anchor.horizontal, Horizontal::Center);
    assert_eq!(config.captions.anchor.vertical, Vertical::Bottom);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a missing config file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let (config, created) = Config::load_or_create(&path)?;
    assert!(created);
    assert!(path.exists());
    assert_eq!(config.recognition.language, "auto");

    let (_, created_again) = Config::load_or_create(&path)?;
    assert!(!created_again);
    Ok(())
}

/// Test that partial config files fall back to defaults for missing fields
#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        br#"{
            "captions": { "font_size": 32, "duration_policy": "clamp", "anchor": { "vertical": "top" } },
            "storage": { "backend": "local", "local_root": "/srv/media" },
            "log_level": "debug"
        }"#,
    )?;

    let (config, created) = Config::load_or_create(&path)?;

    assert!(!created);
    assert_eq!(config.captions.font_size, 32);
    assert_eq!(config.captions.font, "FreeMono");
    assert_eq!(config.captions.duration_policy, DurationPolicy::Clamp);
    assert_eq!(config.captions.anchor.vertical, Vertical::Top);
    assert_eq!(config.captions.anchor.horizontal, Horizontal::Center);
    assert_eq!(config.storage.backend, StorageBackend::Local);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    Ok(())
}

/// Test that invalid JSON is reported with the file name
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", b"{ not json")?;

    let error = Config::load_or_create(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("conf.json"));
    Ok(())
}

/// Test that environment secrets override the file, ignoring blanks
#[test]
fn test_applyOverrides_withSecrets_shouldOverrideNonEmptyValues() {
    let env: HashMap<&str, &str> = [
        ("SUPABASE_URL", "https://demo.supabase.co"),
        ("SUPABASE_KEY", "service-key"),
        ("OPENAI_API_KEY", "   "),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config.recognition.api_key = "from-file".to_string();
    config.apply_overrides_from(|name| env.get(name).map(|v| v.to_string()));

    assert_eq!(config.storage.url, "https://demo.supabase.co");
    assert_eq!(config.storage.api_key, "service-key");
    assert_eq!(config.recognition.api_key, "from-file");
}

/// Test the validation rules
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut config = Config::default();
    config.recognition.language = "xx-invalid".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.captions.font_size = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.captions.min_duration_secs = 0.0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.captions.track_language = "pt-BR".to_string();
    config.recognition.language = "de".to_string();
    assert!(config.validate().is_ok());
}

/// Test the stricter checks for processing and serving
#[test]
fn test_validateForServer_withMissingSecrets_shouldFail() {
    let mut config = Config::default();
    assert!(config.validate_for_processing().is_err(), "OpenAI endpoint needs a key");

    config.recognition.api_key = "sk-test".to_string();
    assert!(config.validate_for_processing().is_ok());
    assert!(config.validate_for_server().is_err(), "Supabase needs url and key");

    config.storage.url = "https://demo.supabase.co".to_string();
    config.storage.api_key = "service-key".to_string();
    assert!(config.validate_for_server().is_ok());

    config.server.bind_address = "not an address".to_string();
    assert!(config.validate_for_server().is_err());

    let mut local = Config::default();
    local.recognition.endpoint = "http://localhost:8000/v1".to_string();
    local.storage.backend = StorageBackend::Local;
    assert!(local.validate_for_server().is_ok());
}
