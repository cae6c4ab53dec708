//! Unit tests for the ConfigEngine public API: default loading, dot-path
//! updates persisted immediately, and reset.

use std::fs;

use serde_json::json;
use tabbed_gallery::services::config_engine::{ConfigEngine, ConfigEngineTrait};
use tabbed_gallery::types::config::GalleryConfig;
use tabbed_gallery::types::errors::ConfigError;
use tabbed_gallery::types::token::PageToken;
use tempfile::TempDir;

fn engine_in_temp(dir: &TempDir) -> ConfigEngine {
    ConfigEngine::new(dir.path().join("gallery.json"))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let config = engine.load().unwrap();

    assert_eq!(config, GalleryConfig::default());
    assert_eq!(config.reaction_countdown_ms, 5_000);
    assert_eq!(config.first_page, PageToken::Number(1));
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    fs::write(engine.config_path(), r#"{ "preview_max_batch": 10, "first_page": "start" }"#)
        .unwrap();

    let config = engine.load().unwrap();

    assert_eq!(config.preview_max_batch, 10);
    assert_eq!(config.first_page, PageToken::Cursor("start".to_string()));
    assert_eq!(config.overlay_slide_ms, 300);
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    fs::write(engine.config_path(), "{ not json").unwrap();

    assert!(matches!(engine.load(), Err(ConfigError::Serialization(_))));
}

#[test]
fn test_set_value_persists_immediately() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    engine.set_value("reaction_countdown_ms", json!(3000)).unwrap();

    let mut reloaded = engine_in_temp(&dir);
    let config = reloaded.load().unwrap();
    assert_eq!(config.reaction_countdown_ms, 3000);
    assert_eq!(
        config.reaction_countdown(),
        std::time::Duration::from_millis(3000)
    );
}

#[test]
fn test_set_nested_key_binding() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    engine
        .set_value("key_bindings.close_overlay", json!("q"))
        .unwrap();

    assert_eq!(
        engine.config().key_bindings.get("close_overlay").map(String::as_str),
        Some("q")
    );
}

#[test]
fn test_set_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    assert!(matches!(
        engine.set_value("overlay.speed", json!(1)),
        Err(ConfigError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("", json!(1)),
        Err(ConfigError::InvalidKey(_))
    ));
    assert!(!engine.config_path().exists());
}

#[test]
fn test_set_wrong_type_fails_and_keeps_config() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("preview_max_batch", json!("lots"));

    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    assert_eq!(engine.config().preview_max_batch, 50);
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();
    engine.set_value("overlay_close_ms", json!(900)).unwrap();

    engine.reset().unwrap();

    assert_eq!(engine.config(), &GalleryConfig::default());
    let mut reloaded = engine_in_temp(&dir);
    assert_eq!(reloaded.load().unwrap(), GalleryConfig::default());
}
