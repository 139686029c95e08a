//! Integration tests for ConfigManager and settings file handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Defaults when the settings file is missing
//! - The API key is never persisted
//! - Invalid settings are rejected

use redraft::ConfigManager;
use redraft::models::{DEFAULT_MAX_CHARS, Settings};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

fn create_test_config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_create_config_manager() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    assert_eq!(manager.config_dir(), &config_path);
}

#[test]
fn test_config_dir_created() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let nested = config_path.join("Redraft Data");

    ConfigManager::new(&nested).unwrap();
    assert!(nested.exists());
}

#[test]
fn test_load_default_settings() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    // Settings file doesn't exist, should return defaults
    let settings = manager.load_settings().unwrap();

    assert_eq!(settings.model, "gpt-4.1");
    assert_eq!(settings.max_chars, DEFAULT_MAX_CHARS);
    assert!(settings.custom_model.is_none());
    assert!(!settings.debug_mode);
}

#[test]
fn test_partial_settings_file_keeps_defaults() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(
        manager.settings_path(),
        "custom_model: my-model\ninstruction: Translate to French\n",
    )
    .unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.effective_model(), "my-model");
    assert_eq!(settings.instruction, "Translate to French");
    assert_eq!(settings.max_chars, DEFAULT_MAX_CHARS);
}

#[test]
fn test_api_key_not_saved() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    let settings = Settings {
        api_key: Some("sk-do-not-store".to_string()),
        ..Settings::default()
    };
    manager.save_settings(&settings).unwrap();

    let contents = fs::read_to_string(manager.settings_path()).unwrap();
    assert!(!contents.contains("sk-do-not-store"));
}

#[test]
fn test_api_key_read_from_file() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.settings_path(), "api_key: sk-from-file\n").unwrap();

    let settings = manager.load_settings().unwrap();
    assert_eq!(settings.api_key(), Some("sk-from-file"));
}

#[test]
fn test_unknown_model_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.settings_path(), "model: gpt-5\n").unwrap();

    let err = manager.load_settings().unwrap_err();
    assert!(format!("{:#}", err).contains("gpt-5"));
}

#[test]
fn test_invalid_yaml_rejected() {
    let (_temp_dir, config_path) = create_test_config_dir();
    let manager = ConfigManager::new(&config_path).unwrap();

    fs::write(manager.settings_path(), "max_chars: [not, a, number]\n").unwrap();

    assert!(manager.load_settings().is_err());
}
