//! Unit tests for config.rs module

use notebridge::config::AppConfig;

#[test]
fn test_default_config_values() {
    let config = AppConfig::default();

    assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.database.path, "data/notebridge.db");
    assert_eq!(config.database.max_connections, 10);
    assert_eq!(config.database.connection_timeout_secs, 30);
}

#[test]
fn test_default_logging_config() {
    let config = AppConfig::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.file_path, None);
    assert_eq!(config.logging.format, "text");
}

#[test]
fn test_default_storage_config() {
    let config = AppConfig::default();

    assert_eq!(config.storage.backend, "local");
    assert_eq!(config.storage.local_root, "data/blobs");
    assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
    assert!(config.storage.region.is_none());
    assert!(config.storage.endpoint_url.is_none());
}

#[test]
fn test_default_chat_config() {
    let config = AppConfig::default();

    assert_eq!(config.chat.default_page_size, 20);
    assert_eq!(config.chat.max_page_size, 100);
}

#[test]
fn test_default_config_is_valid() {
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_invalid_bind_address() {
    let mut config = AppConfig::default();
    config.server.bind_addr = "not-an-address".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_connection_timeout() {
    let mut config = AppConfig::default();
    config.database.connection_timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_level() {
    let mut config = AppConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_log_format() {
    let mut config = AppConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_all_valid_log_levels() {
    for level in ["trace", "debug", "info", "warn", "error"] {
        let mut config = AppConfig::default();
        config.logging.level = level.to_string();
        assert!(config.validate().is_ok(), "level {level} should be accepted");
    }
}

#[test]
fn test_unknown_storage_backend() {
    let mut config = AppConfig::default();
    config.storage.backend = "ftp".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_s3_backend_requires_bucket() {
    let mut config = AppConfig::default();
    config.storage.backend = "s3".to_string();
    config.storage.bucket = String::new();
    assert!(config.validate().is_err());

    config.storage.bucket = "lesson-pictures".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_zero_upload_limit() {
    let mut config = AppConfig::default();
    config.storage.max_upload_bytes = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_default_page_size_above_max() {
    let mut config = AppConfig::default();
    config.chat.default_page_size = 200;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization_roundtrip() {
    let config = AppConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: AppConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.storage.bucket, config.storage.bucket);
    assert_eq!(parsed.chat.max_page_size, config.chat.max_page_size);
}
