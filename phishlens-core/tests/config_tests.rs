// Tests for settings persistence

use phishlens_core::config::{DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS, Settings};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load(&dir.path().join("config.json")).unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.server_url, DEFAULT_SERVER_URL);
    assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    assert_eq!(settings.report_path, PathBuf::from("phishing-report.pdf"));
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let settings = Settings {
        server_url: "https://phish.example:8443".to_string(),
        timeout_secs: 5,
        report_path: PathBuf::from("/tmp/report.pdf"),
    };

    settings.save(&path).unwrap();
    assert!(Settings::exists(&path));
    assert_eq!(Settings::load(&path).unwrap(), settings);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "server_url": "http://10.0.0.5:5000" }"#).unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.server_url, "http://10.0.0.5:5000");
    assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "server_url = nope").unwrap();

    assert!(Settings::load(&path).is_err());
}

#[test]
fn test_overrides() {
    let settings = Settings::default().with_overrides(Some("http://other:1"), None);
    assert_eq!(settings.server_url, "http://other:1");
    assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);

    let settings = settings.with_overrides(None, Some(3));
    assert_eq!(settings.timeout_secs, 3);
}

#[test]
fn test_path_in_expands_tilde() {
    let path = Settings::path_in("~/.config/phishlens/");
    assert!(path.ends_with(".config/phishlens/config.json"));
    assert!(!path.to_string_lossy().starts_with('~'));
}
