use clap::{arg, value_parser};
use phishlens::handlers::*;
use phishlens_client::ClassifierClient;
use phishlens_core::config::{DEFAULT_SERVER_URL, Settings};
use phishlens_core::report::{ReportContext, ReportFormat};
use phishlens_core::retrain::{RETRAIN_FAILED, RETRAIN_WARNING};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_context() -> ReportContext {
    ReportContext {
        url: "http://example.com".to_string(),
        status_label: "✅ URL APPEARS SAFE".to_string(),
        confidence_text: "4.00%".to_string(),
        reasons: vec!["Domain age > 5 years".to_string()],
    }
}

// ============================================================================
// check
// ============================================================================

#[tokio::test]
async fn test_analyze_url_shows_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_string_contains("url=http%3A%2F%2Fexample.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_malicious": false,
            "confidence": 0.04,
            "explanation": ["Domain age > 5 years"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let session = analyze_url(&client, "http://example.com").await.unwrap();

    let verdict = render_verdict(&session).unwrap();
    assert!(verdict.contains("URL APPEARS SAFE"));
    assert!(verdict.contains("4.00%"));
    assert!(verdict.contains("Domain age > 5 years"));
    assert_eq!(session.report_context().unwrap().url, "http://example.com");
}

#[tokio::test]
async fn test_analyze_url_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid URL format" })),
        )
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let err = analyze_url(&client, "not a url").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid URL format");
}

#[tokio::test]
async fn test_analyze_url_server_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let err = analyze_url(&client, "http://example.com").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "An error occurred while analyzing the URL."
    );
}

#[test]
fn test_risk_bar_marker() {
    assert_eq!(risk_bar(0.0, 5), "▼────");
    assert_eq!(risk_bar(50.0, 5), "──▼──");
    assert_eq!(risk_bar(100.0, 5), "────▼");
    assert_eq!(risk_bar(250.0, 5), "────▼");
}

#[test]
fn test_emit_report_to_stdout() {
    let dir = TempDir::new().unwrap();
    let emitted = emit_report(
        &sample_context(),
        ReportFormat::Json,
        None,
        &dir.path().join("report.pdf"),
    )
    .unwrap();

    match emitted {
        Emitted::Stdout(text) => {
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["url"], "http://example.com");
        }
        other => panic!("expected stdout, got {:?}", other),
    }
    assert!(!dir.path().join("report.pdf").exists());
}

#[test]
fn test_emit_pdf_defaults_to_report_path() {
    let dir = TempDir::new().unwrap();
    let default_pdf = dir.path().join("phishing-report.pdf");

    let emitted = emit_report(&sample_context(), ReportFormat::Pdf, None, &default_pdf).unwrap();

    assert_eq!(emitted, Emitted::File(default_pdf.clone()));
    assert!(fs::read(&default_pdf).unwrap().starts_with(b"%PDF-"));
}

#[test]
fn test_emit_report_to_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("report.md");

    let emitted = emit_report(
        &sample_context(),
        ReportFormat::Markdown,
        Some(&output),
        &dir.path().join("unused.pdf"),
    )
    .unwrap();

    assert_eq!(emitted, Emitted::File(output.clone()));
    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("- Domain age > 5 years"));
}

// ============================================================================
// retrain
// ============================================================================

#[tokio::test]
async fn test_retrain_after_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Model retrained on 1200 samples"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let mut shown = String::new();
    let message = retrain_model(&client, |warning| {
        shown = warning.to_string();
        true
    })
    .await
    .unwrap();

    assert_eq!(shown, RETRAIN_WARNING);
    assert_eq!(message.as_deref(), Some("Model retrained on 1200 samples"));
}

#[tokio::test]
async fn test_retrain_message_is_reported_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": RETRAIN_FAILED })))
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let message = retrain_model(&client, |_| true).await.unwrap();
    assert_eq!(message.as_deref(), Some(RETRAIN_FAILED));
}

#[tokio::test]
async fn test_declined_retrain_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let message = retrain_model(&client, |_| false).await.unwrap();
    assert_eq!(message, None);
}

#[tokio::test]
async fn test_failed_retrain_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/retrain"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ClassifierClient::new(&server.uri()).unwrap();
    let err = retrain_model(&client, |_| true).await.unwrap_err();
    assert_eq!(err.to_string(), "Error: Failed to retrain model.");
}

// ============================================================================
// init / settings
// ============================================================================

#[test]
fn test_init_config_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let dir_str = dir.path().to_string_lossy().to_string();

    let written = init_config(&dir_str, &Settings::default(), false, |_| {
        panic!("nothing to overwrite")
    })
    .unwrap()
    .unwrap();

    assert_eq!(written, dir.path().join("config.json"));
    assert_eq!(Settings::load(&written).unwrap().server_url, DEFAULT_SERVER_URL);
}

#[test]
fn test_init_config_keeps_existing_when_declined() {
    let dir = TempDir::new().unwrap();
    let dir_str = dir.path().to_string_lossy().to_string();
    let original = Settings::default().with_overrides(Some("http://kept:1"), None);
    init_config(&dir_str, &original, false, |_| true).unwrap();

    let written = init_config(&dir_str, &Settings::default(), false, |_| false).unwrap();
    assert_eq!(written, None);
    let on_disk = Settings::load(&dir.path().join("config.json")).unwrap();
    assert_eq!(on_disk.server_url, "http://kept:1");

    // --force skips the question
    init_config(&dir_str, &Settings::default(), true, |_| panic!("not asked")).unwrap();
    let on_disk = Settings::load(&dir.path().join("config.json")).unwrap();
    assert_eq!(on_disk.server_url, DEFAULT_SERVER_URL);
}

#[test]
fn test_load_settings_applies_flags() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    Settings {
        server_url: "http://from-file:5000".to_string(),
        timeout_secs: 12,
        report_path: PathBuf::from("r.pdf"),
    }
    .save(&config)
    .unwrap();

    let cmd = clap::Command::new("phishlens")
        .arg(arg!(--"config" <PATH>).value_parser(value_parser!(PathBuf)))
        .arg(arg!(--"server" <URL>))
        .arg(arg!(--"timeout" <SECONDS>).value_parser(value_parser!(u64)));
    let matches = cmd.get_matches_from([
        "phishlens",
        "--config",
        config.to_str().unwrap(),
        "--timeout",
        "3",
    ]);

    let settings = load_settings(&matches).unwrap();
    assert_eq!(settings.server_url, "http://from-file:5000");
    assert_eq!(settings.timeout_secs, 3);
}
