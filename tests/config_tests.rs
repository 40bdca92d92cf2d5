// Tests for configuration loading and widget init parameter parsing

use anyhow::Result;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use voiceform::{Config, WidgetParams};

// ============================================================================
// Widget init parameters
// ============================================================================

#[test]
fn test_params_from_full_query() {
    let params = WidgetParams::from_query(
        "questionId=q-10&questionTitle=Daily%20update&answerFieldId=fld-10\
         &webhookUrl=https%3A%2F%2Fexample.com%2Fhook&name=Jane%20Doe&email=jane@example.com",
    );

    assert_eq!(params.question_id, "q-10");
    assert_eq!(params.question_title, "Daily update");
    assert_eq!(params.answer_field_id.as_deref(), Some("fld-10"));
    assert_eq!(
        params.webhook_url.as_deref(),
        Some("https://example.com/hook")
    );
    assert_eq!(params.name.as_deref(), Some("Jane Doe"));
    assert_eq!(params.email.as_deref(), Some("jane@example.com"));
}

#[test]
fn test_params_from_empty_query_use_safe_defaults() {
    let params = WidgetParams::from_query("");

    assert_eq!(params.question_id, "voice-question");
    assert_eq!(params.question_title, "Voice Response");
    assert!(params.answer_field_id.is_none());
    assert!(params.webhook_url.is_none());
    assert!(params.name.is_none());
    assert!(params.email.is_none());
}

#[test]
fn test_params_leading_question_mark_is_tolerated() {
    let params = WidgetParams::from_query("?questionId=q-11");
    assert_eq!(params.question_id, "q-11");
}

#[test]
fn test_params_empty_values_keep_defaults() {
    let params = WidgetParams::from_query("questionId=&name=");
    assert_eq!(params.question_id, "voice-question");
    assert!(params.name.is_none());
}

#[test]
fn test_params_unknown_keys_are_ignored() {
    let params = WidgetParams::from_query("questionId=q-12&theme=dark&locale=en");
    assert_eq!(params.question_id, "q-12");
}

// ============================================================================
// Service configuration
// ============================================================================

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.service.name, "voiceform");
    assert_eq!(cfg.service.http.port, 8090);
    assert_eq!(cfg.widget.engine, "scripted");
    assert_eq!(cfg.widget.marker_phrase, "voice response");
    assert_eq!(cfg.widget.retry_delays_ms, vec![200, 500, 1000]);
    assert!(cfg.widget.webhook_url.is_none());
}

#[test]
fn test_config_load_missing_file_falls_back_to_defaults() -> Result<()> {
    let cfg = Config::load("/nonexistent/path/voiceform")?;
    assert_eq!(cfg.service.name, "voiceform");
    Ok(())
}

#[test]
fn test_config_load_from_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("voiceform.toml");

    fs::write(
        &path,
        r#"
[service]
name = "voiceform-test"

[service.http]
bind = "0.0.0.0"
port = 9999

[widget]
engine = "scripted"
marker_phrase = "spoken answer"
retry_delays_ms = [10, 20]
webhook_url = "https://example.com/hook"
"#,
    )?;

    let cfg = Config::load(dir.path().join("voiceform").to_str().unwrap())?;

    assert_eq!(cfg.service.name, "voiceform-test");
    assert_eq!(cfg.service.http.bind, "0.0.0.0");
    assert_eq!(cfg.service.http.port, 9999);
    assert_eq!(cfg.widget.marker_phrase, "spoken answer");
    assert_eq!(cfg.widget.retry_delays_ms, vec![10, 20]);
    assert_eq!(
        cfg.widget.webhook_url.as_deref(),
        Some("https://example.com/hook")
    );
    // Unspecified widget fields keep their defaults
    assert_eq!(cfg.widget.required_marker, "required");

    Ok(())
}

#[test]
fn test_resolver_config_conversion() {
    let cfg = Config::default();
    let resolver = cfg.widget.resolver_config();

    assert_eq!(resolver.marker_phrase, "voice response");
    assert_eq!(
        resolver.retry_delays,
        vec![
            Duration::from_millis(200),
            Duration::from_millis(500),
            Duration::from_millis(1000)
        ]
    );
    assert_eq!(resolver.blur_delay, Duration::from_millis(150));
}
