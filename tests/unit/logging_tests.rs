// Logging module unit tests
//
// The global subscriber can only be installed once per process, so every
// test that installs one tolerates an earlier install.

use canvas_watermark::logging::*;
use canvas_watermark::watermark::{CompositeRequest, Compositor, TextWatermark};
use canvas_watermark::Config;
use image::{Rgba, RgbaImage};

/// Test: logging section of the main config file
#[test]
fn test_logging_section_parses_from_config() {
    let config = Config::from_yaml_with_env("logging:\n  level: canvas_watermark=debug\n  format: compact\n")
        .unwrap();

    assert_eq!(config.logging.level, "canvas_watermark=debug");
    assert_eq!(config.logging.format, LogFormat::Compact);
}

/// Test: every format builds a subscriber and a composite logs through it
#[tokio::test]
async fn test_composite_runs_with_subscriber_installed() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
    };
    match init_subscriber(&config) {
        Ok(()) | Err(LoggingError::Init(_)) => {}
        Err(err) => panic!("unexpected logging error: {err}"),
    }

    let compositor = Compositor::new().unwrap();
    let source = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
    compositor
        .composite(&CompositeRequest::new(source, TextWatermark::new("log")))
        .await
        .unwrap();

    assert!(matches!(init_subscriber(&config), Err(LoggingError::Init(_))));
}

/// Test: an invalid directive is reported with the directive text
#[test]
fn test_invalid_directive_is_reported() {
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    let config = LoggingConfig {
        level: "canvas_watermark=nonsense".to_string(),
        format: LogFormat::Pretty,
    };
    match config.env_filter() {
        Err(LoggingError::InvalidFilter { directive, .. }) => assert_eq!(directive, "canvas_watermark=nonsense"),
        other => panic!("expected invalid filter, got {other:?}"),
    }
}
