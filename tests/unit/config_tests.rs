// Config module unit tests

use canvas_watermark::config::*;
use canvas_watermark::watermark::{CompositeRequest, Compositor, TextWatermark, WatermarkError};
use canvas_watermark::DecodedImage;
use image::{Rgba, RgbaImage};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

fn bundled_font(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("src/watermark/fonts")
        .join(name)
}

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_compositor_from_config_file() {
    let yaml = format!(
        r#"
output:
  format: image/jpeg
  quality: 0.7
fonts:
  - family: Brand Sans
    regular: {}
    bold: {}
timeout_seconds: 12
logging:
  level: warn
"#,
        bundled_font("DejaVuSans.ttf").display(),
        bundled_font("DejaVuSans-Bold.ttf").display(),
    );
    let file = write_config(&yaml);

    let config = Config::from_file(file.path()).unwrap();
    let compositor = Compositor::from_config(&config).unwrap();

    assert_eq!(compositor.timeout(), Some(Duration::from_secs(12)));
    assert!(compositor.fonts().contains("Brand Sans"));
    assert!(compositor.fonts().contains("brand sans"));
}

#[tokio::test]
async fn test_configured_output_defaults_apply() {
    let mut config = Config::default();
    config.output.format = "image/jpeg".to_string();

    let compositor = Compositor::from_config(&config).unwrap();
    let source = DecodedImage::new(RgbaImage::from_pixel(16, 16, Rgba([90, 90, 90, 255])));
    let result = compositor
        .composite(&CompositeRequest::new(source, TextWatermark::new("c")))
        .await
        .unwrap();

    assert_eq!(result.mime_type, "image/jpeg");
    assert_eq!(&result.bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_invalid_config_is_rejected_by_compositor() {
    let mut config = Config::default();
    config.output.format = "image/avif".to_string();

    let err = Compositor::from_config(&config).unwrap_err();
    assert!(matches!(err, WatermarkError::Config(ref message) if message.contains("image/avif")));
}

#[test]
fn test_missing_font_file_is_a_config_error() {
    let config = Config {
        fonts: vec![FontConfig {
            family: "Ghost".to_string(),
            regular: PathBuf::from("/no/such/font.ttf"),
            bold: None,
        }],
        ..Config::default()
    };

    let err = Compositor::from_config(&config).unwrap_err();
    assert_eq!(err.kind(), "config");
}

#[test]
fn test_loader_settings_round_trip_through_yaml() {
    let config = Config::from_yaml_with_env(
        "loader:\n  max_cache_entries: 5\n  allow_file_paths: false\n",
    )
    .unwrap();

    assert_eq!(config.loader.max_cache_entries, 5);
    assert_eq!(config.loader.cache_ttl_seconds, 3600);
    assert!(!config.loader.allow_file_paths);
    assert!(!config.loader.to_loader_config().allow_file_paths);
}

#[test]
fn test_env_substitution_in_output_format() {
    std::env::set_var("CANVAS_WM_TEST_OUTPUT_FORMAT", "image/webp");

    let config = Config::from_yaml_with_env("output:\n  format: ${CANVAS_WM_TEST_OUTPUT_FORMAT}\n")
        .unwrap();
    assert_eq!(config.output.format, "image/webp");
    config.validate().unwrap();

    std::env::remove_var("CANVAS_WM_TEST_OUTPUT_FORMAT");
}

#[tokio::test]
async fn test_object_url_capacity_bounds_retained_results() {
    let config = Config::from_yaml_with_env("output:\n  max_object_urls: 2\n").unwrap();
    let compositor = Compositor::from_config(&config).unwrap();
    assert_eq!(compositor.object_urls().capacity(), Some(2));

    let source = DecodedImage::new(RgbaImage::from_pixel(12, 12, Rgba([30, 60, 90, 255])));
    let mut urls = Vec::new();
    for label in ["a", "b", "c"] {
        let result = compositor
            .composite(&CompositeRequest::new(source.clone(), TextWatermark::new(label)))
            .await
            .unwrap();
        urls.push(result.url.clone());
    }

    assert_eq!(compositor.object_urls().len(), 2);
    assert!(compositor.object_urls().get(&urls[0]).is_none());
    assert!(compositor.object_urls().get(&urls[2]).is_some());
}

#[test]
fn test_object_urls_unbounded_by_default() {
    let compositor = Compositor::from_config(&Config::default()).unwrap();
    assert_eq!(compositor.object_urls().capacity(), None);
}
