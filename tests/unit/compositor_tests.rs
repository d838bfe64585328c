// Compositor module unit tests

use async_trait::async_trait;
use canvas_watermark::resource::{LoadError, ObjectUrlStore};
use canvas_watermark::watermark::*;
use canvas_watermark::{DecodedImage, ResourceLoader, ResourceRef};
use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn solid(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
    DecodedImage::new(RgbaImage::from_pixel(width, height, Rgba(color)))
}

fn decode(result: &WatermarkResult) -> RgbaImage {
    image::load_from_memory(&result.bytes).unwrap().to_rgba8()
}

/// Loader that serves one image for every reference after a delay.
struct SlowLoader {
    delay: Duration,
    image: DecodedImage,
    calls: AtomicUsize,
}

#[async_trait]
impl ResourceLoader for SlowLoader {
    async fn load(&self, _resource: &ResourceRef) -> Result<DecodedImage, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.image.clone())
    }
}

#[tokio::test]
async fn test_composite_times_out() {
    let loader = Arc::new(SlowLoader {
        delay: Duration::from_secs(5),
        image: solid(10, 10, [0, 0, 0, 255]),
        calls: AtomicUsize::new(0),
    });
    let compositor = Compositor::new()
        .unwrap()
        .with_loader(loader.clone())
        .with_timeout(Duration::from_millis(20));

    let request = CompositeRequest::new("https://cdn.example.com/photo.jpg", TextWatermark::new("x"));
    let err = compositor.composite(&request).await.unwrap_err();

    assert!(matches!(err, WatermarkError::Timeout(limit) if limit == Duration::from_millis(20)));
    assert_eq!(err.kind(), "timeout");
    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    assert!(compositor.object_urls().is_empty());
}

#[tokio::test]
async fn test_custom_loader_serves_every_reference() {
    let loader = Arc::new(SlowLoader {
        delay: Duration::ZERO,
        image: solid(64, 48, [200, 200, 200, 255]),
        calls: AtomicUsize::new(0),
    });
    let compositor = Compositor::new().unwrap().with_loader(loader.clone());

    let request = CompositeRequest::new(
        "https://cdn.example.com/photo.jpg",
        Watermarks::new(vec![
            ImageWatermark::new("https://cdn.example.com/logo.png")
                .with_size(16.0, 16.0)
                .into(),
            TextWatermark::new("Draft").into(),
        ]),
    );
    let result = compositor.composite(&request).await.unwrap();

    assert_eq!((result.width, result.height), (64, 48));
    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_job_reports_progress_states() {
    let compositor = Compositor::new().unwrap();
    let request = CompositeRequest::new(solid(30, 30, [255, 255, 255, 255]), TextWatermark::new("a"));

    let mut job = compositor.job(&request);
    assert_eq!(job.state(), &CompositeState::Idle);
    assert!(!job.state().is_terminal());

    job.run().await.unwrap();
    assert_eq!(job.state(), &CompositeState::Done);
    assert!(job.state().is_terminal());
}

#[tokio::test]
async fn test_request_defaults_come_from_compositor() {
    let compositor = Compositor::new()
        .unwrap()
        .with_output_defaults("image/jpeg", 0.5);
    let request = CompositeRequest::new(solid(20, 20, [10, 20, 30, 255]), TextWatermark::new("a"));

    let result = compositor.composite(&request).await.unwrap();
    assert_eq!(result.mime_type, "image/jpeg");
    assert!(result.url.starts_with("blob:"));

    let request = request.with_output_format("image/webp");
    let result = compositor.composite(&request).await.unwrap();
    assert_eq!(result.mime_type, "image/webp");
    assert_eq!(&result.bytes[8..12], b"WEBP");
}

#[tokio::test]
async fn test_result_url_is_a_valid_source() {
    let compositor = Compositor::new().unwrap();
    let first = compositor
        .composite(&CompositeRequest::new(
            solid(40, 20, [0, 128, 0, 255]),
            TextWatermark::new("one"),
        ))
        .await
        .unwrap();

    let second = compositor
        .composite(&CompositeRequest::new(
            first.url.as_str(),
            TextWatermark::new("two").with_position("top-left"),
        ))
        .await
        .unwrap();
    assert_eq!((second.width, second.height), (40, 20));
    assert_eq!(compositor.object_urls().len(), 2);

    assert!(first.revoke());
    assert!(!first.revoke());
    assert_eq!(compositor.object_urls().len(), 1);
}

#[tokio::test]
async fn test_huge_font_size_composites() {
    let compositor = Compositor::new().unwrap();
    let watermarks = Watermarks::new(vec![
        TextWatermark::new("Copyright").with_font_size(60000.0).into(),
        TextWatermark::new("DRAFT")
            .with_font_size(5000.0)
            .with_rotation(-30.0)
            .repeated(40.0)
            .into(),
    ]);
    let request = CompositeRequest::new(solid(120, 80, [255, 255, 255, 255]), watermarks)
        .with_output_format("image/png");

    let result = compositor.composite(&request).await.unwrap();

    assert_eq!((result.width, result.height), (120, 80));
    assert_eq!(decode(&result).dimensions(), (120, 80));
}

#[tokio::test]
async fn test_base64_matches_bytes() {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let compositor = Compositor::new().unwrap();
    let result = compositor
        .composite(&CompositeRequest::new(
            solid(8, 8, [1, 2, 3, 255]),
            TextWatermark::new("x"),
        ))
        .await
        .unwrap();

    let expected = format!("data:image/png;base64,{}", STANDARD.encode(&result.bytes));
    assert_eq!(result.base64, expected);
    assert_eq!(to_data_url("image/png", &result.bytes), expected);
}

#[tokio::test]
async fn test_yaml_request_with_mixed_watermarks() {
    let store = ObjectUrlStore::new();
    let logo_png = {
        let mut buffer = std::io::Cursor::new(Vec::new());
        RgbaImage::from_pixel(12, 12, Rgba([255, 0, 0, 255]))
            .write_to(&mut buffer, image::ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    };
    let logo_url = store.create(logo_png.into(), "image/png");

    let yaml = format!(
        r#"
source: "{logo_url}"
output_format: image/png
watermarks:
  - type: text
    text: "Sample"
    font_size: 10
    rotate: -45
    repeat: true
    repeat_spacing: 5
  - type: image
    image: "{logo_url}"
    width: 4
    height: 4
    opacity: 1
    position: center
"#
    );
    let request = CompositeRequest::from_yaml(&yaml).unwrap();
    assert_eq!(request.watermarks.len(), 2);

    let loader = canvas_watermark::resource::DefaultResourceLoader::new(
        canvas_watermark::resource::LoaderConfig::default(),
        store.clone(),
    )
    .unwrap();
    let compositor = Compositor::new().unwrap().with_loader(Arc::new(loader));

    let output = decode(&compositor.composite(&request).await.unwrap());
    assert_eq!(output.dimensions(), (12, 12));
    assert_eq!(output.get_pixel(6, 6).0, [255, 0, 0, 255]);
}

#[tokio::test]
async fn test_invalid_json_request() {
    let err = CompositeRequest::from_json(r#"{"watermarks": []}"#).unwrap_err();
    assert!(matches!(err, WatermarkError::InvalidRequest(_)));

    let err = CompositeRequest::from_json(
        r#"{"source": "a.png", "watermarks": {"type": "video", "src": "x"}}"#,
    )
    .unwrap_err();
    assert_eq!(err.kind(), "invalid_request");
}
