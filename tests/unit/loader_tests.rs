// Resource loader unit tests

use canvas_watermark::resource::*;
use canvas_watermark::watermark::{CompositeRequest, Compositor, ImageWatermark, TextWatermark};
use canvas_watermark::WatermarkError;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::{Cursor, Write};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    RgbaImage::from_pixel(width, height, Rgba(color))
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

/// Serve one canned HTTP response per connection, forever.
async fn serve(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 1024];
                let _ = stream.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_image_is_fetched_and_cached() {
    let base = serve("200 OK", png_bytes(5, 3, [1, 2, 3, 255])).await;
    let loader = DefaultResourceLoader::new(LoaderConfig::default(), ObjectUrlStore::new()).unwrap();

    let reference = ResourceRef::parse(&format!("{base}/logo.png"));
    let image = loader.load(&reference).await.unwrap();

    assert_eq!(image.dimensions(), (5, 3));
    assert!(loader.is_cached(&reference));
}

#[tokio::test]
async fn test_http_error_status() {
    let base = serve("404 Not Found", Vec::new()).await;
    let loader = DefaultResourceLoader::new(LoaderConfig::default(), ObjectUrlStore::new()).unwrap();

    let url = format!("{base}/missing.png");
    let err = loader.load(&ResourceRef::parse(&url)).await.unwrap_err();

    assert_eq!(err, LoadError::HttpStatus { url, status: 404 });
}

#[tokio::test]
async fn test_image_resource_settles_once() {
    let mut resource = ImageResource::new(ResourceRef::parse("/no/such/logo.png"));
    assert!(matches!(resource.state(), ResourceState::Pending));

    let loader = DefaultResourceLoader::new(LoaderConfig::default(), ObjectUrlStore::new()).unwrap();
    let first = resource.resolve(&loader).await.unwrap_err();
    assert!(matches!(resource.state(), ResourceState::Failed(_)));

    let second = resource.resolve(&loader).await.unwrap_err();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_pre_decoded_handles_are_settled() {
    let ready = ImageResource::new(ResourceRef::from(RgbaImage::new(2, 2)));
    assert!(matches!(ready.state(), ResourceState::Ready(_)));

    let empty = ImageResource::new(ResourceRef::from(RgbaImage::new(0, 4)));
    assert!(matches!(
        empty.state(),
        ResourceState::Failed(LoadError::EmptyImage { width: 0, height: 4 })
    ));
}

#[tokio::test]
async fn test_source_from_file_path() {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(&png_bytes(30, 20, [255, 255, 255, 255])).unwrap();
    file.flush().unwrap();

    let compositor = Compositor::new().unwrap();
    let request = CompositeRequest::new(file.path().to_path_buf(), TextWatermark::new("f"));
    let result = compositor.composite(&request).await.unwrap();

    assert_eq!((result.width, result.height), (30, 20));
}

#[tokio::test]
async fn test_missing_source_is_a_source_load_error() {
    let compositor = Compositor::new().unwrap();
    let request = CompositeRequest::new("/no/such/photo.jpg", TextWatermark::new("f"));

    let err = compositor.composite(&request).await.unwrap_err();
    assert!(matches!(
        err,
        WatermarkError::ResourceLoad {
            what: "source image",
            source: LoadError::Io(_)
        }
    ));
}

#[tokio::test]
async fn test_oversized_watermark_is_a_watermark_load_error() {
    let store = ObjectUrlStore::new();
    let config = LoaderConfig {
        max_pixels: 100,
        ..LoaderConfig::default()
    };
    let loader = DefaultResourceLoader::new(config, store).unwrap();
    let compositor = Compositor::new().unwrap().with_loader(Arc::new(loader));

    let source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
    let logo = png_bytes(20, 20, [255, 0, 0, 255]);
    let request = CompositeRequest::new(source, ImageWatermark::new(logo));

    let err = compositor.composite(&request).await.unwrap_err();
    match err {
        WatermarkError::ResourceLoad { what, source } => {
            assert_eq!(what, "watermark image");
            assert!(matches!(source, LoadError::TooLarge { width: 20, height: 20, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_uppercase_http_scheme_is_fetched() {
    let base = serve("200 OK", png_bytes(6, 4, [9, 9, 9, 255])).await;
    let loader = DefaultResourceLoader::new(LoaderConfig::default(), ObjectUrlStore::new()).unwrap();

    let url = format!("{base}/logo.png").replacen("http://", "HTTP://", 1);
    let reference = ResourceRef::parse(&url);
    assert!(matches!(reference, ResourceRef::Url(_)));

    let image = loader.load(&reference).await.unwrap();
    assert_eq!(image.dimensions(), (6, 4));
}

#[tokio::test]
async fn test_unknown_scheme_is_unsupported_not_a_missing_file() {
    let compositor = Compositor::new().unwrap();
    let source = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
    let request = CompositeRequest::new(source, ImageWatermark::new("ftp://example.com/logo.png"));

    let err = compositor.composite(&request).await.unwrap_err();
    match err {
        WatermarkError::ResourceLoad { what, source } => {
            assert_eq!(what, "watermark image");
            assert_eq!(
                source,
                LoadError::UnsupportedSource("ftp://example.com/logo.png".to_string())
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}
