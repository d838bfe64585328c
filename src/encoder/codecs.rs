//! Encoder implementations backed by the `image` crate.

use super::error::EncodeError;
use super::format::{EncoderQuality, OutputFormat};
use image::ImageEncoder as _;
use std::io::Cursor;

/// Result of encoding an image
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    /// MIME type of `data`
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }
}

/// Trait for image encoders
///
/// Input is straight-alpha RGBA, 4 bytes per pixel, row-major.
pub trait ImageEncoder: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError>;

    fn supports_transparency(&self) -> bool;
}

fn check_buffer(data: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(EncodeError::InvalidBuffer {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// JPEG encoder; transparent pixels are flattened onto black.
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;

        check_buffer(data, width, height)?;
        let rgb_data = flatten_onto_black(data);

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, quality.quality);

        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8)
            .map_err(|e| EncodeError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Jpeg))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;

        check_buffer(data, width, height)?;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| EncodeError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// WebP encoder
///
/// The `image` crate only writes lossless WebP, so quality is ignored.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::WebP
    }

    fn encode(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;

        check_buffer(data, width, height)?;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageWebPEncoder::new_lossless(&mut output);

        encoder
            .write_image(data, width, height, image::ColorType::Rgba8)
            .map_err(|e| EncodeError::encode_failed("webp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::WebP))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: OutputFormat) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Png => Box::new(PngEncoder),
            OutputFormat::Jpeg => Box::new(JpegEncoder),
            OutputFormat::WebP => Box::new(WebPEncoder),
        }
    }

    /// Encoder for a MIME type such as `image/jpeg`.
    pub fn for_mime(mime: &str) -> Result<Box<dyn ImageEncoder>, EncodeError> {
        OutputFormat::from_mime(mime).map(Self::create)
    }
}

/// Convert RGBA to RGB, compositing over black.
fn flatten_onto_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);

    for chunk in rgba.chunks_exact(4) {
        let a = chunk[3] as u16;
        for &c in &chunk[..3] {
            rgb.push(((c as u16 * a + 127) / 255) as u8);
        }
    }

    rgb
}
