//! Output encoding.
//!
//! Turns a finished surface into PNG, JPEG or WebP bytes. The format is picked
//! from a MIME type; there is no fallback when the MIME type is unsupported.
//!
//! # Example
//!
//! ```
//! use canvas_watermark::encoder::{encode_rgba, OutputFormat};
//! use image::{Rgba, RgbaImage};
//!
//! let image = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
//! let encoded = encode_rgba(&image, "image/png", 0.92).unwrap();
//! assert_eq!(encoded.format, OutputFormat::Png);
//! ```

pub mod codecs;
pub mod error;
pub mod format;

pub use codecs::{EncodedImage, EncoderFactory, ImageEncoder, JpegEncoder, PngEncoder, WebPEncoder};
pub use error::EncodeError;
pub use format::{EncoderQuality, OutputFormat, DEFAULT_QUALITY};

use image::RgbaImage;

/// Encode `image` as `mime_type`, with `quality` in `[0, 1]` for lossy formats.
pub fn encode_rgba(
    image: &RgbaImage,
    mime_type: &str,
    quality: f32,
) -> Result<EncodedImage, EncodeError> {
    let encoder = EncoderFactory::for_mime(mime_type)?;
    let encoded = encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        EncoderQuality::from_unit(quality),
    )?;

    tracing::debug!(
        format = encoded.format.as_str(),
        width = image.width(),
        height = image.height(),
        bytes = encoded.data.len(),
        "Encoded image"
    );
    Ok(encoded)
}
