//! Output formats and quality settings.

use super::error::EncodeError;
use std::str::FromStr;

/// Quality used when a request gives none, or gives a value that is not a number.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Encoded output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Resolve a MIME type such as `image/png`. Matching is case-insensitive and
    /// `image/jpg` is accepted for JPEG.
    pub fn from_mime(mime: &str) -> Result<Self, EncodeError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::WebP),
            _ => Err(EncodeError::UnsupportedFormat(mime.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::WebP => "webp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Whether `quality` changes the output.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    /// Accepts a MIME type or a short name (`png`, `jpeg`, `jpg`, `webp`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            _ => Self::from_mime(s),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.content_type())
    }
}

/// Encoder quality on the `image` crate's 1-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self::from_unit(DEFAULT_QUALITY)
    }
}

impl EncoderQuality {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    /// Map a `[0, 1]` quality to `1..=100`. Values outside the range are
    /// clamped; NaN uses the default.
    pub fn from_unit(quality: f32) -> Self {
        let quality = if quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        };
        Self::with_quality((quality * 100.0).round() as u8)
    }
}
