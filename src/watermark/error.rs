//! Watermark error types.
//!
//! Every variant is terminal for the composite request that produced it:
//! nothing is retried and no partial output is returned.

use crate::encoder::EncodeError;
use crate::resource::LoadError;
use thiserror::Error;

/// Errors that can occur while compositing watermarks onto an image.
#[derive(Error, Debug)]
pub enum WatermarkError {
    /// The source image or a watermark image could not be resolved or decoded.
    #[error("Failed to load {what}: {source}")]
    ResourceLoad {
        what: &'static str,
        #[source]
        source: LoadError,
    },

    /// The watermark image is present but not usable for drawing.
    #[error("Invalid watermark image: decoded size is {width}x{height}")]
    InvalidWatermarkImage { width: u32, height: u32 },

    /// The raster surface could not be allocated.
    #[error("Failed to create {width}x{height} drawing surface")]
    SurfaceCreation { width: u32, height: u32 },

    /// Serialization of the finished surface failed.
    #[error("Failed to encode {format}: {message}")]
    Encode { format: String, message: String },

    /// A request could not be parsed or was used incorrectly.
    #[error("Invalid composite request: {0}")]
    InvalidRequest(String),

    /// Construction-time setup failed (fonts, HTTP client, configuration).
    #[error("Watermark configuration error: {0}")]
    Config(String),

    /// The request did not finish within the configured timeout.
    #[error("Composite request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl WatermarkError {
    pub(crate) fn source_load(source: LoadError) -> Self {
        Self::ResourceLoad {
            what: "source image",
            source,
        }
    }

    /// Map a watermark-image load failure.
    ///
    /// A handle that resolved but has a zero dimension is reported as an invalid
    /// watermark image rather than a load failure.
    pub(crate) fn watermark_load(source: LoadError) -> Self {
        match source {
            LoadError::EmptyImage { width, height } => {
                Self::InvalidWatermarkImage { width, height }
            }
            other => Self::ResourceLoad {
                what: "watermark image",
                source: other,
            },
        }
    }

    pub(crate) fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Short stable name of the error kind, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ResourceLoad { .. } => "resource_load",
            Self::InvalidWatermarkImage { .. } => "invalid_watermark_image",
            Self::SurfaceCreation { .. } => "surface_creation",
            Self::Encode { .. } => "encode",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Config(_) => "config",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<EncodeError> for WatermarkError {
    fn from(err: EncodeError) -> Self {
        Self::Encode {
            format: err.format_name(),
            message: err.to_string(),
        }
    }
}
