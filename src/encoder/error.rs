//! Encoding error types.

use thiserror::Error;

/// Errors raised while serializing a finished surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The requested MIME type has no encoder.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// Pixel buffer does not match the stated dimensions.
    #[error("Invalid pixel buffer: expected {expected} bytes for {width}x{height}, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// The codec rejected the image.
    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed {
        format: &'static str,
        message: String,
    },
}

impl EncodeError {
    pub fn encode_failed(format: &'static str, message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            format,
            message: message.into(),
        }
    }

    /// Short name of the format involved, for error reporting.
    pub fn format_name(&self) -> String {
        match self {
            Self::UnsupportedFormat(mime) => mime.clone(),
            Self::InvalidBuffer { .. } => "raw".to_string(),
            Self::EncodeFailed { format, .. } => format.to_string(),
        }
    }
}
