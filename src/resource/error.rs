//! Error types for resource loading

use thiserror::Error;

/// Why a resource could not be turned into a decoded image.
///
/// Cloneable so a failed resource can report the same error every time it is
/// asked, without loading again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("HTTP fetch failed: {0}")]
    Http(String),

    #[error("HTTP request for {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Object URL is not registered: {0}")]
    UnknownObjectUrl(String),

    #[error("Loading from file paths is disabled: {0}")]
    FileAccessDisabled(String),

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image of {width}x{height} exceeds the limit of {max_pixels} pixels")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        LoadError::Http(err.to_string())
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

impl From<image::ImageError> for LoadError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => LoadError::UnsupportedFormat(e.to_string()),
            other => LoadError::Decode(other.to_string()),
        }
    }
}
