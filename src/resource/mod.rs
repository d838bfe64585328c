//! Image resources: references, decoded handles and loading.
//!
//! A [`ResourceRef`] names where an image comes from. A [`ResourceLoader`]
//! turns it into a [`DecodedImage`] with known, non-zero dimensions.
//! [`ImageResource`] tracks one reference through `Pending -> Ready | Failed`.
//!
//! # Supported references
//!
//! - `https://...` / `http://...` - fetched over HTTP
//! - `data:image/png;base64,...` - inline data URL
//! - `blob:canvas-watermark/...` - output registered in an [`ObjectUrlStore`]
//! - any other `scheme://` URL - classified as a URL and rejected by the loader
//! - any other string - filesystem path (`file://` prefix optional)
//! - encoded bytes or a pre-decoded image supplied in memory

pub mod error;
pub mod decoded;
pub mod loader;
pub mod object_url;

pub use decoded::DecodedImage;
pub use error::LoadError;
pub use loader::{DefaultResourceLoader, LoaderConfig};
pub use object_url::{ObjectUrlStore, StoredObject, OBJECT_URL_PREFIX};

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::path::PathBuf;

/// Where an image comes from.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum ResourceRef {
    /// `http(s)://`, `data:` or `blob:` URL.
    Url(String),
    /// Image file on disk.
    Path(PathBuf),
    /// Encoded image bytes (PNG, JPEG, ...).
    Bytes(Bytes),
    /// Image already decoded by the caller.
    Decoded(DecodedImage),
}

/// Lowercased URL scheme of `reference`, if it has one.
///
/// `data:` and `blob:` need only the colon; every other scheme must be
/// followed by `//`, so drive letters such as `C:\logo.png` stay paths.
pub fn url_scheme(reference: &str) -> Option<String> {
    let (scheme, rest) = reference.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return None;
    }

    let scheme = scheme.to_ascii_lowercase();
    if rest.starts_with("//") || scheme == "data" || scheme == "blob" {
        Some(scheme)
    } else {
        None
    }
}

impl ResourceRef {
    /// Classify a reference string.
    ///
    /// Schemes match case-insensitively. `file://` becomes a path and any
    /// other scheme becomes a URL, even one no loader can fetch.
    pub fn parse(reference: &str) -> Self {
        match url_scheme(reference).as_deref() {
            Some("file") => ResourceRef::Path(PathBuf::from(&reference["file://".len()..])),
            Some(_) => ResourceRef::Url(reference.to_string()),
            None => ResourceRef::Path(PathBuf::from(reference)),
        }
    }

    /// Lowercased scheme of a URL reference.
    pub fn scheme(&self) -> Option<String> {
        match self {
            ResourceRef::Url(url) => url_scheme(url),
            _ => None,
        }
    }

    /// Key for caching the decoded result, if this reference is cacheable.
    ///
    /// Only remote URLs and file paths are cached. Inline data, object URLs and
    /// in-memory images are already local.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            ResourceRef::Url(url) if matches!(self.scheme().as_deref(), Some("http" | "https")) => {
                Some(url.clone())
            }
            ResourceRef::Path(path) => Some(format!("file://{}", path.display())),
            _ => None,
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            ResourceRef::Url(url) if self.scheme().as_deref() == Some("data") => {
                let header = url.split(',').next().unwrap_or("data:");
                format!("{header},... ({} bytes)", url.len())
            }
            ResourceRef::Url(url) => url.clone(),
            ResourceRef::Path(path) => path.display().to_string(),
            ResourceRef::Bytes(bytes) => format!("<{} encoded bytes>", bytes.len()),
            ResourceRef::Decoded(image) => {
                let (w, h) = image.dimensions();
                format!("<decoded {w}x{h}>")
            }
        }
    }
}

impl std::fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResourceRef").field(&self.describe()).finish()
    }
}

impl From<String> for ResourceRef {
    fn from(reference: String) -> Self {
        Self::parse(&reference)
    }
}

impl From<&str> for ResourceRef {
    fn from(reference: &str) -> Self {
        Self::parse(reference)
    }
}

impl From<PathBuf> for ResourceRef {
    fn from(path: PathBuf) -> Self {
        ResourceRef::Path(path)
    }
}

impl From<Bytes> for ResourceRef {
    fn from(bytes: Bytes) -> Self {
        ResourceRef::Bytes(bytes)
    }
}

impl From<Vec<u8>> for ResourceRef {
    fn from(bytes: Vec<u8>) -> Self {
        ResourceRef::Bytes(Bytes::from(bytes))
    }
}

impl From<DecodedImage> for ResourceRef {
    fn from(image: DecodedImage) -> Self {
        ResourceRef::Decoded(image)
    }
}

impl From<image::RgbaImage> for ResourceRef {
    fn from(image: image::RgbaImage) -> Self {
        ResourceRef::Decoded(DecodedImage::new(image))
    }
}

impl From<image::DynamicImage> for ResourceRef {
    fn from(image: image::DynamicImage) -> Self {
        ResourceRef::Decoded(DecodedImage::from(image))
    }
}

/// Resolves references into decoded images.
///
/// Implementations must never return an image with a zero dimension; such an
/// image is reported as [`LoadError::EmptyImage`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, resource: &ResourceRef) -> Result<DecodedImage, LoadError>;
}

/// Loading state of one resource.
#[derive(Debug, Clone)]
pub enum ResourceState {
    Pending,
    Ready(DecodedImage),
    Failed(LoadError),
}

/// One resource moving through `Pending -> Ready | Failed`.
///
/// A pre-decoded reference starts out settled: `Ready` when it has pixels,
/// `Failed` when it does not. A settled resource never loads again.
#[derive(Debug)]
pub struct ImageResource {
    reference: ResourceRef,
    state: ResourceState,
}

impl ImageResource {
    pub fn new(reference: ResourceRef) -> Self {
        let state = match &reference {
            ResourceRef::Decoded(image) if image.is_empty() => {
                let (width, height) = image.dimensions();
                ResourceState::Failed(LoadError::EmptyImage { width, height })
            }
            ResourceRef::Decoded(image) => ResourceState::Ready(image.clone()),
            _ => ResourceState::Pending,
        };
        Self { reference, state }
    }

    pub fn reference(&self) -> &ResourceRef {
        &self.reference
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    /// Settle the resource, loading it if it is still pending.
    pub async fn resolve<L>(&mut self, loader: &L) -> Result<DecodedImage, LoadError>
    where
        L: ResourceLoader + ?Sized,
    {
        if let ResourceState::Pending = self.state {
            self.state = match loader.load(&self.reference).await {
                Ok(image) if image.is_empty() => {
                    let (width, height) = image.dimensions();
                    ResourceState::Failed(LoadError::EmptyImage { width, height })
                }
                Ok(image) => ResourceState::Ready(image),
                Err(err) => ResourceState::Failed(err),
            };
        }

        match &self.state {
            ResourceState::Ready(image) => Ok(image.clone()),
            ResourceState::Failed(err) => Err(err.clone()),
            ResourceState::Pending => Err(LoadError::UnsupportedSource(self.reference.describe())),
        }
    }
}
