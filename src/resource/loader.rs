//! Default resource loader with caching.
//!
//! Fetches images over HTTP, from `data:` and `blob:` URLs, from disk or from
//! in-memory bytes, decodes them to RGBA and caches remote and file images in
//! memory for reuse across composite requests.
//!
//! # Example
//!
//! ```ignore
//! use canvas_watermark::resource::{DefaultResourceLoader, LoaderConfig, ObjectUrlStore};
//! use canvas_watermark::resource::{ResourceLoader, ResourceRef};
//!
//! let loader = DefaultResourceLoader::new(LoaderConfig::default(), ObjectUrlStore::new())?;
//! let logo = loader.load(&ResourceRef::parse("https://cdn.example.com/logo.png")).await?;
//! ```

use super::{DecodedImage, LoadError, ObjectUrlStore, ResourceLoader, ResourceRef};
use crate::watermark::WatermarkError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::ImageFormat;
use moka::future::Cache;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Configuration for the default loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of cached images.
    pub max_cache_entries: u64,
    /// Time-to-live for cached images.
    pub cache_ttl: Duration,
    /// Timeout for one HTTP fetch.
    pub http_timeout: Duration,
    /// Largest accepted image, in pixels (width * height).
    pub max_pixels: u64,
    /// Whether plain strings may be read as filesystem paths.
    pub allow_file_paths: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_cache_entries: 100,
            cache_ttl: Duration::from_secs(3600),
            http_timeout: Duration::from_secs(30),
            max_pixels: 100_000_000,
            allow_file_paths: true,
        }
    }
}

/// Loader for every [`ResourceRef`] kind, with an in-memory decode cache.
#[derive(Clone)]
pub struct DefaultResourceLoader {
    cache: Cache<String, DecodedImage>,
    http_client: reqwest::Client,
    object_urls: ObjectUrlStore,
    config: LoaderConfig,
}

impl DefaultResourceLoader {
    /// Create a loader.
    ///
    /// # Errors
    ///
    /// Returns `WatermarkError::Config` if the HTTP client cannot be created.
    pub fn new(config: LoaderConfig, object_urls: ObjectUrlStore) -> Result<Self, WatermarkError> {
        let cache = Cache::builder()
            .max_capacity(config.max_cache_entries)
            .time_to_live(config.cache_ttl)
            .build();

        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| WatermarkError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            cache,
            http_client,
            object_urls,
            config,
        })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Number of cached images.
    pub async fn cache_size(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Clear all cached images.
    pub async fn clear_cache(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Check whether a reference is currently cached.
    pub fn is_cached(&self, resource: &ResourceRef) -> bool {
        resource
            .cache_key()
            .map(|key| self.cache.contains_key(&key))
            .unwrap_or(false)
    }

    async fn load_uncached(&self, resource: &ResourceRef) -> Result<DecodedImage, LoadError> {
        match resource {
            ResourceRef::Url(url) => match resource.scheme().as_deref() {
                Some("data") => {
                    let (data, mime) = parse_data_url(url)?;
                    self.decode(&data, mime.as_deref().unwrap_or(""))
                }
                Some("blob") => {
                    // Registered URLs always carry a lowercase scheme.
                    let normalized = format!("blob:{}", &url["blob:".len()..]);
                    let object = self
                        .object_urls
                        .get(&normalized)
                        .ok_or_else(|| LoadError::UnknownObjectUrl(url.clone()))?;
                    self.decode(&object.bytes, &object.mime_type)
                }
                Some("http" | "https") => {
                    let data = self.fetch_http(url).await?;
                    self.decode(&data, url)
                }
                _ => Err(LoadError::UnsupportedSource(url.clone())),
            },
            ResourceRef::Path(path) => {
                if !self.config.allow_file_paths {
                    return Err(LoadError::FileAccessDisabled(path.display().to_string()));
                }
                let data = tokio::fs::read(path).await?;
                self.decode(&data, &path.to_string_lossy())
            }
            ResourceRef::Bytes(bytes) => self.decode(bytes, ""),
            ResourceRef::Decoded(image) => Ok(image.clone()),
        }
    }

    /// Fetch image bytes over HTTP.
    async fn fetch_http(&self, url: &str) -> Result<bytes::Bytes, LoadError> {
        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(LoadError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }

    fn decode(&self, data: &[u8], hint: &str) -> Result<DecodedImage, LoadError> {
        decode_image(data, hint, self.config.max_pixels)
    }
}

#[async_trait]
impl ResourceLoader for DefaultResourceLoader {
    async fn load(&self, resource: &ResourceRef) -> Result<DecodedImage, LoadError> {
        let cache_key = resource.cache_key();

        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get(key).await {
                tracing::debug!(resource = %key, "Resource cache hit");
                return Ok(cached);
            }
        }

        let image = self.load_uncached(resource).await?;
        if image.is_empty() {
            let (width, height) = image.dimensions();
            return Err(LoadError::EmptyImage { width, height });
        }

        tracing::debug!(
            resource = %resource.describe(),
            width = image.width(),
            height = image.height(),
            "Resource decoded"
        );

        if let Some(key) = cache_key {
            self.cache.insert(key, image.clone()).await;
        }

        Ok(image)
    }
}

/// Split a `data:` URL into its decoded payload and MIME type.
///
/// Only base64 payloads are accepted.
pub fn parse_data_url(url: &str) -> Result<(Vec<u8>, Option<String>), LoadError> {
    let rest = url
        .get(.."data:".len())
        .filter(|scheme| scheme.eq_ignore_ascii_case("data:"))
        .map(|_| &url["data:".len()..])
        .ok_or_else(|| LoadError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| LoadError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params = header.split(';');
    let mime = params
        .next()
        .filter(|m| !m.is_empty())
        .map(|m| m.to_ascii_lowercase());
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(LoadError::InvalidDataUrl(
            "only base64 payloads are supported".to_string(),
        ));
    }

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|e| LoadError::InvalidDataUrl(e.to_string()))?;
    Ok((data, mime))
}

/// Decode image bytes, rejecting images above `max_pixels`.
///
/// `hint` is a file name, URL or MIME type used when the bytes carry no
/// recognizable signature.
pub fn decode_image(data: &[u8], hint: &str, max_pixels: u64) -> Result<DecodedImage, LoadError> {
    let format = detect_image_format(data, hint)?;

    let (width, height) = image::io::Reader::with_format(Cursor::new(data), format)
        .into_dimensions()
        .map_err(LoadError::from)?;
    if (width as u64) * (height as u64) > max_pixels {
        return Err(LoadError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }

    let image = image::load_from_memory_with_format(data, format)?;
    Ok(DecodedImage::from(image))
}

/// Detect image format from magic bytes, then from the hint's extension or MIME type.
fn detect_image_format(data: &[u8], hint: &str) -> Result<ImageFormat, LoadError> {
    if let Ok(format) = image::guess_format(data) {
        return Ok(format);
    }

    if let Some(format) = ImageFormat::from_mime_type(hint) {
        return Ok(format);
    }

    let without_query = hint.split(|c: char| c == '?' || c == '#').next().unwrap_or(hint);
    Path::new(without_query)
        .extension()
        .and_then(ImageFormat::from_extension)
        .ok_or_else(|| {
            LoadError::UnsupportedFormat(if hint.is_empty() {
                "unrecognized image signature".to_string()
            } else {
                format!("cannot determine format of {hint}")
            })
        })
}
