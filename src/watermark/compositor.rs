//! Composite pipeline.
//!
//! A [`Compositor`] runs one [`CompositeRequest`] at a time per call, through
//! a linear state machine:
//!
//! ```text
//! Idle -> SourceLoading -> SourceReady -> Drawing(0..n) -> Encoding -> Done
//!              \________________\______________\______________\-> Failed
//! ```
//!
//! The source is loaded and copied onto a fresh surface of the same size.
//! Watermarks are drawn strictly in list order, each image watermark loading
//! its resource right before it is drawn. The first failure aborts the request.
//!
//! # Example
//!
//! ```no_run
//! use canvas_watermark::watermark::{CompositeRequest, Compositor, TextWatermark};
//!
//! # async fn run() -> Result<(), canvas_watermark::WatermarkError> {
//! let compositor = Compositor::new()?;
//! let request = CompositeRequest::new(
//!     "photos/beach.jpg",
//!     TextWatermark::new("Copyright").with_opacity(0.6),
//! );
//! let result = compositor.composite(&request).await?;
//! println!("{} bytes, {}", result.len(), result.url);
//! # Ok(())
//! # }
//! ```

use super::descriptor::{WatermarkDescriptor, Watermarks};
use super::position::ContainerSize;
use super::renderer::{render, PreparedWatermark};
use super::result::WatermarkResult;
use super::text_renderer::FontBook;
use super::WatermarkError;
use crate::canvas::PixmapCanvas;
use crate::config::Config;
use crate::encoder::{encode_rgba, DEFAULT_QUALITY};
use crate::resource::{
    DefaultResourceLoader, ImageResource, LoaderConfig, ObjectUrlStore, ResourceLoader,
    ResourceRef,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Output format used when neither the request nor the compositor names one.
pub const DEFAULT_OUTPUT_FORMAT: &str = "image/png";

/// One composite request.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositeRequest {
    pub source: ResourceRef,
    /// A single descriptor or a list, painted in order.
    pub watermarks: Watermarks,
    /// Output MIME type (default: the compositor's, normally `image/png`)
    #[serde(default, alias = "outputFormat")]
    pub output_format: Option<String>,
    /// Lossy quality from 0.0 to 1.0 (default: the compositor's, normally 0.92)
    #[serde(default)]
    pub quality: Option<f32>,
}

impl CompositeRequest {
    pub fn new(source: impl Into<ResourceRef>, watermarks: impl Into<Watermarks>) -> Self {
        Self {
            source: source.into(),
            watermarks: watermarks.into(),
            output_format: None,
            quality: None,
        }
    }

    pub fn with_output_format(mut self, mime_type: impl Into<String>) -> Self {
        self.output_format = Some(mime_type.into());
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, WatermarkError> {
        serde_json::from_str(json).map_err(|e| WatermarkError::InvalidRequest(e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, WatermarkError> {
        serde_yaml::from_str(yaml).map_err(|e| WatermarkError::InvalidRequest(e.to_string()))
    }
}

/// Progress of one composite job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeState {
    Idle,
    SourceLoading,
    SourceReady { width: u32, height: u32 },
    Drawing { index: usize, total: usize },
    Encoding,
    Done,
    /// `stage` is the state the job failed in, `error` the error kind.
    Failed {
        stage: &'static str,
        error: &'static str,
    },
}

impl CompositeState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SourceLoading => "source_loading",
            Self::SourceReady { .. } => "source_ready",
            Self::Drawing { .. } => "drawing",
            Self::Encoding => "encoding",
            Self::Done => "done",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed { .. })
    }
}

/// Watermark compositor.
///
/// Cheap to share: the loader cache, font book and object URL store are
/// internally synchronized, and every request gets its own surface.
///
/// Each result's encoded bytes are registered in [`Compositor::object_urls`]
/// and stay there until [`WatermarkResult::revoke`] is called. Long-running
/// callers should revoke results they are done with, or bound the store
/// with `output.max_object_urls` in [`Config`].
#[derive(Clone)]
pub struct Compositor {
    loader: Arc<dyn ResourceLoader>,
    fonts: Arc<FontBook>,
    object_urls: ObjectUrlStore,
    timeout: Option<Duration>,
    default_format: String,
    default_quality: f32,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("fonts", &self.fonts)
            .field("object_urls", &self.object_urls.len())
            .field("timeout", &self.timeout)
            .field("default_format", &self.default_format)
            .field("default_quality", &self.default_quality)
            .finish()
    }
}

impl Compositor {
    /// Compositor with the default loader and the embedded fonts.
    pub fn new() -> Result<Self, WatermarkError> {
        let object_urls = ObjectUrlStore::new();
        let loader = DefaultResourceLoader::new(LoaderConfig::default(), object_urls.clone())?;
        Ok(Self {
            loader: Arc::new(loader),
            fonts: Arc::new(FontBook::embedded()?),
            object_urls,
            timeout: None,
            default_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            default_quality: DEFAULT_QUALITY,
        })
    }

    /// Build a compositor from validated configuration.
    pub fn from_config(config: &Config) -> Result<Self, WatermarkError> {
        config.validate().map_err(WatermarkError::Config)?;

        let mut fonts = FontBook::embedded()?;
        for font in &config.fonts {
            fonts.register_files(&font.family, &font.regular, font.bold.as_deref())?;
        }

        let object_urls = match config.output.max_object_urls {
            Some(capacity) => ObjectUrlStore::with_capacity(capacity),
            None => ObjectUrlStore::new(),
        };
        let loader =
            DefaultResourceLoader::new(config.loader.to_loader_config(), object_urls.clone())?;

        tracing::info!(
            fonts = config.fonts.len(),
            output_format = %config.output.format,
            max_object_urls = ?config.output.max_object_urls,
            timeout_seconds = ?config.timeout_seconds,
            "Compositor configured"
        );

        Ok(Self {
            loader: Arc::new(loader),
            fonts: Arc::new(fonts),
            object_urls,
            timeout: config.timeout(),
            default_format: config.output.format.clone(),
            default_quality: config.output.quality,
        })
    }

    /// Replace the resource loader.
    ///
    /// Object URLs handed out by this compositor are only resolvable by a
    /// loader sharing [`Compositor::object_urls`].
    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = Arc::new(fonts);
        self
    }

    /// Fail requests that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_output_defaults(mut self, mime_type: impl Into<String>, quality: f32) -> Self {
        self.default_format = mime_type.into();
        self.default_quality = quality;
        self
    }

    pub fn object_urls(&self) -> &ObjectUrlStore {
        &self.object_urls
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// A job for `request`, for callers that want to observe its state.
    pub fn job<'a>(&'a self, request: &'a CompositeRequest) -> CompositeJob<'a> {
        CompositeJob {
            compositor: self,
            request,
            state: CompositeState::Idle,
        }
    }

    /// Composite `request` and encode the result.
    pub async fn composite(
        &self,
        request: &CompositeRequest,
    ) -> Result<WatermarkResult, WatermarkError> {
        let mut job = self.job(request);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, job.run()).await.map_err(|_| {
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "Composite timed out");
                WatermarkError::Timeout(limit)
            })?,
            None => job.run().await,
        }
    }
}

/// One run of the composite pipeline.
pub struct CompositeJob<'a> {
    compositor: &'a Compositor,
    request: &'a CompositeRequest,
    state: CompositeState,
}

impl CompositeJob<'_> {
    pub fn state(&self) -> &CompositeState {
        &self.state
    }

    /// Run the pipeline. A job runs at most once.
    pub async fn run(&mut self) -> Result<WatermarkResult, WatermarkError> {
        if self.state != CompositeState::Idle {
            return Err(WatermarkError::InvalidRequest(format!(
                "composite job already ran (state: {})",
                self.state.name()
            )));
        }

        let started = Instant::now();
        let result = self.execute().await;

        match &result {
            Ok(output) => {
                self.transition(CompositeState::Done);
                tracing::info!(
                    width = output.width,
                    height = output.height,
                    mime_type = %output.mime_type,
                    bytes = output.len(),
                    watermarks = self.request.watermarks.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Composite finished"
                );
            }
            Err(err) => {
                let stage = self.state.name();
                tracing::warn!(stage, error_kind = err.kind(), error = %err, "Composite failed");
                self.state = CompositeState::Failed {
                    stage,
                    error: err.kind(),
                };
            }
        }

        result
    }

    fn transition(&mut self, next: CompositeState) {
        tracing::debug!(from = self.state.name(), to = next.name(), "Composite state change");
        self.state = next;
    }

    async fn execute(&mut self) -> Result<WatermarkResult, WatermarkError> {
        let compositor = self.compositor;
        let request = self.request;
        let loader = compositor.loader.as_ref();

        self.transition(CompositeState::SourceLoading);
        let source = ImageResource::new(request.source.clone())
            .resolve(loader)
            .await
            .map_err(WatermarkError::source_load)?;

        let (width, height) = source.dimensions();
        self.transition(CompositeState::SourceReady { width, height });
        let mut canvas = PixmapCanvas::from_image(&source, compositor.fonts.clone())?;
        let container = ContainerSize::from((width, height));

        let total = request.watermarks.len();
        for (index, descriptor) in request.watermarks.iter().enumerate() {
            self.transition(CompositeState::Drawing { index, total });
            match descriptor {
                WatermarkDescriptor::Text(text) => {
                    render(&mut canvas, &container, PreparedWatermark::Text(text))?;
                }
                WatermarkDescriptor::Image(watermark) => {
                    let image = ImageResource::new(watermark.image.clone())
                        .resolve(loader)
                        .await
                        .map_err(WatermarkError::watermark_load)?;
                    render(
                        &mut canvas,
                        &container,
                        PreparedWatermark::Image {
                            watermark,
                            image: &image,
                        },
                    )?;
                }
            }
        }

        self.transition(CompositeState::Encoding);
        let mime_type = request
            .output_format
            .clone()
            .unwrap_or_else(|| compositor.default_format.clone());
        let quality = request.quality.unwrap_or(compositor.default_quality);

        let format = mime_type.clone();
        let encoded = tokio::task::spawn_blocking(move || {
            encode_rgba(&canvas.to_rgba_image(), &mime_type, quality)
        })
        .await
        .map_err(|e| WatermarkError::encode_failed(format, e.to_string()))??;

        Ok(WatermarkResult::new(
            encoded,
            width,
            height,
            &compositor.object_urls,
        ))
    }
}
