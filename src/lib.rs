// Canvas Watermark Library
// Composites text and image watermarks onto raster images

pub mod canvas;
pub mod config;
pub mod encoder;
pub mod logging;
pub mod resource;
pub mod watermark;

pub use config::Config;
pub use resource::{DecodedImage, ResourceLoader, ResourceRef};
pub use watermark::{
    CompositeRequest, Compositor, ImageWatermark, TextWatermark, WatermarkDescriptor,
    WatermarkError, WatermarkResult, Watermarks,
};
