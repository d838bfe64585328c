//! Watermark placement, tiling and compositing.
//!
//! Text and image watermarks are described by [`WatermarkDescriptor`]s and
//! drawn onto a source image by the [`Compositor`]. A watermark is either
//! anchored once (one of nine positions plus an offset) or repeated over the
//! whole image on a grid derived from its rotated bounding box.
//!
//! # Request Example
//!
//! ```yaml
//! source: "https://cdn.example.com/photos/beach.jpg"
//! output_format: image/jpeg
//! quality: 0.85
//! watermarks:
//!   - type: text
//!     text: "Copyright"
//!     font_size: 24
//!     color: "#ffffff"
//!     position: bottom-right
//!   - type: image
//!     image: "https://cdn.example.com/logo.png"
//!     width: 64
//!     opacity: 0.3
//!     rotate: -30
//!     repeat: true
//!     repeat_spacing: 80
//! ```
//!
//! # Positions
//!
//! `top-left`, `top-center`, `top-right`, `left-center`, `center`,
//! `right-center`, `bottom-left`, `bottom-center`, `bottom-right` (default).
//! An unknown keyword is not an error: the watermark is placed at
//! `(offset.x, offset.y)`.

pub mod compositor;
pub mod descriptor;
pub mod error;
pub mod position;
pub mod renderer;
pub mod result;
pub mod text_renderer;
pub mod tiling;

// Re-export main types for convenience
pub use compositor::{
    CompositeJob, CompositeRequest, CompositeState, Compositor, DEFAULT_OUTPUT_FORMAT,
};
pub use descriptor::{ImageWatermark, Placement, TextWatermark, WatermarkDescriptor, Watermarks};
pub use error::WatermarkError;
pub use position::{
    calculate_position, deg_to_rad, BoundingBox, ContainerSize, Offset, PlacementPoint, Position,
    RotatedBoundingBox,
};
pub use renderer::{render, PreparedWatermark};
pub use result::{to_data_url, WatermarkResult};
pub use text_renderer::{measure_text, outline_text, FontBook, TextOutline};
pub use tiling::{TileGrid, TileIter, DEFAULT_REPEAT_SPACING, MIN_UNIT_SIZE};
