//! Position calculation for watermark placement.
//!
//! Turns a position keyword and an offset into the top-left point of a
//! watermark's box inside a container, and computes the box that encloses a
//! rotated watermark.
//!
//! # Example
//!
//! ```
//! use canvas_watermark::watermark::position::{
//!     calculate_position, BoundingBox, ContainerSize, Offset, PlacementPoint, Position,
//! };
//!
//! let container = ContainerSize::new(800.0, 600.0);
//! let item = BoundingBox::new(100.0, 50.0);
//!
//! let point = calculate_position(Position::BottomRight, &container, &item, Offset::default());
//! assert_eq!(point, PlacementPoint::new(690.0, 540.0)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

use serde::{Deserialize, Serialize};

fn default_offset() -> f32 {
    10.0
}

/// Convert degrees to radians.
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Anchor of a watermark within its container.
///
/// Keywords are kebab-case (`bottom-right`, `left-center`, ...). Parsing never
/// fails: an unknown keyword becomes [`Position::Unrecognized`], which places the
/// watermark at `(offset.x, offset.y)` like a top-left anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    Center,
    RightCenter,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
    /// Keyword that matched none of the nine anchors.
    Unrecognized,
}

impl Position {
    /// All nine real anchors, row by row.
    pub const ANCHORS: [Position; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::LeftCenter,
        Self::Center,
        Self::RightCenter,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Parse a position keyword, falling back to [`Position::Unrecognized`].
    pub fn parse(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "left-center" | "center-left" => Self::LeftCenter,
            "center" => Self::Center,
            "right-center" | "center-right" => Self::RightCenter,
            "bottom-left" => Self::BottomLeft,
            "bottom-center" => Self::BottomCenter,
            "bottom-right" => Self::BottomRight,
            _ => {
                tracing::warn!(
                    position = keyword,
                    "Unrecognized watermark position, placing at offset from top-left"
                );
                Self::Unrecognized
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::LeftCenter => "left-center",
            Self::Center => "center",
            Self::RightCenter => "right-center",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl From<String> for Position {
    fn from(keyword: String) -> Self {
        Self::parse(&keyword)
    }
}

impl From<&str> for Position {
    fn from(keyword: &str) -> Self {
        Self::parse(keyword)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.as_str().to_string()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance from the anchored edges, in pixels.
///
/// Each axis defaults to 10 independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    #[serde(default = "default_offset")]
    pub x: f32,
    #[serde(default = "default_offset")]
    pub y: f32,
}

impl Offset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Default for Offset {
    fn default() -> Self {
        Self::new(default_offset(), default_offset())
    }
}

/// Size of the container a watermark is placed into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerSize {
    pub width: f32,
    pub height: f32,
}

impl ContainerSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for ContainerSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Size of one watermark unit before rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box enclosing a [`BoundingBox`] rotated about its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedBoundingBox {
    pub width: f32,
    pub height: f32,
}

impl RotatedBoundingBox {
    /// `w' = w|cos θ| + h|sin θ|`, `h' = w|sin θ| + h|cos θ|`.
    pub fn from_box(bounds: &BoundingBox, radians: f32) -> Self {
        let cos = radians.cos().abs();
        let sin = radians.sin().abs();
        Self {
            width: bounds.width * cos + bounds.height * sin,
            height: bounds.width * sin + bounds.height * cos,
        }
    }
}

/// Top-left point at which a watermark instance is anchored.
///
/// Coordinates may be negative when the watermark is larger than its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementPoint {
    pub x: f32,
    pub y: f32,
}

impl PlacementPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Calculate the top-left point for a single watermark placement.
///
/// Offsets apply only on axes where the anchor sits against an edge. A centered
/// axis uses `(container - item) / 2` and is not clamped.
pub fn calculate_position(
    position: Position,
    container: &ContainerSize,
    item: &BoundingBox,
    offset: Offset,
) -> PlacementPoint {
    let (w, h) = (container.width, container.height);
    let (iw, ih) = (item.width, item.height);
    let center_x = (w - iw) / 2.0;
    let center_y = (h - ih) / 2.0;
    let right = w - iw - offset.x;
    let bottom = h - ih - offset.y;

    match position {
        // Top row
        Position::TopLeft => PlacementPoint::new(offset.x, offset.y),
        Position::TopCenter => PlacementPoint::new(center_x, offset.y),
        Position::TopRight => PlacementPoint::new(right, offset.y),

        // Center row
        Position::LeftCenter => PlacementPoint::new(offset.x, center_y),
        Position::Center => PlacementPoint::new(center_x, center_y),
        Position::RightCenter => PlacementPoint::new(right, center_y),

        // Bottom row
        Position::BottomLeft => PlacementPoint::new(offset.x, bottom),
        Position::BottomCenter => PlacementPoint::new(center_x, bottom),
        Position::BottomRight => PlacementPoint::new(right, bottom),

        Position::Unrecognized => PlacementPoint::new(offset.x, offset.y),
    }
}
