//! Watermark descriptors.
//!
//! A descriptor is either a text or an image watermark, distinguished by an
//! explicit `type` tag:
//!
//! ```yaml
//! - type: text
//!   text: "Copyright"
//!   position: bottom-right
//! - type: image
//!   image: "https://cdn.example.com/logo.png"
//!   repeat: true
//!   repeat_spacing: 20
//! ```
//!
//! Field names are snake_case; the camelCase spellings (`fontSize`,
//! `repeatSpacing`, ...) are accepted as aliases.

use super::position::{deg_to_rad, Offset, Position};
use super::tiling::DEFAULT_REPEAT_SPACING;
use crate::canvas::{Color, FontSpec, FontWeight};
use crate::resource::ResourceRef;
use serde::Deserialize;

// Default values
fn default_font_size() -> f32 {
    16.0
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_opacity() -> f32 {
    0.5
}

fn default_repeat_spacing() -> f32 {
    DEFAULT_REPEAT_SPACING
}

/// Placement settings shared by both watermark kinds, with defaults resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Opacity clamped to `[0, 1]`.
    pub opacity: f32,
    /// Rotation in radians.
    pub rotation: f32,
    pub position: Position,
    pub offset: Offset,
    pub repeat: bool,
    pub repeat_spacing: f32,
}

/// Text watermark.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextWatermark {
    pub text: String,

    /// Font size in pixels (default: 16)
    #[serde(default = "default_font_size", alias = "fontSize")]
    pub font_size: f32,

    /// CSS color (default: "#000000")
    #[serde(default = "default_color")]
    pub color: String,

    /// Font family or comma-separated family list (default: "Arial")
    #[serde(default = "default_font_family", alias = "fontFamily")]
    pub font_family: String,

    /// Font weight keyword or number (default: "normal")
    #[serde(default, alias = "fontWeight")]
    pub font_weight: FontWeight,

    /// Opacity from 0.0 to 1.0 (default: 0.5)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Rotation in degrees, clockwise (default: 0)
    #[serde(default)]
    pub rotate: f32,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub offset: Offset,

    /// Tile the watermark over the whole image (default: false)
    #[serde(default)]
    pub repeat: bool,

    /// Gap between tiles in pixels (default: 50)
    #[serde(default = "default_repeat_spacing", alias = "repeatSpacing")]
    pub repeat_spacing: f32,
}

impl TextWatermark {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: default_font_size(),
            color: default_color(),
            font_family: default_font_family(),
            font_weight: FontWeight::default(),
            opacity: default_opacity(),
            rotate: 0.0,
            position: Position::default(),
            offset: Offset::default(),
            repeat: false,
            repeat_spacing: default_repeat_spacing(),
        }
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn with_position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Offset::new(x, y);
        self
    }

    /// Tile the text, `spacing` pixels apart.
    pub fn repeated(mut self, spacing: f32) -> Self {
        self.repeat = true;
        self.repeat_spacing = spacing;
        self
    }

    pub fn font(&self) -> FontSpec {
        FontSpec::new(
            self.font_family.clone(),
            self.font_weight.clone(),
            self.font_size,
        )
    }

    /// Fill color, black when `color` cannot be parsed.
    pub fn fill_color(&self) -> Color {
        Color::parse_or_black(&self.color)
    }

    pub fn placement(&self) -> Placement {
        Placement {
            opacity: self.opacity.clamp(0.0, 1.0),
            rotation: deg_to_rad(self.rotate),
            position: self.position,
            offset: self.offset,
            repeat: self.repeat,
            repeat_spacing: self.repeat_spacing,
        }
    }
}

/// Image watermark.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageWatermark {
    /// URL, data URL, blob URL, path, bytes or a decoded handle.
    pub image: ResourceRef,

    /// Drawn width in pixels (default: natural width)
    #[serde(default)]
    pub width: Option<f32>,

    /// Drawn height in pixels (default: natural height)
    #[serde(default)]
    pub height: Option<f32>,

    /// Opacity from 0.0 to 1.0 (default: 0.5)
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Rotation in degrees, clockwise (default: 0)
    #[serde(default)]
    pub rotate: f32,

    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub offset: Offset,

    #[serde(default)]
    pub repeat: bool,

    #[serde(default = "default_repeat_spacing", alias = "repeatSpacing")]
    pub repeat_spacing: f32,
}

impl ImageWatermark {
    pub fn new(image: impl Into<ResourceRef>) -> Self {
        Self {
            image: image.into(),
            width: None,
            height: None,
            opacity: default_opacity(),
            rotate: 0.0,
            position: Position::default(),
            offset: Offset::default(),
            repeat: false,
            repeat_spacing: default_repeat_spacing(),
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn with_position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    pub fn with_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Offset::new(x, y);
        self
    }

    /// Tile the image, `spacing` pixels apart.
    pub fn repeated(mut self, spacing: f32) -> Self {
        self.repeat = true;
        self.repeat_spacing = spacing;
        self
    }

    /// Drawn size given the image's natural size. Each axis falls back
    /// independently.
    pub fn effective_size(&self, natural_width: u32, natural_height: u32) -> (f32, f32) {
        (
            self.width.unwrap_or(natural_width as f32),
            self.height.unwrap_or(natural_height as f32),
        )
    }

    pub fn placement(&self) -> Placement {
        Placement {
            opacity: self.opacity.clamp(0.0, 1.0),
            rotation: deg_to_rad(self.rotate),
            position: self.position,
            offset: self.offset,
            repeat: self.repeat,
            repeat_spacing: self.repeat_spacing,
        }
    }
}

/// One watermark layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WatermarkDescriptor {
    Text(TextWatermark),
    Image(ImageWatermark),
}

impl WatermarkDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
        }
    }

    pub fn placement(&self) -> Placement {
        match self {
            Self::Text(text) => text.placement(),
            Self::Image(image) => image.placement(),
        }
    }
}

impl From<TextWatermark> for WatermarkDescriptor {
    fn from(text: TextWatermark) -> Self {
        Self::Text(text)
    }
}

impl From<ImageWatermark> for WatermarkDescriptor {
    fn from(image: ImageWatermark) -> Self {
        Self::Image(image)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(WatermarkDescriptor),
    Many(Vec<WatermarkDescriptor>),
}

/// Ordered watermark layers; the first is painted first.
///
/// Deserializes from a single descriptor or a list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Watermarks(Vec<WatermarkDescriptor>);

impl Watermarks {
    pub fn new(descriptors: Vec<WatermarkDescriptor>) -> Self {
        Self(descriptors)
    }

    pub fn push(&mut self, descriptor: impl Into<WatermarkDescriptor>) {
        self.0.push(descriptor.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WatermarkDescriptor> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[WatermarkDescriptor] {
        &self.0
    }
}

impl From<OneOrMany> for Watermarks {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(descriptor) => Self(vec![descriptor]),
            OneOrMany::Many(descriptors) => Self(descriptors),
        }
    }
}

impl From<WatermarkDescriptor> for Watermarks {
    fn from(descriptor: WatermarkDescriptor) -> Self {
        Self(vec![descriptor])
    }
}

impl From<TextWatermark> for Watermarks {
    fn from(text: TextWatermark) -> Self {
        Self(vec![text.into()])
    }
}

impl From<ImageWatermark> for Watermarks {
    fn from(image: ImageWatermark) -> Self {
        Self(vec![image.into()])
    }
}

impl From<Vec<WatermarkDescriptor>> for Watermarks {
    fn from(descriptors: Vec<WatermarkDescriptor>) -> Self {
        Self(descriptors)
    }
}

impl<'a> IntoIterator for &'a Watermarks {
    type Item = &'a WatermarkDescriptor;
    type IntoIter = std::slice::Iter<'a, WatermarkDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Watermarks {
    type Item = WatermarkDescriptor;
    type IntoIter = std::vec::IntoIter<WatermarkDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
