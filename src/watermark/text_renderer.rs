//! Font lookup and glyph outlines for text watermarks.
//!
//! A [`FontBook`] maps family names to `ab_glyph` faces. DejaVu Sans (regular
//! and bold) is embedded and serves every family that has not been registered,
//! including the default `Arial`.
//!
//! # Example
//!
//! ```
//! use canvas_watermark::watermark::text_renderer::{measure_text, FontBook};
//!
//! let fonts = FontBook::embedded().unwrap();
//! let font = fonts.resolve("Arial", false);
//! let width = measure_text(font, 16.0, "Copyright");
//! assert!(width > 0.0);
//! ```

use super::WatermarkError;
use ab_glyph::{Font, FontArc, GlyphId, OutlineCurve, PxScale, ScaleFont};
use std::collections::HashMap;
use std::path::Path;
use tiny_skia::PathBuilder;

const EMBEDDED_REGULAR: &[u8] = include_bytes!("fonts/DejaVuSans.ttf");
const EMBEDDED_BOLD: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

#[derive(Clone)]
struct FontFaces {
    regular: FontArc,
    bold: Option<FontArc>,
}

impl FontFaces {
    fn pick(&self, bold: bool) -> &FontArc {
        match (&self.bold, bold) {
            (Some(face), true) => face,
            _ => &self.regular,
        }
    }
}

/// Registry of font families.
#[derive(Clone)]
pub struct FontBook {
    families: HashMap<String, FontFaces>,
    fallback: FontFaces,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<&str> = self.families.keys().map(String::as_str).collect();
        families.sort_unstable();
        f.debug_struct("FontBook")
            .field("families", &families)
            .finish()
    }
}

fn parse_font(data: Vec<u8>, family: &str) -> Result<FontArc, WatermarkError> {
    FontArc::try_from_vec(data)
        .map_err(|e| WatermarkError::Config(format!("Invalid font data for '{family}': {e}")))
}

fn family_key(family: &str) -> String {
    family
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_ascii_lowercase()
}

impl FontBook {
    /// Font book with only the embedded fallback faces.
    pub fn embedded() -> Result<Self, WatermarkError> {
        let regular = FontArc::try_from_slice(EMBEDDED_REGULAR)
            .map_err(|e| WatermarkError::Config(format!("Embedded font is invalid: {e}")))?;
        let bold = FontArc::try_from_slice(EMBEDDED_BOLD)
            .map_err(|e| WatermarkError::Config(format!("Embedded bold font is invalid: {e}")))?;

        Ok(Self {
            families: HashMap::new(),
            fallback: FontFaces {
                regular,
                bold: Some(bold),
            },
        })
    }

    /// Register a family from font file contents (TTF or OTF).
    pub fn register(
        &mut self,
        family: &str,
        regular: Vec<u8>,
        bold: Option<Vec<u8>>,
    ) -> Result<(), WatermarkError> {
        let faces = FontFaces {
            regular: parse_font(regular, family)?,
            bold: bold.map(|data| parse_font(data, family)).transpose()?,
        };
        self.families.insert(family_key(family), faces);
        tracing::debug!(family, "Registered font family");
        Ok(())
    }

    /// Register a family from font files on disk.
    pub fn register_files(
        &mut self,
        family: &str,
        regular: &Path,
        bold: Option<&Path>,
    ) -> Result<(), WatermarkError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|e| {
                WatermarkError::Config(format!(
                    "Failed to read font file {}: {e}",
                    path.display()
                ))
            })
        };
        let regular = read(regular)?;
        let bold = bold.map(read).transpose()?;
        self.register(family, regular, bold)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(&family_key(family))
    }

    /// Pick a face for a family list such as `"Helvetica, Arial, sans-serif"`.
    ///
    /// The first registered family wins; otherwise the embedded face is used.
    pub fn resolve(&self, families: &str, bold: bool) -> &FontArc {
        families
            .split(',')
            .find_map(|family| self.families.get(&family_key(family)))
            .unwrap_or(&self.fallback)
            .pick(bold)
    }
}

/// Scale that makes one em `font_size` pixels tall.
pub fn px_scale(font: &FontArc, font_size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(font_size * font.height_unscaled() / units_per_em)
}

/// Advance width of `text`, including kerning, in pixels.
pub fn measure_text(font: &FontArc, font_size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(px_scale(font, font_size));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width
}

/// One line of text as a fill path.
///
/// Path coordinates are relative to the top-left corner of the line box,
/// which is `width` by `line_height` pixels.
#[derive(Debug, Clone)]
pub struct TextOutline {
    pub path: tiny_skia::Path,
    pub width: f32,
    pub line_height: f32,
}

/// Convert one line of text to glyph outlines.
///
/// Nothing is rasterized here, so the cost does not depend on `font_size`.
/// Returns `None` for empty text or text without visible glyphs.
pub fn outline_text(font: &FontArc, font_size: f32, text: &str) -> Option<TextOutline> {
    if text.is_empty() || !font_size.is_finite() || font_size <= 0.0 {
        return None;
    }

    let scaled = font.as_scaled(px_scale(font, font_size));
    let (sx, sy) = (scaled.h_scale_factor(), scaled.v_scale_factor());
    let ascent = scaled.ascent();
    let line_height = ascent - scaled.descent();

    let mut builder = PathBuilder::new();
    let mut caret = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            caret += scaled.kern(prev, glyph_id);
        }

        if let Some(outline) = font.outline(glyph_id) {
            // Font units are y-up with the origin on the baseline.
            let map = |p: ab_glyph::Point| (caret + p.x * sx, ascent - p.y * sy);
            let mut pen: Option<ab_glyph::Point> = None;

            for curve in &outline.curves {
                let (start, end) = match curve {
                    OutlineCurve::Line(a, b) => (*a, *b),
                    OutlineCurve::Quad(a, _, c) => (*a, *c),
                    OutlineCurve::Cubic(a, _, _, d) => (*a, *d),
                };
                if pen != Some(start) {
                    if pen.is_some() {
                        builder.close();
                    }
                    let (x, y) = map(start);
                    builder.move_to(x, y);
                }
                match curve {
                    OutlineCurve::Line(_, b) => {
                        let (x, y) = map(*b);
                        builder.line_to(x, y);
                    }
                    OutlineCurve::Quad(_, b, c) => {
                        let ((x1, y1), (x, y)) = (map(*b), map(*c));
                        builder.quad_to(x1, y1, x, y);
                    }
                    OutlineCurve::Cubic(_, b, c, d) => {
                        let ((x1, y1), (x2, y2), (x, y)) = (map(*b), map(*c), map(*d));
                        builder.cubic_to(x1, y1, x2, y2, x, y);
                    }
                }
                pen = Some(end);
            }
            if pen.is_some() {
                builder.close();
            }
        }

        caret += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Some(TextOutline {
        path: builder.finish()?,
        width: caret,
        line_height,
    })
}
