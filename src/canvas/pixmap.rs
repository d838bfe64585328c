//! Raster drawing context backed by a `tiny-skia` pixmap.

use super::{Color, DrawingContext, FontSpec, FontWeight};
use crate::resource::DecodedImage;
use crate::watermark::text_renderer::{self, FontBook};
use crate::watermark::WatermarkError;
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, Paint, Pixmap, PixmapPaint, PixmapRef, Transform,
};

#[derive(Debug, Clone)]
struct CanvasState {
    transform: Transform,
    alpha: f32,
    fill: Color,
    font: FontSpec,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            alpha: 1.0,
            fill: Color::BLACK,
            font: FontSpec::new("sans-serif", FontWeight::normal(), 10.0),
        }
    }
}

/// Drawing surface that rasterizes into premultiplied RGBA.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    fonts: Arc<FontBook>,
    state: CanvasState,
    stack: Vec<CanvasState>,
}

impl std::fmt::Debug for PixmapCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapCanvas")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl PixmapCanvas {
    /// Transparent surface of the given size.
    pub fn new(width: u32, height: u32, fonts: Arc<FontBook>) -> Result<Self, WatermarkError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(WatermarkError::SurfaceCreation { width, height })?;
        Ok(Self {
            pixmap,
            fonts,
            state: CanvasState::default(),
            stack: Vec::new(),
        })
    }

    /// Surface the size of `image` with the image copied in at full size.
    pub fn from_image(image: &DecodedImage, fonts: Arc<FontBook>) -> Result<Self, WatermarkError> {
        let (width, height) = image.dimensions();
        let mut canvas = Self::new(width, height, fonts)?;
        canvas.pixmap.data_mut().copy_from_slice(image.premultiplied());
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the surface.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let width = self.pixmap.width();
        let pixels = self.pixmap.pixels();
        RgbaImage::from_fn(width, self.pixmap.height(), |x, y| {
            let c = pixels[(y * width + x) as usize].demultiply();
            Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    }

    fn paint(&self) -> PixmapPaint {
        PixmapPaint {
            opacity: self.state.alpha,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        }
    }
}

impl DrawingContext for PixmapCanvas {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform.pre_translate(x, y);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees()));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn measure_text(&self, text: &str) -> f32 {
        let font = &self.state.font;
        let face = self.fonts.resolve(&font.family, font.weight.is_bold());
        text_renderer::measure_text(face, font.size, text)
    }

    fn fill_text_centered(&mut self, text: &str, x: f32, y: f32) {
        let font = &self.state.font;
        let face = self.fonts.resolve(&font.family, font.weight.is_bold());
        let Some(outline) = text_renderer::outline_text(face, font.size, text) else {
            return;
        };

        let fill = self.state.fill;
        let mut color = tiny_skia::Color::from_rgba8(fill.r, fill.g, fill.b, fill.a);
        color.apply_opacity(self.state.alpha);
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        // Glyphs past the surface edge are clipped by the rasterizer.
        let transform = self.state.transform.pre_translate(
            x - outline.width / 2.0,
            y - outline.line_height / 2.0,
        );
        self.pixmap
            .fill_path(&outline.path, &paint, FillRule::Winding, transform, None);
    }

    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        let (image_width, image_height) = image.dimensions();
        let Some(source) = PixmapRef::from_bytes(image.premultiplied(), image_width, image_height)
        else {
            tracing::warn!(
                width = image_width,
                height = image_height,
                "Skipping image that cannot be drawn"
            );
            return;
        };

        let transform = self.state.transform.pre_translate(x, y).pre_scale(
            width / image_width as f32,
            height / image_height as f32,
        );
        let paint = self.paint();
        self.pixmap.draw_pixmap(0, 0, source, &paint, transform, None);
    }
}
