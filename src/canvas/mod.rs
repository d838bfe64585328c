//! Drawing surfaces.
//!
//! [`DrawingContext`] is the small 2D-canvas-like capability set the watermark
//! renderer draws through: a save/restore stack of transform and style state,
//! translate and rotate, global alpha, fill color, font, text measurement,
//! centered text and scaled image blits.
//!
//! Two implementations ship with the crate:
//!
//! - [`PixmapCanvas`] rasterizes into a `tiny-skia` pixmap
//! - [`RecordingContext`] records every call, for inspecting layouts

pub mod pixmap;
pub mod recording;
pub mod style;

pub use pixmap::PixmapCanvas;
pub use recording::{DrawCall, RecordingContext};
pub use style::{Color, FontSpec, FontWeight};

use crate::resource::DecodedImage;
use std::ops::{Deref, DerefMut};

/// A 2D drawing context with canvas semantics.
///
/// Transforms compose like a canvas: `translate` then `rotate` rotates about
/// the translated origin. `save` pushes transform, alpha, fill color and font;
/// `restore` pops them and is a no-op on an empty stack.
pub trait DrawingContext {
    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, x: f32, y: f32);

    fn rotate(&mut self, radians: f32);

    /// Opacity applied to every subsequent paint, clamped to `[0, 1]`.
    fn set_global_alpha(&mut self, alpha: f32);

    fn set_fill_color(&mut self, color: Color);

    fn set_font(&mut self, font: &FontSpec);

    /// Advance width of `text` in the current font.
    fn measure_text(&self, text: &str) -> f32;

    /// Paint `text` with its center at `(x, y)`.
    fn fill_text_centered(&mut self, text: &str, x: f32, y: f32);

    /// Paint `image` scaled into the rectangle `(x, y, width, height)`.
    fn draw_image(&mut self, image: &DecodedImage, x: f32, y: f32, width: f32, height: f32);
}

/// Saves a context's state on creation and restores it on drop.
///
/// Dereferences to the context, so drawing goes through the guard.
pub struct ScopedState<'a, C: DrawingContext + ?Sized> {
    context: &'a mut C,
}

impl<'a, C: DrawingContext + ?Sized> ScopedState<'a, C> {
    pub fn new(context: &'a mut C) -> Self {
        context.save();
        Self { context }
    }
}

impl<C: DrawingContext + ?Sized> Deref for ScopedState<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

impl<C: DrawingContext + ?Sized> DerefMut for ScopedState<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.context
    }
}

impl<C: DrawingContext + ?Sized> Drop for ScopedState<'_, C> {
    fn drop(&mut self) {
        self.context.restore();
    }
}
