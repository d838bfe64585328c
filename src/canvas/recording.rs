//! Drawing context that records calls instead of painting.
//!
//! Useful for checking layouts: every paint call carries the transform and
//! alpha in effect when it was issued.

use super::{Color, DrawingContext, FontSpec};
use crate::resource::DecodedImage;
use tiny_skia::{Point, Transform};

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Save,
    Restore,
    Translate {
        x: f32,
        y: f32,
    },
    Rotate {
        radians: f32,
    },
    SetGlobalAlpha {
        alpha: f32,
    },
    SetFillColor {
        color: Color,
    },
    SetFont {
        font: String,
    },
    FillText {
        text: String,
        x: f32,
        y: f32,
        transform: Transform,
        alpha: f32,
        color: Color,
    },
    DrawImage {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        transform: Transform,
        alpha: f32,
    },
}

impl DrawCall {
    /// Where the call's local point lands on the surface, for paint calls.
    pub fn surface_point(&self) -> Option<(f32, f32)> {
        let (x, y, transform) = match self {
            DrawCall::FillText { x, y, transform, .. } => (*x, *y, transform),
            DrawCall::DrawImage {
                x,
                y,
                width,
                height,
                transform,
                ..
            } => (*x + *width / 2.0, *y + *height / 2.0, transform),
            _ => return None,
        };
        let mut points = [Point::from_xy(x, y)];
        transform.map_points(&mut points);
        Some((points[0].x, points[0].y))
    }

    pub fn is_paint(&self) -> bool {
        matches!(self, DrawCall::FillText { .. } | DrawCall::DrawImage { .. })
    }
}

#[derive(Debug, Clone)]
struct RecordedState {
    transform: Transform,
    alpha: f32,
    fill: Color,
    font: FontSpec,
}

/// A [`DrawingContext`] that only records.
///
/// Text is measured as `chars * font size * char_width_ratio`.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    calls: Vec<DrawCall>,
    state: RecordedState,
    stack: Vec<RecordedState>,
    char_width_ratio: f32,
}

impl Default for RecordingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            state: RecordedState {
                transform: Transform::identity(),
                alpha: 1.0,
                fill: Color::BLACK,
                font: FontSpec::new("sans-serif", Default::default(), 10.0),
            },
            stack: Vec::new(),
            char_width_ratio: 0.5,
        }
    }

    pub fn with_char_width_ratio(mut self, ratio: f32) -> Self {
        self.char_width_ratio = ratio;
        self
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Recorded paint calls only.
    pub fn paints(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(|c| c.is_paint())
    }

    /// Current save depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl DrawingContext for RecordingContext {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.state.transform = self.state.transform.pre_translate(x, y);
        self.calls.push(DrawCall::Translate { x, y });
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self
            .state
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees()));
        self.calls.push(DrawCall::Rotate { radians });
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        let alpha = alpha.clamp(0.0, 1.0);
        self.state.alpha = alpha;
        self.calls.push(DrawCall::SetGlobalAlpha { alpha });
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
        self.calls.push(DrawCall::SetFillColor { color });
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
        self.calls.push(DrawCall::SetFont {
            font: font.to_string(),
        });
    }

    fn measure_text(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.state.font.size * self.char_width_ratio
    }

    fn fill_text_centered(&mut self, text: &str, x: f32, y: f32) {
        self.calls.push(DrawCall::FillText {
            text: text.to_string(),
            x,
            y,
            transform: self.state.transform,
            alpha: self.state.alpha,
            color: self.state.fill,
        });
    }

    fn draw_image(&mut self, _image: &DecodedImage, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::DrawImage {
            x,
            y,
            width,
            height,
            transform: self.state.transform,
            alpha: self.state.alpha,
        });
    }
}
