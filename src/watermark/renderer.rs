//! Watermark drawing.
//!
//! Turns one descriptor into draw calls on a [`DrawingContext`]. A single
//! placement is anchored with [`calculate_position`] using the un-rotated box;
//! a repeated watermark is laid out on a [`TileGrid`] built from the rotated
//! box. Every instance is drawn centered on its box center after an optional
//! rotation about that center.

use super::descriptor::{ImageWatermark, Placement, TextWatermark};
use super::position::{calculate_position, BoundingBox, ContainerSize, RotatedBoundingBox};
use super::tiling::TileGrid;
use super::WatermarkError;
use crate::canvas::{DrawingContext, ScopedState};
use crate::resource::DecodedImage;

/// A descriptor ready to draw: image watermarks carry their decoded image.
#[derive(Debug, Clone, Copy)]
pub enum PreparedWatermark<'a> {
    Text(&'a TextWatermark),
    Image {
        watermark: &'a ImageWatermark,
        image: &'a DecodedImage,
    },
}

/// Draw one watermark onto `ctx`.
///
/// All state changes are undone before returning, on success and on failure.
pub fn render<C>(
    ctx: &mut C,
    container: &ContainerSize,
    watermark: PreparedWatermark<'_>,
) -> Result<(), WatermarkError>
where
    C: DrawingContext + ?Sized,
{
    match watermark {
        PreparedWatermark::Text(text) => {
            draw_text(ctx, container, text);
            Ok(())
        }
        PreparedWatermark::Image { watermark, image } => {
            draw_image(ctx, container, watermark, image)
        }
    }
}

fn draw_text<C>(ctx: &mut C, container: &ContainerSize, text: &TextWatermark)
where
    C: DrawingContext + ?Sized,
{
    let placement = text.placement();
    let mut scope = ScopedState::new(ctx);

    scope.set_font(&text.font());
    scope.set_fill_color(text.fill_color());
    scope.set_global_alpha(placement.opacity);

    let bounds = BoundingBox::new(scope.measure_text(&text.text), text.font_size);
    let drawn = place(&mut *scope, container, &bounds, &placement, |ctx| {
        ctx.fill_text_centered(&text.text, 0.0, 0.0)
    });

    tracing::trace!(
        width = bounds.width,
        height = bounds.height,
        instances = drawn,
        "Drew text watermark"
    );
}

fn draw_image<C>(
    ctx: &mut C,
    container: &ContainerSize,
    watermark: &ImageWatermark,
    image: &DecodedImage,
) -> Result<(), WatermarkError>
where
    C: DrawingContext + ?Sized,
{
    let (natural_width, natural_height) = image.dimensions();
    if image.is_empty() {
        return Err(WatermarkError::InvalidWatermarkImage {
            width: natural_width,
            height: natural_height,
        });
    }

    let placement = watermark.placement();
    let (width, height) = watermark.effective_size(natural_width, natural_height);
    let mut scope = ScopedState::new(ctx);
    scope.set_global_alpha(placement.opacity);

    let bounds = BoundingBox::new(width, height);
    let drawn = place(&mut *scope, container, &bounds, &placement, |ctx| {
        ctx.draw_image(image, -width / 2.0, -height / 2.0, width, height)
    });

    tracing::trace!(width, height, instances = drawn, "Drew image watermark");
    Ok(())
}

/// Position, rotate and paint every instance of a watermark. Returns the
/// number of instances painted.
fn place<C, F>(
    ctx: &mut C,
    container: &ContainerSize,
    bounds: &BoundingBox,
    placement: &Placement,
    mut paint: F,
) -> usize
where
    C: DrawingContext + ?Sized,
    F: FnMut(&mut C),
{
    let rotation = placement.rotation;

    if !placement.repeat {
        let point = calculate_position(placement.position, container, bounds, placement.offset);
        ctx.translate(point.x + bounds.width / 2.0, point.y + bounds.height / 2.0);
        if rotation != 0.0 {
            ctx.rotate(rotation);
        }
        paint(ctx);
        return 1;
    }

    let rotated = RotatedBoundingBox::from_box(bounds, rotation);
    let grid = TileGrid::new(container, &rotated, placement.repeat_spacing);

    for point in &grid {
        let mut tile = ScopedState::new(&mut *ctx);
        tile.translate(point.x + rotated.width / 2.0, point.y + rotated.height / 2.0);
        if rotation != 0.0 {
            tile.rotate(rotation);
        }
        paint(&mut *tile);
    }

    grid.len()
}
