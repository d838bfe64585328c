//! Repeating tile layout.
//!
//! A [`TileGrid`] covers a container with copies of one watermark unit. The
//! unit is the watermark's rotated box plus spacing, and the grid always holds
//! one extra row and column beyond exact coverage so rotated tiles leave no gap
//! at the far edges.

use super::position::{ContainerSize, PlacementPoint, RotatedBoundingBox};

/// Spacing between tiles when none is configured.
pub const DEFAULT_REPEAT_SPACING: f32 = 50.0;

/// Smallest unit size, in pixels, a grid step may have.
///
/// Keeps an empty watermark with zero spacing from producing an unbounded grid.
pub const MIN_UNIT_SIZE: f32 = 1.0;

fn clamp_unit(size: f32) -> f32 {
    if size.is_finite() && size >= MIN_UNIT_SIZE {
        size
    } else {
        MIN_UNIT_SIZE
    }
}

fn tile_count(extent: f32, unit: f32) -> usize {
    let extent = if extent.is_finite() { extent.max(0.0) } else { 0.0 };
    (extent / unit).ceil() as usize + 1
}

/// Grid of tile placements covering a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub unit_width: f32,
    pub unit_height: f32,
    pub cols: usize,
    pub rows: usize,
}

impl TileGrid {
    /// Lay out tiles of `rotated` size, `spacing` apart, over `container`.
    pub fn new(container: &ContainerSize, rotated: &RotatedBoundingBox, spacing: f32) -> Self {
        let unit_width = clamp_unit(rotated.width + spacing);
        let unit_height = clamp_unit(rotated.height + spacing);

        Self {
            unit_width,
            unit_height,
            cols: tile_count(container.width, unit_width),
            rows: tile_count(container.height, unit_height),
        }
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top-left point of the tile at `(col, row)`.
    pub fn point(&self, col: usize, row: usize) -> PlacementPoint {
        PlacementPoint::new(
            col as f32 * self.unit_width,
            row as f32 * self.unit_height,
        )
    }

    /// Iterate tile placements row by row.
    pub fn iter(&self) -> TileIter {
        TileIter {
            grid: *self,
            next: 0,
        }
    }
}

impl IntoIterator for &TileGrid {
    type Item = PlacementPoint;
    type IntoIter = TileIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy row-major iterator over a [`TileGrid`].
#[derive(Debug, Clone)]
pub struct TileIter {
    grid: TileGrid,
    next: usize,
}

impl Iterator for TileIter {
    type Item = PlacementPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.grid.len() {
            return None;
        }
        let row = self.next / self.grid.cols;
        let col = self.next % self.grid.cols;
        self.next += 1;
        Some(self.grid.point(col, row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TileIter {}
