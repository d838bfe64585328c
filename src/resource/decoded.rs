//! Decoded raster handle shared between the loader and drawing surfaces.

use image::{DynamicImage, RgbaImage};
use std::sync::{Arc, OnceLock};

struct DecodedInner {
    rgba: RgbaImage,
    premultiplied: OnceLock<Vec<u8>>,
}

/// A fully decoded RGBA image.
///
/// Cloning is cheap; clones share pixels. A handle may describe an image with a
/// zero dimension, which loaders and renderers reject.
#[derive(Clone)]
pub struct DecodedImage {
    inner: Arc<DecodedInner>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

impl DecodedImage {
    pub fn new(rgba: RgbaImage) -> Self {
        Self {
            inner: Arc::new(DecodedInner {
                rgba,
                premultiplied: OnceLock::new(),
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.rgba.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.rgba.dimensions()
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Straight-alpha RGBA pixels.
    pub fn rgba(&self) -> &RgbaImage {
        &self.inner.rgba
    }

    /// Premultiplied RGBA bytes, computed on first use and then shared.
    pub fn premultiplied(&self) -> &[u8] {
        self.inner.premultiplied.get_or_init(|| {
            let mut bytes = self.inner.rgba.as_raw().clone();
            premultiply_rgba_in_place(&mut bytes);
            bytes
        })
    }
}

impl From<RgbaImage> for DecodedImage {
    fn from(rgba: RgbaImage) -> Self {
        Self::new(rgba)
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.into_rgba8())
    }
}

pub(crate) fn premultiply_rgba_in_place(bytes: &mut [u8]) {
    for px in bytes.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
