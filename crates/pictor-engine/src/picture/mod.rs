//! In-memory RGBA raster.
//!
//! A `Picture` owns a `stride * height` buffer of `Rgba` pixels. It carries
//! no device knowledge; the rasterizer writes into it and the painter reads
//! from it.
//!
//! Invariants:
//! - `stride >= width`
//! - `pixels.len() == stride * height`
//! - pixel `(x, y)` is addressable iff `0 <= x < width` and `0 <= y < height`

mod filter;
mod ops;
mod view;

pub use filter::{box_blur, downsample};
pub use view::{RegionView, RegionViewMut};

use crate::coords::PixelRect;
use crate::paint::Rgba;

/// State flags carried alongside the pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PictureFlags {
    /// RGB channels are scaled by alpha.
    pub premultiplied: bool,
    /// Some pixel may have alpha < 255. Set conservatively; a clear flag
    /// guarantees the picture is opaque.
    pub composite: bool,
    /// Modified since the last `mark_clean`.
    pub dirty: bool,
}

/// Owned RGBA raster with a row stride.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    width: u32,
    height: u32,
    stride: usize,
    pixels: Vec<Rgba>,
    flags: PictureFlags,
}

impl Picture {
    /// Creates a zero-filled (transparent black) picture.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_stride(width, height, width as usize)
    }

    /// Creates a zero-filled picture whose rows are `stride` pixels apart.
    /// A stride narrower than `width` is widened to `width`.
    pub fn with_stride(width: u32, height: u32, stride: usize) -> Self {
        let stride = stride.max(width as usize);
        Self {
            width,
            height,
            stride,
            pixels: vec![Rgba::TRANSPARENT; stride * height as usize],
            flags: PictureFlags { premultiplied: false, composite: true, dirty: false },
        }
    }

    /// Adopts a tightly packed straight-alpha RGBA byte buffer, as produced by
    /// an image decoder or an animation frame.
    ///
    /// Returns `None` if `bytes` is not exactly `width * height * 4` long.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        let expected = (width as usize).checked_mul(height as usize)?.checked_mul(4)?;
        if bytes.len() != expected {
            return None;
        }
        let pixels: Vec<Rgba> = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Some(Self {
            width,
            height,
            stride: width as usize,
            pixels,
            flags: PictureFlags { premultiplied: false, composite: true, dirty: true },
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// `(0, 0, width, height)`.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn flags(&self) -> PictureFlags {
        self.flags
    }

    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.flags.premultiplied
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.flags.dirty
    }

    #[inline]
    pub fn mark_clean(&mut self) {
        self.flags.dirty = false;
    }

    /// Whole buffer including stride padding.
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Whole buffer including stride padding, as bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Tightly packed RGBA bytes (padding dropped).
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            out.extend_from_slice(bytemuck::cast_slice(self.row(y)));
        }
        out
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Row `y` without padding. Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Rgba] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Mutable row `y` without padding. Panics if `y >= height`.
    ///
    /// Marks the picture dirty and possibly translucent.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [Rgba] {
        self.flags.dirty = true;
        self.flags.composite = true;
        let start = self.index(0, y);
        let width = self.width as usize;
        &mut self.pixels[start..start + width]
    }

    /// Pixel at `(x, y)`, or `None` outside the picture.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if self.in_bounds(x, y) {
            Some(self.pixels[self.index(x as u32, y as u32)])
        } else {
            None
        }
    }

    /// Writes `(x, y)`; ignored outside the picture.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if !self.in_bounds(x, y) {
            return;
        }
        let i = self.index(x as u32, y as u32);
        self.pixels[i] = color;
        self.note_write(color);
    }

    /// Sets every pixel to `color`. Flags other than opacity are kept.
    pub fn fill(&mut self, color: Rgba) {
        for y in 0..self.height {
            let start = self.index(0, y);
            self.pixels[start..start + self.width as usize].fill(color);
        }
        self.flags.dirty = true;
        self.flags.composite = !color.is_opaque();
    }

    /// Fills with a straight-alpha `color` and resets the premultiplied flag.
    pub fn blank(&mut self, color: Rgba) {
        self.fill(color);
        self.flags.premultiplied = false;
    }

    /// True iff no pixel has alpha < 255.
    pub fn is_opaque(&self) -> bool {
        if !self.flags.composite {
            return true;
        }
        (0..self.height).all(|y| self.row(y).iter().all(|p| p.a == 255))
    }

    /// True iff every pixel in `rect` (clipped) has alpha 255.
    pub fn is_opaque_in(&self, rect: PixelRect) -> bool {
        if !self.flags.composite {
            return true;
        }
        let Some(r) = rect.intersect(self.bounds()) else {
            return true;
        };
        (r.y..r.bottom()).all(|y| {
            let row = self.row(y as u32);
            row[r.x as usize..r.right() as usize].iter().all(|p| p.a == 255)
        })
    }

    /// True iff every pixel in `rect` (clipped) has alpha 0.
    pub fn is_transparent_in(&self, rect: PixelRect) -> bool {
        let Some(r) = rect.intersect(self.bounds()) else {
            return true;
        };
        (r.y..r.bottom()).all(|y| {
            let row = self.row(y as u32);
            row[r.x as usize..r.right() as usize].iter().all(|p| p.a == 0)
        })
    }

    /// Borrow of a sub-rectangle sharing this picture's stride.
    pub fn region(&self, rect: PixelRect) -> Option<RegionView<'_>> {
        let rect = rect.intersect(self.bounds())?;
        Some(RegionView::new(self, rect))
    }

    /// Mutable borrow of a sub-rectangle.
    pub fn region_mut(&mut self, rect: PixelRect) -> Option<RegionViewMut<'_>> {
        let rect = rect.intersect(self.bounds())?;
        Some(RegionViewMut::new(self, rect))
    }

    /// Raw buffer access for filters that walk columns.
    #[inline]
    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba] {
        self.flags.dirty = true;
        self.flags.composite = true;
        &mut self.pixels
    }

    #[inline]
    pub(crate) fn set_premultiplied_flag(&mut self, on: bool) {
        self.flags.premultiplied = on;
    }

    #[inline]
    pub(crate) fn note_write(&mut self, color: Rgba) {
        self.flags.dirty = true;
        if !color.is_opaque() {
            self.flags.composite = true;
        }
    }
}
