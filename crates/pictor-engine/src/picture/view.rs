use crate::coords::PixelRect;
use crate::paint::Rgba;

use super::Picture;

/// Read-only window onto a sub-rectangle of a [`Picture`].
///
/// Coordinates are relative to the region's top-left corner. The region is
/// always fully inside the parent picture.
#[derive(Debug, Copy, Clone)]
pub struct RegionView<'a> {
    picture: &'a Picture,
    rect: PixelRect,
}

impl<'a> RegionView<'a> {
    pub(super) fn new(picture: &'a Picture, rect: PixelRect) -> Self {
        Self { picture, rect }
    }

    /// Region in parent coordinates.
    #[inline]
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.width as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.height as u32
    }

    /// Parent row stride, in pixels.
    #[inline]
    pub fn stride(&self) -> usize {
        self.picture.stride()
    }

    #[inline]
    pub fn row(&self, y: u32) -> &'a [Rgba] {
        let row = self.picture.row(self.rect.y as u32 + y);
        &row[self.rect.x as usize..self.rect.right() as usize]
    }

    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.rect.width || y >= self.rect.height {
            return None;
        }
        self.picture.pixel(self.rect.x + x, self.rect.y + y)
    }

    /// Copies the region into a new, tightly packed picture.
    pub fn to_picture(&self) -> Picture {
        let mut out = Picture::new(self.width(), self.height());
        for y in 0..self.height() {
            out.row_mut(y).copy_from_slice(self.row(y));
        }
        out.set_premultiplied_flag(self.picture.is_premultiplied());
        out
    }
}

/// Mutable window onto a sub-rectangle of a [`Picture`].
#[derive(Debug)]
pub struct RegionViewMut<'a> {
    picture: &'a mut Picture,
    rect: PixelRect,
}

impl<'a> RegionViewMut<'a> {
    pub(super) fn new(picture: &'a mut Picture, rect: PixelRect) -> Self {
        Self { picture, rect }
    }

    #[inline]
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.width as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.height as u32
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [Rgba] {
        let (x0, x1) = (self.rect.x as usize, self.rect.right() as usize);
        let row = self.picture.row_mut(self.rect.y as u32 + y);
        &mut row[x0..x1]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.rect.width || y >= self.rect.height {
            return;
        }
        self.picture.set_pixel(self.rect.x + x, self.rect.y + y, color);
    }

    pub fn fill(&mut self, color: Rgba) {
        for y in 0..self.height() {
            self.row_mut(y).fill(color);
        }
    }
}
