//! Whole-picture transforms.

use crate::composite::{mul_div_255, premultiply, unpremultiply};
use crate::coords::PixelRect;
use crate::paint::Rgba;

use super::Picture;

impl Picture {
    /// Reallocates to `width × height`, discarding the contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Picture::new(width, height);
        self.flags.dirty = true;
    }

    /// Copies `rect` (clipped) into a new picture.
    pub fn crop(&self, rect: PixelRect) -> Option<Picture> {
        self.region(rect).map(|v| v.to_picture())
    }

    /// Converts straight-alpha pixels to premultiplied. No-op if already
    /// premultiplied.
    pub fn premultiply(&mut self) {
        if self.flags.premultiplied {
            return;
        }
        self.map_pixels(premultiply);
        self.flags.premultiplied = true;
    }

    /// Converts premultiplied pixels back to straight alpha.
    pub fn unpremultiply(&mut self) {
        if !self.flags.premultiplied {
            return;
        }
        self.map_pixels(unpremultiply);
        self.flags.premultiplied = false;
    }

    /// Scales every pixel's opacity by `alpha / 255`.
    pub fn fade(&mut self, alpha: u8) {
        if alpha == 255 {
            return;
        }
        let premul = self.flags.premultiplied;
        let w = alpha as u32;
        self.map_pixels(|c| {
            let a = mul_div_255(c.a as u32, w) as u8;
            if premul {
                Rgba::new(
                    mul_div_255(c.r as u32, w) as u8,
                    mul_div_255(c.g as u32, w) as u8,
                    mul_div_255(c.b as u32, w) as u8,
                    a,
                )
            } else {
                c.with_alpha(a)
            }
        });
        self.flags.composite = true;
    }

    /// Mirrors left-to-right.
    pub fn flip_horizontal(&mut self) {
        for y in 0..self.height {
            self.row_mut(y).reverse();
        }
    }

    /// Mirrors top-to-bottom.
    pub fn flip_vertical(&mut self) {
        let (w, h) = (self.width as usize, self.height as usize);
        for y in 0..h / 2 {
            let top = y * self.stride;
            let bottom = (h - 1 - y) * self.stride;
            let (head, tail) = self.pixels.split_at_mut(bottom);
            head[top..top + w].swap_with_slice(&mut tail[..w]);
        }
        self.flags.dirty = true;
    }

    /// Replaces color with luma, keeping alpha.
    pub fn greyscale(&mut self) {
        self.map_pixels(|c| {
            let l = c.luma();
            Rgba::new(l, l, l, c.a)
        });
    }

    fn map_pixels(&mut self, f: impl Fn(Rgba) -> Rgba) {
        let keep_composite = self.flags.composite;
        for y in 0..self.height {
            for px in self.row_mut(y) {
                *px = f(*px);
            }
        }
        self.flags.composite = keep_composite;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_round_trip_sets_flag() {
        let mut p = Picture::new(1, 1);
        p.set_pixel(0, 0, Rgba::new(200, 100, 50, 255));
        p.premultiply();
        assert!(p.is_premultiplied());
        assert_eq!(p.pixel(0, 0), Some(Rgba::new(200, 100, 50, 255)));
        p.set_pixel(0, 0, Rgba::new(100, 50, 25, 128));
        p.unpremultiply();
        assert!(!p.is_premultiplied());
        assert_eq!(p.pixel(0, 0), Some(Rgba::new(199, 100, 50, 128)));
    }

    #[test]
    fn fade_halves_alpha() {
        let mut p = Picture::new(2, 1);
        p.fill(Rgba::WHITE);
        p.fade(128);
        assert_eq!(p.pixel(1, 0).map(|c| c.a), Some(128));
        assert!(!p.is_opaque());
    }

    #[test]
    fn flips() {
        let mut p = Picture::new(3, 3);
        p.set_pixel(0, 0, Rgba::WHITE);
        p.flip_horizontal();
        assert_eq!(p.pixel(2, 0), Some(Rgba::WHITE));
        p.flip_vertical();
        assert_eq!(p.pixel(2, 2), Some(Rgba::WHITE));
        assert_eq!(p.pixel(2, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn flip_vertical_respects_stride() {
        let mut p = Picture::with_stride(2, 2, 4);
        p.set_pixel(1, 0, Rgba::WHITE);
        p.flip_vertical();
        assert_eq!(p.pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(p.pixels()[2], Rgba::TRANSPARENT);
    }

    #[test]
    fn greyscale_keeps_alpha() {
        let mut p = Picture::new(1, 1);
        p.set_pixel(0, 0, Rgba::new(255, 0, 0, 77));
        p.greyscale();
        let c = p.pixel(0, 0).unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (76, 76, 76, 77));
    }

    #[test]
    fn crop_and_resize() {
        let mut p = Picture::new(5, 5);
        p.set_pixel(4, 4, Rgba::WHITE);
        let c = p.crop(PixelRect::new(3, 3, 10, 10)).unwrap();
        assert_eq!((c.width(), c.height()), (2, 2));
        assert_eq!(c.pixel(1, 1), Some(Rgba::WHITE));
        p.resize(2, 7);
        assert_eq!((p.width(), p.height()), (2, 7));
        assert_eq!(p.pixel(1, 1), Some(Rgba::TRANSPARENT));
    }
}
