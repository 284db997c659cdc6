use crate::composite::mul_div_255;
use crate::coords::PixelRect;
use crate::paint::{PaintBrush, Rgba};
use crate::picture::{Picture, box_blur};

use super::Rasterizer;
use super::common::{COORD_LIMIT, Pen, composite_mask};

/// Blur radii are capped here; wider shadows are indistinguishable from
/// faint fills and their masks grow quadratically.
const MAX_BLUR_RADIUS: u32 = 256;

/// Drop shadow attached to a shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Shadow {
    /// Blur extent in pixels. Zero gives a hard shadow.
    pub width: u32,
    pub dx: i32,
    pub dy: i32,
    pub color: Rgba,
}

impl Shadow {
    #[inline]
    pub const fn new(width: u32, dx: i32, dy: i32, color: Rgba) -> Self {
        Self { width, dx, dy, color }
    }
}

impl Rasterizer {
    /// Renders `shadow` for a shape whose extent is `bounds`.
    ///
    /// `silhouette` draws the shape translated by `(tx, ty)` into a coverage
    /// mask. With `knockout`, the shape's own footprint is removed from the
    /// blurred shadow, so only the part peeking out from under it is drawn.
    pub(super) fn cast_shadow<F>(
        &mut self,
        dst: &mut Picture,
        bounds: PixelRect,
        shadow: &Shadow,
        knockout: bool,
        mut silhouette: F,
    ) where
        F: FnMut(&mut Rasterizer, &mut Picture, i32, i32),
    {
        if bounds.is_empty() || shadow.color.a == 0 {
            return;
        }

        let passes = self.config.blur_passes.max(1);
        let radius = shadow.width.div_ceil(2).min(MAX_BLUR_RADIUS);
        let pad = radius.saturating_mul(passes).min(COORD_LIMIT as u32) as i32 + 1;
        // Only the part of the shape whose blurred shadow can reach the
        // destination is rendered.
        let reach = dst
            .bounds()
            .translate(shadow.dx.saturating_neg(), shadow.dy.saturating_neg())
            .inflate(pad);
        let Some(area) = bounds.inflate(pad).intersect(reach) else {
            return;
        };

        let mut mask = Picture::new(area.width as u32, area.height as u32);
        silhouette(self, &mut mask, area.x.saturating_neg(), area.y.saturating_neg());
        if radius > 0 {
            for _ in 0..passes {
                box_blur(&mut mask, radius);
            }
        }

        if knockout {
            let mut own = Picture::new(area.width as u32, area.height as u32);
            let (tx, ty) = (area.x.saturating_add(shadow.dx), area.y.saturating_add(shadow.dy));
            silhouette(self, &mut own, tx.saturating_neg(), ty.saturating_neg());
            for y in 0..mask.height() {
                let cut = own.row(y).to_vec();
                for (px, c) in mask.row_mut(y).iter_mut().zip(cut) {
                    px.a = mul_div_255(px.a as u32, 255 - c.a as u32) as u8;
                }
            }
        }

        let brush = PaintBrush::solid(shadow.color);
        let sampler = brush.bind(area);
        let pen = Pen::new(dst, true);
        log::trace!("shadow {}x{} blur {} at {:?}", area.width, area.height, radius, bounds);
        let (x, y) = (area.x.saturating_add(shadow.dx), area.y.saturating_add(shadow.dy));
        composite_mask(dst, pen, &mask, x, y, &sampler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RectCmd;

    fn white(w: u32, h: u32) -> Picture {
        let mut p = Picture::new(w, h);
        p.fill(Rgba::WHITE);
        p
    }

    // ── cast_shadow ───────────────────────────────────────────────────────

    #[test]
    fn hard_shadow_lands_at_offset() {
        let mut r = Rasterizer::default();
        let mut p = white(20, 20);
        let cmd = RectCmd::filled(4, 4, 4, 4, PaintBrush::solid(Rgba::rgb(255, 0, 0)))
            .with_shadow(Shadow::new(0, 6, 6, Rgba::BLACK));
        r.rect(&mut p, &cmd);
        assert_eq!(p.pixel(5, 5), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(p.pixel(11, 11), Some(Rgba::BLACK));
        assert_eq!(p.pixel(14, 14), Some(Rgba::WHITE));
    }

    #[test]
    fn blurred_shadow_fades_out() {
        let mut r = Rasterizer::default();
        let mut p = white(40, 40);
        let cmd = RectCmd::filled(10, 10, 10, 10, PaintBrush::solid(Rgba::rgb(255, 0, 0)))
            .with_shadow(Shadow::new(6, 4, 4, Rgba::BLACK));
        r.rect(&mut p, &cmd);
        let center = p.pixel(22, 22).unwrap();
        let edge = p.pixel(26, 26).unwrap();
        assert!(center.r < edge.r, "{center:?} {edge:?}");
        assert_eq!(p.pixel(39, 0), Some(Rgba::WHITE));
        assert_eq!(p.pixel(15, 15), Some(Rgba::rgb(255, 0, 0)));
    }

    #[test]
    fn transparent_shadow_draws_nothing_extra() {
        let mut r = Rasterizer::default();
        let mut p = white(10, 10);
        let cmd = RectCmd::filled(2, 2, 2, 2, PaintBrush::solid(Rgba::BLACK))
            .with_shadow(Shadow::new(2, 3, 3, Rgba::TRANSPARENT));
        r.rect(&mut p, &cmd);
        assert_eq!(p.pixel(6, 6), Some(Rgba::WHITE));
    }

    #[test]
    fn extreme_offsets_cast_nothing() {
        let mut r = Rasterizer::default();
        let rect = RectCmd::filled(2, 2, 4, 4, PaintBrush::solid(Rgba::rgb(255, 0, 0)));
        let mut plain = white(10, 10);
        r.rect(&mut plain, &rect);
        for (dx, dy) in [(i32::MIN, 0), (0, i32::MIN), (i32::MAX, i32::MAX), (i32::MIN, i32::MAX)] {
            let mut p = white(10, 10);
            r.rect(&mut p, &rect.clone().with_shadow(Shadow::new(2, dx, dy, Rgba::BLACK)));
            assert_eq!(p.pixels(), plain.pixels(), "offset ({dx}, {dy})");
        }
    }

    #[test]
    fn huge_blur_width_is_capped() {
        let mut r = Rasterizer::default();
        let mut p = white(16, 16);
        let cmd = RectCmd::filled(6, 6, 4, 4, PaintBrush::solid(Rgba::rgb(255, 0, 0)))
            .with_shadow(Shadow::new(u32::MAX, 0, 0, Rgba::BLACK));
        r.rect(&mut p, &cmd);
        assert_eq!(p.pixel(7, 7), Some(Rgba::rgb(255, 0, 0)));
    }
}
