//! Pixel write helpers shared by all shape rasterizers.

use crate::composite::{blend_over, blend_over_premul, fade_by_weight, premultiply};
use crate::coords::PixelRect;
use crate::paint::{BrushSampler, Rgba};
use crate::picture::Picture;

/// Largest coordinate magnitude shape bounds are computed with. Geometry
/// beyond it lies far outside any picture and is clipped anyway.
pub(super) const COORD_LIMIT: i32 = 1 << 24;

// ── coverage ──────────────────────────────────────────────────────────────

/// Converts fractional coverage to an 8-bit weight.
#[inline]
pub(super) fn coverage_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Coverage of a pixel whose center lies `dist` outside an edge.
#[inline]
pub(super) fn edge_coverage(dist: f32) -> f32 {
    (0.5 - dist).clamp(0.0, 1.0)
}

// ── pen ───────────────────────────────────────────────────────────────────

/// Write mode for one draw call.
///
/// `blend = false` overwrites fully covered pixels; partially covered
/// pixels are always blended so antialiased edges stay smooth.
#[derive(Debug, Copy, Clone)]
pub(super) struct Pen {
    blend: bool,
    premultiplied: bool,
}

impl Pen {
    #[inline]
    pub(super) fn new(dst: &Picture, blend: bool) -> Self {
        Self { blend, premultiplied: dst.is_premultiplied() }
    }

    /// Result of writing straight-alpha `color` at `coverage` over `cur`.
    #[inline]
    pub(super) fn apply(self, cur: Rgba, color: Rgba, coverage: u8) -> Rgba {
        let full = coverage == 255;
        let c = if full { color } else { fade_by_weight(color, coverage) };
        if self.premultiplied {
            let c = premultiply(c);
            if full && !self.blend { c } else { blend_over_premul(cur, c) }
        } else if full && !self.blend {
            c
        } else {
            blend_over(cur, c)
        }
    }
}

// ── writes ────────────────────────────────────────────────────────────────

/// Writes one pixel; clipped.
#[inline]
pub(super) fn plot(dst: &mut Picture, pen: Pen, x: i32, y: i32, color: Rgba, coverage: u8) {
    if coverage == 0 {
        return;
    }
    if let Some(cur) = dst.pixel(x, y) {
        dst.set_pixel(x, y, pen.apply(cur, color, coverage));
    }
}

/// Fills `[x0, x1)` on row `y` from `sampler`; clipped.
///
/// Brushes that only vary with `y` are sampled once.
pub(super) fn fill_span(
    dst: &mut Picture,
    pen: Pen,
    y: i32,
    x0: i32,
    x1: i32,
    sampler: &BrushSampler<'_>,
) {
    if y < 0 || y >= dst.height() as i32 {
        return;
    }
    let x0 = x0.max(0);
    let x1 = x1.min(dst.width() as i32);
    if x0 >= x1 {
        return;
    }

    let row = &mut dst.row_mut(y as u32)[x0 as usize..x1 as usize];
    if sampler.brush().is_vertical() {
        let color = sampler.color_at(x0, y);
        for px in row {
            *px = pen.apply(*px, color, 255);
        }
    } else {
        for (px, x) in row.iter_mut().zip(x0..) {
            *px = pen.apply(*px, sampler.color_at(x, y), 255);
        }
    }
}

/// Composites a coverage mask (alpha channel of `mask`) placed at
/// `(ox, oy)` in `dst`, coloring it from `sampler`.
pub(super) fn composite_mask(
    dst: &mut Picture,
    pen: Pen,
    mask: &Picture,
    ox: i32,
    oy: i32,
    sampler: &BrushSampler<'_>,
) {
    let placed = PixelRect::new(ox, oy, mask.width() as i32, mask.height() as i32);
    let Some(clip) = placed.intersect(dst.bounds()) else {
        return;
    };

    for y in clip.y..clip.bottom() {
        let mrow = mask.row((y - oy) as u32);
        let row = dst.row_mut(y as u32);
        for x in clip.x..clip.right() {
            let cov = mrow[(x - ox) as usize].a;
            if cov == 0 {
                continue;
            }
            let px = &mut row[x as usize];
            *px = pen.apply(*px, sampler.color_at(x, y), cov);
        }
    }
}

/// Allocates an empty coverage mask.
#[inline]
pub(super) fn new_mask(width: i32, height: i32) -> Picture {
    Picture::new(width.max(0) as u32, height.max(0) as u32)
}

/// Marks `[x0, x1)` on row `y` of a mask as fully covered.
#[inline]
pub(super) fn mask_span(mask: &mut Picture, y: i32, x0: i32, x1: i32) {
    if y < 0 || y >= mask.height() as i32 {
        return;
    }
    let x0 = x0.max(0);
    let x1 = x1.min(mask.width() as i32);
    if x0 < x1 {
        mask.row_mut(y as u32)[x0 as usize..x1 as usize].fill(Rgba::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintBrush;

    // ── pen ───────────────────────────────────────────────────────────────

    #[test]
    fn overwrite_replaces_full_coverage() {
        let dst = Picture::new(1, 1);
        let pen = Pen::new(&dst, false);
        let c = Rgba::new(10, 20, 30, 40);
        assert_eq!(pen.apply(Rgba::WHITE, c, 255), c);
    }

    #[test]
    fn partial_coverage_always_blends() {
        let dst = Picture::new(1, 1);
        let pen = Pen::new(&dst, false);
        let out = pen.apply(Rgba::WHITE, Rgba::BLACK, 128);
        assert_eq!(out.a, 255);
        assert!(out.r > 100 && out.r < 150, "{out:?}");
    }

    #[test]
    fn coverage_rounding() {
        assert_eq!(coverage_u8(0.0), 0);
        assert_eq!(coverage_u8(0.5), 128);
        assert_eq!(coverage_u8(1.5), 255);
        assert_eq!(edge_coverage(0.0), 0.5);
        assert_eq!(edge_coverage(-3.0), 1.0);
    }

    // ── spans ─────────────────────────────────────────────────────────────

    #[test]
    fn span_is_clipped_to_row() {
        let mut p = Picture::new(4, 2);
        let brush = PaintBrush::solid(Rgba::BLACK);
        let sampler = brush.bind(p.bounds());
        let pen = Pen::new(&p, true);
        fill_span(&mut p, pen, 1, -10, 10, &sampler);
        fill_span(&mut p, pen, 5, 0, 4, &sampler);
        assert!(p.row(1).iter().all(|&c| c == Rgba::BLACK));
        assert!(p.row(0).iter().all(|&c| c == Rgba::TRANSPARENT));
    }

    #[test]
    fn mask_composite_respects_offset() {
        let mut dst = Picture::new(4, 4);
        dst.fill(Rgba::WHITE);
        let mut mask = new_mask(2, 2);
        mask_span(&mut mask, 0, 0, 2);
        let brush = PaintBrush::solid(Rgba::BLACK);
        let sampler = brush.bind(dst.bounds());
        let pen = Pen::new(&dst, true);
        composite_mask(&mut dst, pen, &mask, 3, -1, &sampler);
        assert_eq!(dst.pixel(3, 0), Some(Rgba::WHITE));
        composite_mask(&mut dst, pen, &mask, 3, 3, &sampler);
        assert_eq!(dst.pixel(3, 3), Some(Rgba::BLACK));
        assert_eq!(dst.pixel(2, 3), Some(Rgba::WHITE));
    }
}
