use crate::coords::Vec2;
use crate::paint::{PaintBrush, Rgba};
use crate::picture::Picture;
use crate::raster::Rasterizer;
use crate::raster::common::{Pen, composite_mask, plot};

use super::polygon::polygon_bounds;

/// One-pixel antialiased line between two pixel centers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineCmd {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub color: Rgba,
    pub blend: bool,
}

impl LineCmd {
    #[inline]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba) -> Self {
        Self { x1, y1, x2, y2, color, blend: true }
    }

    #[inline]
    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }
}

/// Connected line segments.
///
/// Widths up to one pixel are drawn as chained [`LineCmd`] segments; wider
/// strokes fill one quad per segment, each pixel written once.
#[derive(Debug, Clone, PartialEq)]
pub struct PolylineCmd {
    pub points: Vec<Vec2>,
    pub width: f32,
    pub color: Rgba,
    pub blend: bool,
    pub antialiased: bool,
}

impl PolylineCmd {
    #[inline]
    pub fn new(points: Vec<Vec2>, width: f32, color: Rgba) -> Self {
        Self { points, width, color, blend: true, antialiased: false }
    }
}

impl Rasterizer {
    /// Draws a line with Wu's algorithm.
    ///
    /// Horizontal, vertical and diagonal lines are exact. Otherwise the
    /// major axis advances one pixel per step while a 16-bit fractional
    /// accumulator splits each step between two minor-axis pixels.
    /// Endpoints always get full weight.
    pub fn line(&mut self, dst: &mut Picture, cmd: &LineCmd) {
        let pen = Pen::new(dst, cmd.blend);
        draw_segment(dst, pen, (cmd.x1, cmd.y1), (cmd.x2, cmd.y2), cmd.color, false);
    }

    /// Draws connected segments through `cmd.points`.
    pub fn polyline(&mut self, dst: &mut Picture, cmd: &PolylineCmd) {
        if cmd.points.len() < 2
            || !cmd.width.is_finite()
            || cmd.points.iter().any(|p| !p.is_finite())
        {
            return;
        }

        if cmd.width <= 1.0 {
            let pen = Pen::new(dst, cmd.blend);
            let snap = |p: Vec2| (p.x.floor() as i32, p.y.floor() as i32);
            for (i, pair) in cmd.points.windows(2).enumerate() {
                // Joints belong to the segment that ends there.
                draw_segment(dst, pen, snap(pair[0]), snap(pair[1]), cmd.color, i > 0);
            }
            return;
        }

        let half = cmd.width * 0.5;
        let quads: Vec<[Vec2; 4]> = cmd
            .points
            .windows(2)
            .filter_map(|pair| {
                let n = (pair[1] - pair[0]).normalized().perp() * half;
                (n != Vec2::zero()).then(|| [pair[0] + n, pair[1] + n, pair[1] - n, pair[0] - n])
            })
            .collect();
        if quads.is_empty() {
            return;
        }

        let Some(area) = polygon_bounds(quads.iter().flatten().copied())
            .and_then(|b| b.intersect(dst.bounds()))
        else {
            return;
        };
        let factor = if cmd.antialiased { self.config.polygon_supersample.max(1) } else { 1 };
        let mask = self.coverage_mask(quads.iter().map(|q| &q[..]), area, factor);

        let brush = PaintBrush::solid(cmd.color);
        let sampler = brush.bind(area);
        let pen = Pen::new(dst, cmd.blend);
        composite_mask(dst, pen, &mask, area.x, area.y, &sampler);
    }
}

fn draw_segment(
    dst: &mut Picture,
    pen: Pen,
    from: (i32, i32),
    to: (i32, i32),
    color: Rgba,
    skip_from: bool,
) {
    let (pw, ph) = (dst.width() as i64, dst.height() as i64);
    let widen = |p: (i32, i32)| (p.0 as i64, p.1 as i64);
    let ((x0, y0), (x1, y1)) =
        if from.1 <= to.1 { (widen(from), widen(to)) } else { (widen(to), widen(from)) };
    if x0.max(x1) < 0 || x0.min(x1) >= pw || y1 < 0 || y0 >= ph {
        return;
    }

    let skip = skip_from.then(|| widen(from));
    let mut put = |x: i64, y: i64, weight: u8| {
        if x < 0 || y < 0 || x >= pw || y >= ph || skip == Some((x, y)) {
            return;
        }
        plot(dst, pen, x as i32, y as i32, color, weight);
    };

    let dy = y1 - y0;
    let (dx, xdir) = if x1 >= x0 { (x1 - x0, 1) } else { (x0 - x1, -1) };

    if dy == 0 {
        for x in x0.min(x1).max(0)..=x0.max(x1).min(pw - 1) {
            put(x, y0, 255);
        }
        return;
    }
    if dx == 0 {
        for y in y0.max(0)..=y1.min(ph - 1) {
            put(x0, y, 255);
        }
        return;
    }
    if dx == dy {
        for k in (-y0).max(0)..=dy.min(ph - 1 - y0) {
            put(x0 + xdir * k, y0 + k, 255);
        }
        return;
    }

    put(x0, y0, 255);
    put(x1, y1, 255);

    if dy > dx {
        // y-major: x drifts by dx/dy per row.
        let adj = ((dx as u64) << 16) / dy as u64;
        let first = (-y0).max(1);
        let last = (dy - 1).min(ph - 1 - y0);
        if first > last {
            return;
        }
        let skipped = (first - 1) as u64 * adj;
        let mut err = skipped & 0xFFFF;
        let mut x = x0 + xdir * (skipped >> 16) as i64;
        for k in first..=last {
            err += adj;
            if err >= 0x1_0000 {
                err -= 0x1_0000;
                x += xdir;
            }
            let weight = (err >> 8) as u8;
            put(x, y0 + k, 255 - weight);
            put(x + xdir, y0 + k, weight);
        }
    } else {
        // x-major: y drifts by dy/dx per column.
        let adj = ((dy as u64) << 16) / dx as u64;
        let (first, last) = if xdir > 0 {
            ((-x0).max(1), (dx - 1).min(pw - 1 - x0))
        } else {
            ((x0 - pw + 1).max(1), (dx - 1).min(x0))
        };
        if first > last {
            return;
        }
        let skipped = (first - 1) as u64 * adj;
        let mut err = skipped & 0xFFFF;
        let mut y = y0 + (skipped >> 16) as i64;
        for k in first..=last {
            err += adj;
            if err >= 0x1_0000 {
                err -= 0x1_0000;
                y += 1;
            }
            let weight = (err >> 8) as u8;
            put(x0 + xdir * k, y, 255 - weight);
            put(x0 + xdir * k, y + 1, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Picture {
        let mut p = Picture::new(w, h);
        p.fill(Rgba::WHITE);
        p
    }

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    // ── special cases ─────────────────────────────────────────────────────

    #[test]
    fn horizontal_line_fills_row_exactly() {
        let mut r = Rasterizer::default();
        let mut p = white(10, 10);
        r.line(&mut p, &LineCmd::new(0, 5, 9, 5, RED));
        for y in 0..10 {
            for x in 0..10 {
                let want = if y == 5 { RED } else { Rgba::WHITE };
                assert_eq!(p.pixel(x, y), Some(want), "({x},{y})");
            }
        }
    }

    #[test]
    fn vertical_and_diagonal_are_exact() {
        let mut r = Rasterizer::default();
        let mut p = white(6, 6);
        r.line(&mut p, &LineCmd::new(1, 5, 1, 0, RED));
        r.line(&mut p, &LineCmd::new(5, 0, 0, 5, Rgba::BLACK));
        for y in 0..6 {
            assert_eq!(p.pixel(1, y), Some(if y == 4 { Rgba::BLACK } else { RED }));
            assert_eq!(p.pixel(5 - y, y), Some(Rgba::BLACK));
        }
        assert_eq!(p.pixel(3, 3), Some(Rgba::WHITE));
    }

    // ── wu ────────────────────────────────────────────────────────────────

    #[test]
    fn shallow_line_splits_weight_per_column() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(10, 5);
        r.line(&mut p, &LineCmd::new(0, 0, 9, 3, Rgba::BLACK));
        for x in 0..10 {
            let total: u32 = (0..5).map(|y| p.pixel(x, y).unwrap().a as u32).sum();
            assert_eq!(total, 255, "column {x}");
        }
        assert_eq!(p.pixel(0, 0).unwrap().a, 255);
        assert_eq!(p.pixel(9, 3).unwrap().a, 255);
    }

    #[test]
    fn steep_line_splits_weight_per_row() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(5, 10);
        r.line(&mut p, &LineCmd::new(3, 9, 0, 0, Rgba::BLACK));
        for y in 0..10 {
            let total: u32 = (0..5).map(|x| p.pixel(x, y).unwrap().a as u32).sum();
            assert_eq!(total, 255, "row {y}");
        }
    }

    #[test]
    fn lines_far_outside_are_clipped() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(8, 8);
        r.line(&mut p, &LineCmd::new(-100, -50, 200, -20, Rgba::BLACK));
        assert!(p.pixels().iter().all(|c| c.a == 0));
        r.line(&mut p, &LineCmd::new(-100, -40, 200, 80, Rgba::BLACK));
        assert!(p.pixels().iter().any(|c| c.a > 0));
        assert_eq!(p.pixels().len(), 64);
    }

    // ── polyline ──────────────────────────────────────────────────────────

    #[test]
    fn thin_polyline_writes_joints_once() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(8, 8);
        let pts = vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(5.0, 5.0)];
        r.polyline(&mut p, &PolylineCmd::new(pts, 1.0, Rgba::new(0, 0, 0, 128)));
        assert_eq!(p.pixel(5, 0).unwrap().a, 128);
        assert_eq!(p.pixel(5, 5).unwrap().a, 128);
        assert_eq!(p.pixel(3, 0).unwrap().a, 128);
    }

    #[test]
    fn wide_polyline_fills_quad() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(20, 10);
        let pts = vec![Vec2::new(2.0, 5.0), Vec2::new(18.0, 5.0)];
        r.polyline(&mut p, &PolylineCmd::new(pts, 4.0, RED));
        for y in 3..7 {
            assert_eq!(p.pixel(10, y), Some(RED), "row {y}");
        }
        assert_eq!(p.pixel(10, 2).unwrap().a, 0);
        assert_eq!(p.pixel(10, 7).unwrap().a, 0);
        assert_eq!(p.pixel(2, 5), Some(RED));
        assert_eq!(p.pixel(18, 5).unwrap().a, 0);
    }

    #[test]
    fn wide_polyline_beyond_integer_range_is_clipped() {
        let mut r = Rasterizer::default();
        let mut p = white(8, 8);
        let pts = vec![Vec2::new(-3.0e9, 4.0), Vec2::new(3.0e9, 4.0)];
        r.polyline(&mut p, &PolylineCmd::new(pts, 3.0, RED));
        for y in 0..8 {
            let want = if (2..5).contains(&y) { RED } else { Rgba::WHITE };
            assert!((0..8).all(|x| p.pixel(x, y) == Some(want)), "row {y}");
        }
    }

    #[test]
    fn degenerate_polyline_is_noop() {
        let mut r = Rasterizer::default();
        let mut p = Picture::new(4, 4);
        r.polyline(&mut p, &PolylineCmd::new(vec![Vec2::new(1.0, 1.0)], 3.0, RED));
        let same = vec![Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0)];
        r.polyline(&mut p, &PolylineCmd::new(same, 3.0, RED));
        assert!(p.pixels().iter().all(|c| c.a == 0));
    }
}
