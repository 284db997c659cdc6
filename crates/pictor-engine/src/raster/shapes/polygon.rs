use crate::coords::{PixelRect, Vec2};
use crate::paint::{PaintBrush, Rgba};
use crate::picture::{Picture, downsample};
use crate::raster::common::{
    COORD_LIMIT, Pen, composite_mask, fill_span, mask_span, new_mask,
};
use crate::raster::{Rasterizer, Shadow};

/// Polygon fill with the even-odd rule. Concave and self-intersecting
/// outlines are allowed; the outline closes implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonCmd {
    pub points: Vec<Vec2>,
    pub brush: PaintBrush,
    pub blend: bool,
    pub antialiased: bool,
    pub shadow: Option<Shadow>,
}

impl PolygonCmd {
    #[inline]
    pub fn new(points: Vec<Vec2>, brush: PaintBrush) -> Self {
        Self { points, brush, blend: true, antialiased: false, shadow: None }
    }

    #[inline]
    pub fn antialiased(mut self, on: bool) -> Self {
        self.antialiased = on;
        self
    }

    #[inline]
    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

// ── active edge table ─────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone)]
struct Edge {
    /// First scanline crossed.
    y_start: i32,
    /// One past the last scanline crossed.
    y_end: i32,
    /// Crossing at the current scanline's center.
    x: f32,
    /// Change of `x` per scanline.
    dx: f32,
}

/// Scan converter state, kept between calls to reuse allocations.
#[derive(Debug, Default)]
pub(crate) struct EdgeTable {
    edges: Vec<Edge>,
    active: Vec<Edge>,
}

impl EdgeTable {
    /// Emits the even-odd interior of `points` as spans `(y, x0, x1)`,
    /// `x1` exclusive, restricted to `clip`.
    ///
    /// A pixel is inside when its center is. Edges enter the active list as
    /// the scanline reaches their upper vertex and leave past their lower
    /// one; the active list is kept sorted by crossing.
    pub(crate) fn scan(
        &mut self,
        points: &[Vec2],
        clip: PixelRect,
        mut span: impl FnMut(i32, i32, i32),
    ) {
        let Self { edges, active } = self;
        edges.clear();
        active.clear();
        if points.len() < 3 || clip.is_empty() {
            return;
        }

        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            if p.y == q.y {
                continue;
            }
            let (top, bot) = if p.y < q.y { (p, q) } else { (q, p) };
            let y_start = (top.y - 0.5).ceil() as i32;
            let y_end = (bot.y - 0.5).ceil() as i32;
            if y_start >= y_end {
                continue;
            }
            let dx = (bot.x - top.x) / (bot.y - top.y);
            let x = top.x + (y_start as f32 + 0.5 - top.y) * dx;
            edges.push(Edge { y_start, y_end, x, dx });
        }
        if edges.is_empty() {
            return;
        }
        edges.sort_by_key(|e| e.y_start);

        let y_first = edges[0].y_start.max(clip.y);
        let y_last = edges.iter().map(|e| e.y_end).max().unwrap_or(0).min(clip.bottom());
        let mut next = 0;

        for y in y_first..y_last {
            active.retain(|e| e.y_end > y);
            while next < edges.len() && edges[next].y_start <= y {
                let mut e = edges[next];
                next += 1;
                if e.y_end > y {
                    e.x += e.dx * (y as i64 - e.y_start as i64) as f32;
                    active.push(e);
                }
            }
            active.sort_by(|a, b| a.x.total_cmp(&b.x));

            for pair in active.chunks_exact(2) {
                let x0 = ((pair[0].x - 0.5).ceil() as i32).max(clip.x);
                let x1 = ((pair[1].x - 0.5).floor() as i32).saturating_add(1).min(clip.right());
                if x0 < x1 {
                    span(y, x0, x1);
                }
            }
            for e in active.iter_mut() {
                e.x += e.dx;
            }
        }
    }
}

/// Smallest pixel rectangle containing all `points`.
pub(crate) fn polygon_bounds(points: impl Iterator<Item = Vec2>) -> Option<PixelRect> {
    let mut it = points.peekable();
    it.peek()?;
    let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for p in it {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }
    let limit = COORD_LIMIT as f32;
    let snap = |v: f32| v.clamp(-limit, limit) as i32;
    let r = PixelRect::from_corners(
        snap(x0.floor()),
        snap(y0.floor()),
        snap(x1.ceil()) + 1,
        snap(y1.ceil()) + 1,
    );
    (!r.is_empty()).then_some(r)
}

impl Rasterizer {
    /// Fills a polygon.
    ///
    /// The antialiased path scan converts at `polygon_supersample` times the
    /// resolution and box filters down. A shadow is knocked out where the
    /// polygon itself lands, so translucent fills do not show it through.
    pub fn polygon(&mut self, dst: &mut Picture, cmd: &PolygonCmd) {
        if cmd.points.len() < 3 || cmd.points.iter().any(|p| !p.is_finite()) {
            return;
        }
        let Some(bounds) = polygon_bounds(cmd.points.iter().copied()) else {
            return;
        };

        if let Some(shadow) = &cmd.shadow {
            let antialiased = cmd.antialiased;
            self.cast_shadow(dst, bounds, shadow, true, |r, mask, tx, ty| {
                let offset = Vec2::new(tx as f32, ty as f32);
                let moved = cmd.points.iter().map(|&p| p + offset).collect();
                let silhouette = PolygonCmd {
                    blend: false,
                    ..PolygonCmd::new(moved, PaintBrush::solid(Rgba::WHITE))
                }
                .antialiased(antialiased);
                r.polygon(mask, &silhouette);
            });
        }

        let sampler = cmd.brush.bind(bounds);
        let pen = Pen::new(dst, cmd.blend);

        if cmd.antialiased {
            let Some(area) = bounds.intersect(dst.bounds()) else {
                return;
            };
            let factor = self.config.polygon_supersample;
            let mask = self.coverage_mask(std::iter::once(&cmd.points[..]), area, factor);
            composite_mask(dst, pen, &mask, area.x, area.y, &sampler);
        } else {
            let clip = dst.bounds();
            self.edges
                .scan(&cmd.points, clip, |y, x0, x1| fill_span(dst, pen, y, x0, x1, &sampler));
        }
    }

    /// Coverage of the union of `polygons` over `area`, scan converted at
    /// `factor` times the resolution and box filtered down to one mask
    /// pixel per destination pixel.
    pub(crate) fn coverage_mask<'p>(
        &mut self,
        polygons: impl Iterator<Item = &'p [Vec2]>,
        area: PixelRect,
        factor: u32,
    ) -> Picture {
        let factor = factor.max(1);
        let f = factor as i32;
        let mut mask = new_mask(area.width * f, area.height * f);
        let clip = mask.bounds();
        let origin = Vec2::new(area.x as f32, area.y as f32);

        let mut scaled = Vec::new();
        for poly in polygons {
            scaled.clear();
            scaled.extend(poly.iter().map(|&p| (p - origin) * factor as f32));
            self.edges.scan(&scaled, clip, |y, x0, x1| mask_span(&mut mask, y, x0, x1));
        }

        if factor > 1 { downsample(&mask, factor) } else { mask }
    }
}
