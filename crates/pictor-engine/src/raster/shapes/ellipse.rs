use crate::coords::{PixelRect, saturate};
use crate::paint::{BrushSampler, PaintBrush, Rgba};
use crate::picture::{Picture, downsample};
use crate::raster::common::{
    COORD_LIMIT, Pen, composite_mask, coverage_u8, edge_coverage, fill_span, new_mask, plot,
};
use crate::raster::{Rasterizer, Shadow};

/// Radii beyond this draw nothing.
const MAX_RADIUS: i32 = 1 << 20;

/// Circle or axis-aligned ellipse centered on a pixel.
///
/// `line_width <= 0`, or a width reaching the smaller radius, fills the
/// ellipse; otherwise a ring of that width is drawn inside the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseCmd {
    pub cx: i32,
    pub cy: i32,
    pub rx: i32,
    pub ry: i32,
    pub line_width: i32,
    pub brush: PaintBrush,
    pub blend: bool,
    pub antialiased: bool,
    pub shadow: Option<Shadow>,
}

impl EllipseCmd {
    #[inline]
    pub fn filled(cx: i32, cy: i32, rx: i32, ry: i32, brush: PaintBrush) -> Self {
        Self {
            cx,
            cy,
            rx,
            ry,
            line_width: 0,
            brush,
            blend: true,
            antialiased: false,
            shadow: None,
        }
    }

    #[inline]
    pub fn circle(cx: i32, cy: i32, radius: i32, brush: PaintBrush) -> Self {
        Self::filled(cx, cy, radius, radius, brush)
    }

    #[inline]
    pub fn stroked(mut self, line_width: i32) -> Self {
        self.line_width = line_width;
        self
    }

    #[inline]
    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
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

    /// Pixel extent of the outline.
    pub fn bounds(&self) -> PixelRect {
        let (cx, cy) = (self.cx as i64, self.cy as i64);
        let (rx, ry) = (self.rx as i64, self.ry as i64);
        PixelRect::new(
            saturate(cx - rx),
            saturate(cy - ry),
            saturate(2 * rx + 1),
            saturate(2 * ry + 1),
        )
    }

    /// Inner radii of the ring, or `None` when filled.
    fn inner_radii(&self) -> Option<(i32, i32)> {
        let lw = self.line_width;
        (lw > 0 && lw < self.rx.min(self.ry)).then(|| (self.rx - lw, self.ry - lw))
    }
}

impl Rasterizer {
    /// Draws a circle or ellipse.
    ///
    /// Without antialiasing, row half-widths come from the midpoint
    /// algorithm for one quadrant and are mirrored into the other three.
    /// With antialiasing, each pixel's coverage is `0.5 - d` for its
    /// distance `d` outside the outline (rings also subtract the inner
    /// disc), or, with `supersample_ellipses`, a box-filtered supersampled
    /// mask.
    pub fn ellipse(&mut self, dst: &mut Picture, cmd: &EllipseCmd) {
        if cmd.rx <= 0 || cmd.ry <= 0 || cmd.rx > MAX_RADIUS || cmd.ry > MAX_RADIUS {
            return;
        }
        let far = COORD_LIMIT.unsigned_abs();
        if cmd.cx.unsigned_abs() > far || cmd.cy.unsigned_abs() > far {
            return;
        }
        let bounds = cmd.bounds();

        if let Some(shadow) = &cmd.shadow {
            self.cast_shadow(dst, bounds, shadow, false, |r, mask, tx, ty| {
                let silhouette = EllipseCmd {
                    cx: cmd.cx.saturating_add(tx),
                    cy: cmd.cy.saturating_add(ty),
                    brush: PaintBrush::solid(Rgba::WHITE),
                    blend: false,
                    shadow: None,
                    ..cmd.clone()
                };
                r.ellipse(mask, &silhouette);
            });
        }

        let Some(clip) = bounds.intersect(dst.bounds()) else {
            return;
        };
        let sampler = cmd.brush.bind(bounds);
        let pen = Pen::new(dst, cmd.blend);

        if !cmd.antialiased {
            self.ellipse_spans(dst, pen, cmd, clip, &sampler);
        } else if self.config.supersample_ellipses {
            self.ellipse_supersampled(dst, pen, cmd, clip, &sampler);
        } else {
            ellipse_analytic(dst, pen, cmd, clip, &sampler);
        }
    }

    fn ellipse_spans(
        &mut self,
        dst: &mut Picture,
        pen: Pen,
        cmd: &EllipseCmd,
        clip: PixelRect,
        sampler: &BrushSampler<'_>,
    ) {
        quadrant_extents(cmd.rx, cmd.ry, &mut self.extents);
        let inner = cmd.inner_radii();
        if let Some((irx, iry)) = inner {
            quadrant_extents(irx, iry, &mut self.inner_extents);
        }

        let rows = (clip.y - cmd.cy).max(-cmd.ry)..=(clip.bottom() - 1 - cmd.cy).min(cmd.ry);
        for dy in rows {
            let y = cmd.cy + dy;
            let row = dy.unsigned_abs() as usize;
            let e = self.extents[row];
            match inner {
                Some((_, iry)) if dy.abs() <= iry => {
                    let ie = self.inner_extents[row];
                    fill_span(dst, pen, y, cmd.cx - e, cmd.cx - ie, sampler);
                    fill_span(dst, pen, y, cmd.cx + ie + 1, cmd.cx + e + 1, sampler);
                }
                _ => fill_span(dst, pen, y, cmd.cx - e, cmd.cx + e + 1, sampler),
            }
        }
    }

    fn ellipse_supersampled(
        &mut self,
        dst: &mut Picture,
        pen: Pen,
        cmd: &EllipseCmd,
        clip: PixelRect,
        sampler: &BrushSampler<'_>,
    ) {
        let factor = self.config.ellipse_supersample.max(1);
        let f = factor as i32;
        let step = 1.0 / factor as f32;
        let inside = |px: f32, py: f32, rx: i32, ry: i32| {
            let (nx, ny) = (px / rx as f32, py / ry as f32);
            nx * nx + ny * ny <= 1.0
        };
        let inner = cmd.inner_radii();

        let mut mask = new_mask(clip.width * f, clip.height * f);
        for sy in 0..clip.height * f {
            let py = (clip.y - cmd.cy) as f32 + (sy as f32 + 0.5) * step - 0.5;
            for sx in 0..clip.width * f {
                let px = (clip.x - cmd.cx) as f32 + (sx as f32 + 0.5) * step - 0.5;
                let hit = inside(px, py, cmd.rx, cmd.ry)
                    && !inner.is_some_and(|(irx, iry)| inside(px, py, irx, iry));
                if hit {
                    mask.set_pixel(sx, sy, Rgba::WHITE);
                }
            }
        }

        let mask = if factor > 1 { downsample(&mask, factor) } else { mask };
        composite_mask(dst, pen, &mask, clip.x, clip.y, sampler);
    }
}

fn ellipse_analytic(
    dst: &mut Picture,
    pen: Pen,
    cmd: &EllipseCmd,
    clip: PixelRect,
    sampler: &BrushSampler<'_>,
) {
    let inner = cmd.inner_radii();
    for y in clip.y..clip.bottom() {
        let py = (y - cmd.cy) as f32;
        for x in clip.x..clip.right() {
            let px = (x - cmd.cx) as f32;
            let mut cov = edge_coverage(ellipse_distance(px, py, cmd.rx, cmd.ry));
            if let Some((irx, iry)) = inner {
                cov *= 1.0 - edge_coverage(ellipse_distance(px, py, irx, iry));
            }
            plot(dst, pen, x, y, sampler.color_at(x, y), coverage_u8(cov));
        }
    }
}

/// Approximate signed distance from `(px, py)` (relative to the center) to
/// the ellipse outline; negative inside. Exact for circles.
fn ellipse_distance(px: f32, py: f32, rx: i32, ry: i32) -> f32 {
    let (rx, ry) = (rx as f32, ry as f32);
    let (nx, ny) = (px / rx, py / ry);
    let g = (nx * nx + ny * ny).sqrt();
    if g == 0.0 {
        return -rx.min(ry);
    }
    let grad = ((nx / rx).powi(2) + (ny / ry).powi(2)).sqrt() / g;
    (g - 1.0) / grad
}

/// Midpoint ellipse walk over one quadrant. `ext[dy]` receives the largest
/// `dx` of the outline on row `dy`, for `dy` in `0..=ry`.
fn quadrant_extents(rx: i32, ry: i32, ext: &mut Vec<i32>) {
    ext.clear();
    ext.resize(ry as usize + 1, 0);

    let (a2, b2) = ((rx as i128).pow(2), (ry as i128).pow(2));
    let (mut x, mut y) = (0i128, ry as i128);

    // Decision variables are scaled by 4 to stay integral.
    let mut d = 4 * b2 - 4 * a2 * y + a2;
    while b2 * x < a2 * y {
        ext[y as usize] = ext[y as usize].max(x as i32);
        if d < 0 {
            d += 4 * b2 * (2 * x + 3);
        } else {
            d += 4 * b2 * (2 * x + 3) + 4 * a2 * (2 - 2 * y);
            y -= 1;
        }
        x += 1;
    }

    d = b2 * (2 * x + 1).pow(2) + 4 * a2 * (y - 1).pow(2) - 4 * a2 * b2;
    while y >= 0 {
        ext[y as usize] = ext[y as usize].max(x as i32);
        if d > 0 {
            d += 4 * a2 * (3 - 2 * y);
        } else {
            d += 4 * b2 * (2 * x + 2) + 4 * a2 * (3 - 2 * y);
            x += 1;
        }
        y -= 1;
    }
}
