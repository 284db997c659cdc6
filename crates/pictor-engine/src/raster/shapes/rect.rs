use crate::coords::{PixelRect, saturate};
use crate::paint::{PaintBrush, Rgba};
use crate::picture::Picture;
use crate::raster::common::{Pen, coverage_u8, edge_coverage, fill_span, plot};
use crate::raster::{Rasterizer, Shadow};

/// Rectangle with optional rounded corners and optional outline-only
/// drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RectCmd {
    pub rect: PixelRect,
    pub radius: i32,
    pub line_width: i32,
    pub brush: PaintBrush,
    pub blend: bool,
    pub shadow: Option<Shadow>,
}

impl RectCmd {
    #[inline]
    pub fn new(rect: PixelRect, radius: i32, line_width: i32, brush: PaintBrush) -> Self {
        Self { rect, radius, line_width, brush, blend: true, shadow: None }
    }

    /// Solid, square-cornered fill.
    #[inline]
    pub fn filled(x: i32, y: i32, width: i32, height: i32, brush: PaintBrush) -> Self {
        Self::new(PixelRect::new(x, y, width, height), 0, 0, brush)
    }

    #[inline]
    pub fn with_blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }

    #[inline]
    pub fn with_shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }
}

impl Rasterizer {
    /// Draws a (rounded) rectangle, filled or as an outline.
    ///
    /// Each row is split into two corner patches and the straight part
    /// between them; corner pixels get antialiased coverage from their
    /// distance to the corner arc, so every covered pixel is written
    /// exactly once. A line width of at least half the shorter side
    /// degenerates to a fill.
    pub fn rect(&mut self, dst: &mut Picture, cmd: &RectCmd) {
        let r = cmd.rect;
        if r.is_empty() {
            return;
        }

        if let Some(shadow) = &cmd.shadow {
            self.cast_shadow(dst, r, shadow, false, |ras, mask, tx, ty| {
                let silhouette = RectCmd {
                    rect: r.translate(tx, ty),
                    brush: PaintBrush::solid(Rgba::WHITE),
                    blend: false,
                    shadow: None,
                    ..cmd.clone()
                };
                ras.rect(mask, &silhouette);
            });
        }

        let Some(clip) = r.intersect(dst.bounds()) else {
            return;
        };

        let short = r.width.min(r.height);
        let radius = cmd.radius.clamp(0, short / 2);
        let lw = cmd.line_width;
        let filled = lw <= 0 || lw >= short - lw;

        let sampler = cmd.brush.bind(r);
        let pen = Pen::new(dst, cmd.blend);
        // Edges are widened so corners far outside the picture stay exact.
        let (x0, x1) = (r.x as i64, r.x as i64 + r.width as i64);
        let (y0, y1) = (r.y as i64, r.y as i64 + r.height as i64);
        let (radius, lw) = (radius as i64, lw as i64);

        for y in clip.y..clip.bottom() {
            let row = y as i64;
            let top_corner = row < y0 + radius;
            let corner_row = top_corner || row >= y1 - radius;
            let band_row = filled || row < y0 + lw || row >= y1 - lw;
            let inset = if corner_row { radius } else { 0 };

            if corner_row {
                let cy = if top_corner { (y0 + radius) as f32 } else { (y1 - radius) as f32 };
                let lx = (x0 + radius) as f32;
                let rx = (x1 - radius) as f32;
                let py = y as f32 + 0.5;
                let left = saturate(x0).max(clip.x)..saturate(x0 + radius).min(clip.right());
                let right = saturate(x1 - radius).max(clip.x)..saturate(x1).min(clip.right());
                for x in left.chain(right) {
                    let px = x as f32 + 0.5;
                    let cx = if (x as i64) < x0 + radius { lx } else { rx };
                    let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                    let mut cov = edge_coverage(d - radius as f32);
                    if !filled {
                        cov *= 1.0 - edge_coverage(d - (radius - lw) as f32);
                    }
                    plot(dst, pen, x, y, sampler.color_at(x, y), coverage_u8(cov));
                }
            }

            if band_row {
                fill_span(dst, pen, y, saturate(x0 + inset), saturate(x1 - inset), &sampler);
            } else {
                fill_span(dst, pen, y, saturate(x0 + inset), saturate(x0 + lw), &sampler);
                fill_span(dst, pen, y, saturate(x1 - lw), saturate(x1 - inset), &sampler);
            }
        }
    }
}
