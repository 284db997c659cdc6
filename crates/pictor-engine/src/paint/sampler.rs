use crate::coords::{PixelRect, Vec2};

use super::{BrushKind, PaintBrush, Rgba};

/// A brush bound to a normalization region for one draw call.
#[derive(Debug, Copy, Clone)]
pub struct BrushSampler<'a> {
    brush: &'a PaintBrush,
    region: PixelRect,
    inv_w: f32,
    inv_h: f32,
}

impl<'a> BrushSampler<'a> {
    pub(super) fn new(brush: &'a PaintBrush, region: PixelRect) -> Self {
        let inv_w = if region.width > 0 { 1.0 / region.width as f32 } else { 0.0 };
        let inv_h = if region.height > 0 { 1.0 / region.height as f32 } else { 0.0 };
        Self { brush, region, inv_w, inv_h }
    }

    #[inline]
    pub fn region(&self) -> PixelRect {
        self.region
    }

    #[inline]
    pub fn brush(&self) -> &'a PaintBrush {
        self.brush
    }

    /// Straight-alpha color at pixel `(x, y)`, sampled at the pixel center.
    #[inline]
    pub fn color_at(&self, x: i32, y: i32) -> Rgba {
        match &self.brush.kind {
            BrushKind::Solid(c) => *c,
            BrushKind::Linear(g) => {
                let t = g.parameter(self.normalize(x, y));
                g.stops.sample(g.spread.apply(t))
            }
            BrushKind::Radial(g) => {
                let t = g.parameter(self.normalize(x, y));
                g.stops.sample(g.spread.apply(t))
            }
        }
    }

    #[inline]
    fn normalize(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5 - self.region.x as f32) * self.inv_w,
            (y as f32 + 0.5 - self.region.y as f32) * self.inv_h,
        )
    }
}
