//! Paint model: pixel color and brushes.
//!
//! Scope:
//! - `Rgba` (8-bit straight alpha)
//! - paint sources (solid, linear and radial gradients)
//!
//! Geometry types remain in `coords`.

pub mod color;
pub mod gradient;
mod sampler;

pub use color::Rgba;
pub use gradient::{ColorStop, LinearGradient, RadialGradient, SpreadMode, Stops};
pub use sampler::BrushSampler;

use crate::coords::PixelRect;

#[derive(Debug, Clone, PartialEq)]
enum BrushKind {
    Solid(Rgba),
    Linear(LinearGradient),
    Radial(RadialGradient),
}

/// Color source for fill operations.
///
/// The brush definition is immutable once built; only the bounding region
/// used to normalize gradient coordinates can be changed, per draw call.
/// Drawing code binds a brush to the shape's bounding box when no region
/// has been set explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintBrush {
    kind: BrushKind,
    region: Option<PixelRect>,
}

impl PaintBrush {
    #[inline]
    pub fn solid(color: Rgba) -> Self {
        Self { kind: BrushKind::Solid(color), region: None }
    }

    #[inline]
    pub fn linear(gradient: LinearGradient) -> Self {
        Self { kind: BrushKind::Linear(gradient), region: None }
    }

    #[inline]
    pub fn radial(gradient: RadialGradient) -> Self {
        Self { kind: BrushKind::Radial(gradient), region: None }
    }

    /// Sets the region gradient coordinates are normalized against.
    #[inline]
    pub fn set_region(&mut self, region: PixelRect) {
        self.region = Some(region);
    }

    /// Reverts to binding against each shape's bounding box.
    #[inline]
    pub fn clear_region(&mut self) {
        self.region = None;
    }

    #[inline]
    pub fn region(&self) -> Option<PixelRect> {
        self.region
    }

    /// Constant color, if this is a solid brush.
    #[inline]
    pub fn solid_color(&self) -> Option<Rgba> {
        match &self.kind {
            BrushKind::Solid(c) => Some(*c),
            _ => None,
        }
    }

    /// True when every color the brush can produce is fully opaque.
    pub fn is_opaque(&self) -> bool {
        match &self.kind {
            BrushKind::Solid(c) => c.is_opaque(),
            BrushKind::Linear(g) => g.stops.all_opaque(),
            BrushKind::Radial(g) => g.stops.all_opaque(),
        }
    }

    /// True when the color only varies with `y`, so a fill may sample once
    /// per scanline.
    pub fn is_vertical(&self) -> bool {
        match &self.kind {
            BrushKind::Solid(_) => true,
            BrushKind::Linear(g) => g.start.x == g.end.x,
            BrushKind::Radial(_) => false,
        }
    }

    /// Color at pixel `(x, y)` against the brush's own region.
    ///
    /// Without a region, gradient coordinates are taken as absolute pixel
    /// positions.
    #[inline]
    pub fn color_at(&self, x: i32, y: i32) -> Rgba {
        self.bind(PixelRect::new(0, 0, 1, 1)).color_at(x, y)
    }

    /// Binds the brush for a draw call. `shape_bounds` is used unless a
    /// region was set explicitly.
    #[inline]
    pub fn bind(&self, shape_bounds: PixelRect) -> BrushSampler<'_> {
        BrushSampler::new(self, self.region.unwrap_or(shape_bounds))
    }
}

impl From<Rgba> for PaintBrush {
    fn from(color: Rgba) -> Self {
        PaintBrush::solid(color)
    }
}

impl From<LinearGradient> for PaintBrush {
    fn from(g: LinearGradient) -> Self {
        PaintBrush::linear(g)
    }
}

impl From<RadialGradient> for PaintBrush {
    fn from(g: RadialGradient) -> Self {
        PaintBrush::radial(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    #[test]
    fn solid_is_constant() {
        let b = PaintBrush::solid(Rgba::rgb(1, 2, 3));
        assert_eq!(b.color_at(-50, 900), Rgba::rgb(1, 2, 3));
        assert!(b.is_opaque());
        assert!(b.is_vertical());
    }

    #[test]
    fn vertical_gradient_follows_region() {
        let mut b = PaintBrush::linear(LinearGradient::vertical(Rgba::BLACK, Rgba::WHITE));
        b.set_region(PixelRect::new(0, 10, 4, 10));
        assert_eq!(b.color_at(0, 0), Rgba::BLACK);
        assert_eq!(b.color_at(3, 40), Rgba::WHITE);
        let mid = b.color_at(2, 15);
        assert!(mid.r > 100 && mid.r < 160, "{mid:?}");
        assert!(b.is_vertical());
    }

    #[test]
    fn gradient_clamps_outside_region() {
        let mut b = PaintBrush::linear(LinearGradient::horizontal(Rgba::BLACK, Rgba::WHITE));
        b.set_region(PixelRect::new(0, 0, 10, 10));
        assert_eq!(b.color_at(-100, 5), Rgba::BLACK);
        assert_eq!(b.color_at(100, 5), Rgba::WHITE);
        assert!(!b.is_vertical());
    }

    #[test]
    fn cleared_region_binds_to_shape() {
        let mut b = PaintBrush::linear(LinearGradient::horizontal(Rgba::BLACK, Rgba::WHITE));
        b.set_region(PixelRect::new(0, 0, 100, 1));
        b.clear_region();
        assert_eq!(b.region(), None);
        assert_eq!(b.solid_color(), None);
        assert_eq!(PaintBrush::solid(Rgba::WHITE).solid_color(), Some(Rgba::WHITE));
    }

    #[test]
    fn bind_prefers_explicit_region() {
        let mut b = PaintBrush::linear(LinearGradient::horizontal(Rgba::BLACK, Rgba::WHITE));
        let shape = PixelRect::new(0, 0, 100, 1);
        assert_eq!(b.bind(shape).region(), shape);
        b.set_region(PixelRect::new(5, 5, 2, 2));
        assert_eq!(b.bind(shape).region(), PixelRect::new(5, 5, 2, 2));
    }

    #[test]
    fn radial_center_and_rim() {
        let mut b = PaintBrush::radial(RadialGradient::new(
            Vec2::new(0.5, 0.5),
            0.5,
            vec![ColorStop::new(0.0, Rgba::WHITE), ColorStop::new(1.0, Rgba::BLACK)],
            SpreadMode::Pad,
        ));
        b.set_region(PixelRect::new(0, 0, 20, 20));
        assert!(b.color_at(10, 10).r > 200);
        assert_eq!(b.color_at(0, 0), Rgba::BLACK);
    }

    #[test]
    fn translucent_stop_makes_brush_translucent() {
        let g = LinearGradient::vertical(Rgba::BLACK, Rgba::WHITE.with_alpha(10));
        assert!(!PaintBrush::linear(g).is_opaque());
    }
}
