use crate::coords::Vec2;

use super::Rgba;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    #[default]
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    /// Maps an unbounded gradient parameter into [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        if !t.is_finite() {
            return 0.0;
        }
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// A single gradient stop with a straight-alpha color.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Rgba,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Rgba) -> Self {
        Self { t, color }
    }
}

/// Sorted stop list shared by the gradient kinds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stops(Vec<ColorStop>);

impl Stops {
    /// Sorts by `t`; non-finite positions are dropped.
    pub fn new(mut stops: Vec<ColorStop>) -> Self {
        stops.retain(|s| s.t.is_finite());
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self(stops)
    }

    #[inline]
    pub fn as_slice(&self) -> &[ColorStop] {
        &self.0
    }

    /// Interpolated color at `t` (already spread into [0, 1]).
    pub fn sample(&self, t: f32) -> Rgba {
        let stops = &self.0;
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return Rgba::TRANSPARENT;
        };
        if t <= first.t {
            return first.color;
        }
        if t >= last.t {
            return last.color;
        }
        for pair in stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = b.t - a.t;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.t) / span);
            }
        }
        last.color
    }

    pub fn all_opaque(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|s| s.color.is_opaque())
    }
}

/// Linear gradient along an axis.
///
/// `start` and `end` are in normalized region coordinates: `(0, 0)` is the
/// top-left of the bound region and `(1, 1)` its bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Stops,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self { start, end, stops: Stops::new(stops), spread }
    }

    /// Top-to-bottom gradient between two colors.
    pub fn vertical(top: Rgba, bottom: Rgba) -> Self {
        Self::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            vec![ColorStop::new(0.0, top), ColorStop::new(1.0, bottom)],
            SpreadMode::Pad,
        )
    }

    /// Left-to-right gradient between two colors.
    pub fn horizontal(left: Rgba, right: Rgba) -> Self {
        Self::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            vec![ColorStop::new(0.0, left), ColorStop::new(1.0, right)],
            SpreadMode::Pad,
        )
    }

    /// Returns true when the gradient definition is structurally usable.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && !self.stops.as_slice().is_empty()
            && (self.end.x != self.start.x || self.end.y != self.start.y)
    }

    /// Gradient parameter for a normalized point, before spreading.
    #[inline]
    pub fn parameter(&self, p: Vec2) -> f32 {
        let axis = self.end - self.start;
        let len2 = axis.dot(axis);
        if len2 <= 0.0 {
            return 0.0;
        }
        (p - self.start).dot(axis) / len2
    }
}

/// Radial gradient: `t` grows with distance from `center`, reaching 1 at
/// `radius`. Both are in normalized region coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: Stops,
    pub spread: SpreadMode,
}

impl RadialGradient {
    pub fn new(center: Vec2, radius: f32, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self { center, radius, stops: Stops::new(stops), spread }
    }

    #[inline]
    pub fn parameter(&self, p: Vec2) -> f32 {
        if self.radius <= 0.0 {
            return 1.0;
        }
        (p - self.center).length() / self.radius
    }
}
