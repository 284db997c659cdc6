use std::fmt;

use crate::device::ChannelField;

/// Number of levels per channel of a color ramp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RampSize {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl RampSize {
    pub const BLACK_WHITE: RampSize = RampSize::new(2, 2, 2);

    #[inline]
    pub const fn new(red: u32, green: u32, blue: u32) -> Self {
        Self { red, green, blue }
    }

    /// Same level count on every channel.
    #[inline]
    pub const fn uniform(levels: u32) -> Self {
        Self::new(levels, levels, levels)
    }

    /// Standard color cube for an indexed visual of `depth` bits;
    /// `None` at depth 2 and below, where only black and white fit.
    pub fn for_depth(depth: u8) -> Option<RampSize> {
        let (r, g, b) = match depth {
            0..=2 => return None,
            3 => (2, 2, 2),
            4 => (2, 3, 2),
            5 => (3, 4, 2),
            6 => (4, 4, 4),
            7 => (5, 5, 4),
            8 => (5, 6, 5),
            _ => (8, 8, 4),
        };
        Some(RampSize::new(r, g, b))
    }

    /// Gray levels for a grayscale indexed visual; `None` at depth 2 and
    /// below.
    pub fn gray_levels(depth: u8) -> Option<u32> {
        match depth {
            0..=2 => None,
            3 => Some(8),
            4 => Some(16),
            5 => Some(32),
            _ => Some(64),
        }
    }

    /// Levels a packed pixel can express per channel.
    pub fn for_fields(fields: &[ChannelField; 3]) -> RampSize {
        RampSize::new(fields[0].max() + 1, fields[1].max() + 1, fields[2].max() + 1)
    }

    /// Colors in the full cube.
    #[inline]
    pub fn colors(self) -> u32 {
        self.red * self.green * self.blue
    }

    /// Colors along the gray diagonal.
    #[inline]
    pub fn diagonal(self) -> u32 {
        self.red.max(self.green).max(self.blue)
    }

    /// Every channel cut to three quarters, never below two levels.
    /// `None` once the ramp is already at two levels everywhere.
    pub fn shrink(self) -> Option<RampSize> {
        if self.red <= 2 && self.green <= 2 && self.blue <= 2 {
            return None;
        }
        let cut = |n: u32| (n * 3 / 4).max(2);
        Some(RampSize::new(cut(self.red), cut(self.green), cut(self.blue)))
    }

    /// Caps every channel at 256 levels and the cube at `max_colors`.
    pub(crate) fn fit(self, max_colors: u32) -> Option<RampSize> {
        let mut ramp = RampSize::new(
            self.red.clamp(2, 256),
            self.green.clamp(2, 256),
            self.blue.clamp(2, 256),
        );
        while ramp.colors() > max_colors {
            ramp = ramp.shrink()?;
        }
        Some(ramp)
    }
}

impl fmt::Display for RampSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.red, self.green, self.blue)
    }
}

/// Device intensity of `level` out of `levels` evenly spaced steps.
#[inline]
pub(crate) fn level_value(level: u32, levels: u32) -> u8 {
    let span = levels.max(2) - 1;
    ((level.min(span) * 255 + span / 2) / span) as u8
}

/// Nearest of `levels` evenly spaced steps for an intensity.
#[inline]
pub(crate) fn nearest_level(v: u8, levels: u32) -> u32 {
    let span = levels.max(2) - 1;
    (v as u32 * span + 127) / 255
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── standard ramps ────────────────────────────────────────────────────

    #[test]
    fn deeper_visuals_get_more_colors() {
        assert_eq!(RampSize::for_depth(2), None);
        let mut last = 0;
        for depth in 3..=12 {
            let n = RampSize::for_depth(depth).unwrap().colors();
            assert!(n >= last && n <= 1 << depth, "depth {depth}: {n}");
            last = n;
        }
        assert_eq!(RampSize::for_depth(8), Some(RampSize::new(5, 6, 5)));
        assert_eq!(RampSize::gray_levels(4), Some(16));
        assert_eq!(RampSize::gray_levels(1), None);
    }

    // ── shrink ────────────────────────────────────────────────────────────

    #[test]
    fn shrinking_strictly_decreases_and_ends() {
        let mut ramp = RampSize::new(8, 8, 4);
        let mut steps = 0;
        while let Some(next) = ramp.shrink() {
            assert!(next.colors() < ramp.colors(), "{ramp} -> {next}");
            ramp = next;
            steps += 1;
        }
        assert_eq!(ramp, RampSize::BLACK_WHITE);
        assert!(steps < 10);
        assert_eq!(RampSize::new(3, 2, 2).shrink(), Some(RampSize::BLACK_WHITE));
    }

    #[test]
    fn fit_respects_colormap_size() {
        let r = RampSize::new(5, 6, 5).fit(64).unwrap();
        assert!(r.colors() <= 64);
        assert_eq!(RampSize::new(5, 6, 5).fit(4), None);
        assert_eq!(RampSize::uniform(1000).fit(u32::MAX), Some(RampSize::uniform(256)));
    }

    // ── levels ────────────────────────────────────────────────────────────

    #[test]
    fn levels_span_full_range() {
        assert_eq!(level_value(0, 5), 0);
        assert_eq!(level_value(4, 5), 255);
        assert_eq!(level_value(2, 5), 128);
        assert_eq!(nearest_level(0, 5), 0);
        assert_eq!(nearest_level(255, 5), 4);
        assert_eq!(nearest_level(128, 5), 2);
        for v in 0..=255u8 {
            let back = level_value(nearest_level(v, 6), 6);
            assert!(back.abs_diff(v) <= 26, "{v} -> {back}");
        }
    }
}
