/// Axis-aligned rectangle in whole pixels (top-left origin, +Y down).
///
/// Covers the half-open ranges `[x, x + width)` × `[y, y + height)`.
/// Negative sizes are allowed in transit and treated as empty.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Builds the rectangle spanning two corner points (exclusive max).
    #[inline]
    pub fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    #[inline]
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Number of pixels covered; zero for empty rectangles.
    #[inline]
    pub fn area(self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    #[inline]
    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(PixelRect::from_corners(x0, y0, x1, y1))
        }
    }

    /// Smallest rectangle covering both. Empty inputs are ignored.
    pub fn union(self, other: PixelRect) -> PixelRect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        PixelRect::from_corners(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    #[inline]
    pub fn translate(self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Grows every side by `amount` pixels.
    #[inline]
    pub fn inflate(self, amount: i32) -> PixelRect {
        let grow = amount.saturating_mul(2);
        PixelRect::new(
            self.x.saturating_sub(amount),
            self.y.saturating_sub(amount),
            self.width.saturating_add(grow),
            self.height.saturating_add(grow),
        )
    }
}

/// Clips a block transfer symmetrically.
///
/// `src` is the requested source rectangle (inside `src_bounds`) and
/// `(dx, dy)` the requested destination origin (inside `dst_bounds`).
/// Whatever is cut from one side is cut from the other, so the returned
/// source rectangle and destination origin address matching pixels.
/// Returns `None` when nothing remains.
pub fn clip_transfer(
    src: PixelRect,
    src_bounds: PixelRect,
    dx: i32,
    dy: i32,
    dst_bounds: PixelRect,
) -> Option<(PixelRect, i32, i32)> {
    let s = src.intersect(src_bounds)?;
    let dx = dx as i64 + (s.x as i64 - src.x as i64);
    let dy = dy as i64 + (s.y as i64 - src.y as i64);

    let placed = PixelRect::new(saturate(dx), saturate(dy), s.width, s.height);
    let d = placed.intersect(dst_bounds)?;
    let sx = s.x as i64 + (d.x as i64 - dx);
    let sy = s.y as i64 + (d.y as i64 - dy);

    Some((PixelRect::new(saturate(sx), saturate(sy), d.width, d.height), d.x, d.y))
}

/// Narrows a widened coordinate, saturating at the `i32` range.
#[inline]
pub(crate) fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: i32, y: i32, w: i32, h: i32) -> PixelRect { PixelRect::new(x, y, w, h) }

    // ── contains ──────────────────────────────────────────────────────────

    #[test]
    fn contains_interior_point() {
        assert!(r(0, 0, 10, 10).contains(5, 5));
    }

    #[test]
    fn contains_top_left_inclusive() {
        assert!(r(0, 0, 10, 10).contains(0, 0));
    }

    #[test]
    fn contains_bottom_right_exclusive() {
        assert!(!r(0, 0, 10, 10).contains(10, 10));
        assert!(r(0, 0, 10, 10).contains(9, 9));
    }

    #[test]
    fn contains_outside() {
        assert!(!r(0, 0, 10, 10).contains(-1, 5));
        assert!(!r(0, 0, 10, 10).contains(5, -1));
    }

    // ── intersect ─────────────────────────────────────────────────────────

    #[test]
    fn intersect_overlapping() {
        let i = r(0, 0, 10, 10).intersect(r(5, 5, 10, 10)).unwrap();
        assert_eq!(i, r(5, 5, 5, 5));
    }

    #[test]
    fn intersect_contained() {
        let inner = r(10, 10, 20, 20);
        assert_eq!(r(0, 0, 100, 100).intersect(inner).unwrap(), inner);
    }

    #[test]
    fn intersect_touching_edge_returns_none() {
        assert!(r(0, 0, 10, 10).intersect(r(10, 0, 10, 10)).is_none());
    }

    #[test]
    fn intersect_negative_size_returns_none() {
        assert!(r(0, 0, 10, 10).intersect(r(2, 2, -3, 4)).is_none());
    }

    // ── union / inflate ───────────────────────────────────────────────────

    #[test]
    fn union_skips_empty() {
        assert_eq!(r(0, 0, 0, 0).union(r(2, 3, 4, 5)), r(2, 3, 4, 5));
        assert_eq!(r(0, 0, 2, 2).union(r(4, 4, 2, 2)), r(0, 0, 6, 6));
    }

    #[test]
    fn inflate_grows_each_side() {
        assert_eq!(r(5, 5, 2, 2).inflate(3), r(2, 2, 8, 8));
    }

    #[test]
    fn extreme_offsets_saturate() {
        assert_eq!(r(i32::MIN + 1, 0, 4, 4).inflate(3), r(i32::MIN, -3, 10, 10));
        assert_eq!(r(0, 0, 4, 4).inflate(i32::MAX).width, i32::MAX);
        assert_eq!(r(10, -10, 2, 2).translate(i32::MAX, i32::MIN), r(i32::MAX, i32::MIN, 2, 2));
        assert_eq!(PixelRect::from_corners(i32::MIN, 0, i32::MAX, 1).width, i32::MAX);
    }

    // ── clip_transfer ─────────────────────────────────────────────────────

    #[test]
    fn clip_transfer_shifts_both_sides() {
        // Source hangs off the left edge of its picture; destination hangs
        // off the top of the target.
        let (src, dx, dy) =
            clip_transfer(r(-2, 0, 6, 6), r(0, 0, 10, 10), 5, -3, r(0, 0, 8, 8)).unwrap();
        assert_eq!(src, r(0, 3, 1, 3));
        assert_eq!((dx, dy), (7, 0));
    }

    #[test]
    fn clip_transfer_fully_outside() {
        assert!(clip_transfer(r(0, 0, 4, 4), r(0, 0, 10, 10), 20, 20, r(0, 0, 8, 8)).is_none());
        assert!(clip_transfer(r(12, 0, 4, 4), r(0, 0, 10, 10), 0, 0, r(0, 0, 8, 8)).is_none());
    }

    #[test]
    fn clip_transfer_handles_extreme_origins() {
        let src = r(i32::MIN + 2, 0, i32::MAX, 4);
        assert!(clip_transfer(src, r(0, 0, 4, 4), 5, 0, r(0, 0, 8, 8)).is_none());
        let (s, dx, dy) =
            clip_transfer(src, r(0, 0, 4, 4), i32::MIN + 3, 0, r(0, 0, 8, 8)).unwrap();
        assert_eq!(s, r(0, 0, 1, 4));
        assert_eq!((dx, dy), (1, 0));
        assert!(clip_transfer(r(0, 0, 4, 4), r(0, 0, 4, 4), i32::MAX, i32::MIN, r(0, 0, 8, 8))
            .is_none());
    }

    // ── is_empty ──────────────────────────────────────────────────────────

    #[test]
    fn is_empty_zero_size() {
        assert!(r(0, 0, 0, 5).is_empty());
        assert!(r(0, 0, 5, -1).is_empty());
        assert_eq!(r(0, 0, -4, 5).area(), 0);
    }
}
