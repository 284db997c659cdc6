//! Software rasterizer.
//!
//! Draws lines, ellipses, rounded rectangles and polygons into a
//! [`Picture`](crate::picture::Picture) with a [`PaintBrush`](crate::paint::PaintBrush).
//!
//! Extending the rasterizer:
//! - add a command struct and its `Rasterizer` method under `raster::shapes::*`
//! - route shadows through `Rasterizer::cast_shadow`
//!
//! Every write is clipped to the destination; degenerate geometry draws
//! nothing.

mod common;
mod shadow;
pub mod shapes;

pub use shadow::Shadow;
pub use shapes::{EllipseCmd, LineCmd, PolygonCmd, PolylineCmd, RectCmd};

use shapes::polygon::EdgeTable;

/// Tunables for antialiasing and blur.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RasterConfig {
    /// Supersample factor for antialiased ellipses when
    /// `supersample_ellipses` is set.
    pub ellipse_supersample: u32,
    /// Antialias ellipses by supersampling instead of analytic edge distance.
    pub supersample_ellipses: bool,
    /// Supersample factor for antialiased polygons.
    pub polygon_supersample: u32,
    /// Box blur passes per shadow; two approximate a Gaussian.
    pub blur_passes: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            ellipse_supersample: 3,
            supersample_ellipses: false,
            polygon_supersample: 4,
            blur_passes: 2,
        }
    }
}

/// Stateful rasterizer: configuration plus reusable scratch buffers.
#[derive(Debug, Default)]
pub struct Rasterizer {
    config: RasterConfig,
    edges: EdgeTable,
    extents: Vec<i32>,
    inner_extents: Vec<i32>,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config, ..Self::default() }
    }

    #[inline]
    pub fn config(&self) -> RasterConfig {
        self.config
    }
}
