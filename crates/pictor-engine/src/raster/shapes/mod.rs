//! Shape commands and their rasterizers.

pub mod ellipse;
pub mod line;
pub mod polygon;
pub mod rect;

pub use ellipse::EllipseCmd;
pub use line::{LineCmd, PolylineCmd};
pub use polygon::PolygonCmd;
pub use rect::RectCmd;
