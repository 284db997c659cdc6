//! Pictor engine crate.
//!
//! Software RGBA pictures, a shape rasterizer and compositor, and painters
//! that put pictures on devices with limited color (indexed, grayscale and
//! monochrome visuals as well as packed true color).

pub mod coords;
pub mod composite;
pub mod device;
pub mod logging;
pub mod paint;
pub mod painter;
pub mod picture;
pub mod quantize;
pub mod raster;
