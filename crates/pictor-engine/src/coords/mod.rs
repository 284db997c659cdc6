//! Geometry types shared by pictures, brushes and the rasterizer.
//!
//! Canonical space:
//! - picture pixels, origin top-left
//! - +X right, +Y down
//! - integer coordinates address whole pixels; `Vec2` is continuous

mod rect;
mod vec2;

pub use rect::{clip_transfer, PixelRect};
pub(crate) use rect::saturate;
pub use vec2::Vec2;
