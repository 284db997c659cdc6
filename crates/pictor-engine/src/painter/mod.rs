//! Painting pictures onto device surfaces.
//!
//! This module is responsible for:
//! - converting pictures to native pixels through a `ColorQuantizer`
//! - compositing translucent pictures over captured surface contents
//! - sharing painters between surfaces of the same format (`PainterCache`)

mod cache;
mod codec;
mod dither;
#[allow(clippy::module_inception)]
mod painter;

pub use cache::{PainterCache, PainterHandle};
pub use painter::{Painter, PainterInit, PainterState};
