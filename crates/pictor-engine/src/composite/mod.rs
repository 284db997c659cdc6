//! Pixel-level alpha compositing.
//!
//! Pure functions over `Rgba` plus picture-to-picture transfers. Shared by the
//! rasterizer (coverage blending) and the painter (blending a translucent
//! picture over captured surface pixels).

mod picture;
mod pixel;

pub use picture::{blend_picture, copy_picture};
pub use pixel::{
    blend_over, blend_over_premul, fade_by_weight, mul_div_255, premultiply, unpremultiply,
};
