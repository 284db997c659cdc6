//! Display devices.
//!
//! This module is responsible for:
//! - describing a surface's color model (`Visual`, `SurfaceDescriptor`)
//! - the `Display` (color allocation) and `Surface` (native pixel I/O)
//!   contracts a platform backend implements
//! - an in-memory reference backend

mod error;
mod memory;
mod surface;
mod visual;

pub use error::{CaptureError, PaintError, PainterError};
pub use memory::{MemoryDisplay, MemorySurface};
pub use surface::{AllocatedColor, Display, NativeImage, Surface};
pub use visual::{
    ChannelField, ColormapId, DisplayId, SurfaceDescriptor, Visual, VisualClass, VisualId,
};
