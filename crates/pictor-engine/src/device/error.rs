use std::fmt;

use crate::coords::PixelRect;

use super::VisualClass;

/// Failure to read pixels back from a surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The region is not entirely inside the surface.
    OutOfBounds(PixelRect),
    /// Part of the region is covered and its contents are unavailable.
    Obscured(PixelRect),
    /// The surface stores pixels in a format that cannot be read.
    Unsupported,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::OutOfBounds(r) => {
                write!(f, "capture region {r:?} is outside the surface")
            }
            CaptureError::Obscured(r) => write!(f, "capture region {r:?} is obscured"),
            CaptureError::Unsupported => f.write_str("surface pixel format cannot be captured"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Failure of a single paint request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaintError {
    /// Reading the backdrop for a translucent picture failed.
    Capture(CaptureError),
    /// The surface's storage format has no codec.
    Unsupported { bits_per_pixel: u8 },
    /// The surface uses another colormap, visual, depth or gamma than the
    /// painter was built for.
    FormatMismatch,
}

impl fmt::Display for PaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintError::Capture(e) => write!(f, "backdrop capture failed: {e}"),
            PaintError::Unsupported { bits_per_pixel } => {
                write!(f, "unsupported surface format ({bits_per_pixel} bits per pixel)")
            }
            PaintError::FormatMismatch => {
                f.write_str("surface format differs from the painter's descriptor")
            }
        }
    }
}

impl std::error::Error for PaintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaintError::Capture(e) => Some(e),
            PaintError::Unsupported { .. } | PaintError::FormatMismatch => None,
        }
    }
}

impl From<CaptureError> for PaintError {
    fn from(e: CaptureError) -> Self {
        PaintError::Capture(e)
    }
}

/// Failure to create a painter for a surface descriptor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PainterError {
    /// Not even black and white could be realized.
    NoColors,
    /// The visual or storage format has no codec.
    UnsupportedVisual { class: VisualClass, bits_per_pixel: u8 },
}

impl fmt::Display for PainterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PainterError::NoColors => f.write_str("no colors could be allocated"),
            PainterError::UnsupportedVisual { class, bits_per_pixel } => {
                write!(f, "unsupported visual {class:?} at {bits_per_pixel} bits per pixel")
            }
        }
    }
}

impl std::error::Error for PainterError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn paint_error_exposes_capture_source() {
        let e = PaintError::from(CaptureError::Obscured(PixelRect::new(1, 2, 3, 4)));
        assert!(e.source().is_some());
        assert!(e.to_string().contains("obscured"));
        assert!(PaintError::Unsupported { bits_per_pixel: 12 }.source().is_none());
        assert!(PaintError::FormatMismatch.to_string().contains("descriptor"));
    }
}
