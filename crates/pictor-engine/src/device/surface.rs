use crate::coords::PixelRect;
use crate::paint::Rgba;

use super::{CaptureError, ColormapId, DisplayId, SurfaceDescriptor};

/// A color cell realized by a display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AllocatedColor {
    /// Device pixel value.
    pub pixel: u32,
    /// Color the display actually shows for `pixel`, which may differ from
    /// the requested one by the display's rounding.
    pub rgb: Rgba,
}

/// Color allocation side of a display connection.
pub trait Display {
    fn id(&self) -> DisplayId;

    /// Allocates (or shares) a read-only cell closest to `rgb`.
    /// `None` when the colormap is exhausted.
    fn alloc_color(&mut self, colormap: ColormapId, rgb: Rgba) -> Option<AllocatedColor>;

    /// Releases cells previously returned by `alloc_color`.
    fn free_colors(&mut self, colormap: ColormapId, pixels: &[u32]);

    /// Permanently available black and white pixels, as `(black, white)`.
    fn black_white(&self, colormap: ColormapId) -> Option<(u32, u32)>;
}

/// A block of device pixels, little-endian packed, rows without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeImage {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    pub data: Vec<u8>,
}

impl NativeImage {
    /// Zero-filled image.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        let len = width as usize * height as usize * bytes_per_pixel;
        Self { width, height, bytes_per_pixel, data: vec![0; len] }
    }

    /// Packs row-major pixel values, keeping the low `bytes_per_pixel`
    /// bytes of each.
    pub fn from_pixels(width: u32, height: u32, bytes_per_pixel: usize, pixels: &[u32]) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        let data = match bytes_per_pixel {
            4 => {
                let le: Vec<u32> = pixels.iter().map(|p| p.to_le()).collect();
                bytemuck::cast_slice(&le).to_vec()
            }
            n => pixels.iter().flat_map(|p| p.to_le_bytes().into_iter().take(n)).collect(),
        };
        Self { width, height, bytes_per_pixel, data }
    }

    /// Unpacks every pixel value in row-major order.
    pub fn pixels(&self) -> Vec<u32> {
        let n = self.bytes_per_pixel;
        if n == 4 {
            return self
                .data
                .chunks_exact(4)
                .map(|c| u32::from_le(bytemuck::pod_read_unaligned(c)))
                .collect();
        }
        self.data.chunks_exact(n).map(unpack).collect()
    }

    /// Pixel value at `(x, y)`; `None` outside.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let n = self.bytes_per_pixel;
        let at = (y as usize * self.width as usize + x as usize) * n;
        self.data.get(at..at + n).map(unpack)
    }
}

#[inline]
fn unpack(bytes: &[u8]) -> u32 {
    let mut b = [0u8; 4];
    b[..bytes.len()].copy_from_slice(bytes);
    u32::from_le_bytes(b)
}

/// Native pixel storage of a drawable.
pub trait Surface {
    fn descriptor(&self) -> &SurfaceDescriptor;

    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    #[inline]
    fn bounds(&self) -> PixelRect {
        let (w, h) = self.size();
        PixelRect::from_size(w as i32, h as i32)
    }

    /// Reads the device pixels of `rect`.
    fn read_native(&self, rect: PixelRect) -> Result<NativeImage, CaptureError>;

    /// Writes `image` with its top-left corner at `(x, y)`. Parts outside
    /// the surface are dropped.
    fn write_native(&mut self, x: i32, y: i32, image: &NativeImage);
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── NativeImage ───────────────────────────────────────────────────────

    #[test]
    fn packs_little_endian_by_width() {
        let img = NativeImage::from_pixels(2, 1, 2, &[0x1234, 0xABCD]);
        assert_eq!(img.data, vec![0x34, 0x12, 0xCD, 0xAB]);
        let img = NativeImage::from_pixels(1, 1, 3, &[0x00AA_BBCC]);
        assert_eq!(img.data, vec![0xCC, 0xBB, 0xAA]);
        let img = NativeImage::from_pixels(1, 1, 4, &[0x1122_3344]);
        assert_eq!(img.data, vec![0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn unpacks_what_was_packed() {
        let px = [0xFF00_0000, 7, 0x00FF_FFFF, 42];
        let img = NativeImage::from_pixels(2, 2, 4, &px);
        assert_eq!(img.pixels(), px.to_vec());
        assert_eq!(img.pixel(0, 1), Some(0x00FF_FFFF));
        assert_eq!(img.pixel(2, 0), None);

        let img = NativeImage::from_pixels(3, 1, 1, &[1, 2, 0x1FF]);
        assert_eq!(img.pixels(), vec![1, 2, 0xFF]);
    }
}
