use crate::coords::PixelRect;
use crate::device::NativeImage;
use crate::paint::Rgba;
use crate::picture::Picture;
use crate::quantize::{ColorModel, ColorQuantizer, gray_level};

type EncodeRow = fn(&ColorQuantizer, &[Rgba], &mut Vec<u32>);

/// Native pixel conversion, selected once per painter.
///
/// The row encoder is specialized per color model so the inner loop does
/// not branch on the model.
#[derive(Debug, Copy, Clone)]
pub(crate) struct PixelCodec {
    bytes_per_pixel: usize,
    encode_row: EncodeRow,
}

impl PixelCodec {
    pub(crate) fn new(model: ColorModel, bytes_per_pixel: usize) -> Self {
        let encode_row: EncodeRow = match model {
            ColorModel::Packed => encode_packed,
            ColorModel::Indexed => encode_indexed,
            ColorModel::Gray { .. } => encode_gray,
        };
        Self { bytes_per_pixel, encode_row }
    }

    #[inline]
    pub(crate) fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    /// Encodes the opaque pixels of `rect`, which must lie inside `picture`.
    pub(crate) fn encode(
        &self,
        q: &ColorQuantizer,
        picture: &Picture,
        rect: PixelRect,
    ) -> NativeImage {
        let mut out = Vec::with_capacity(rect.area());
        for y in rect.y..rect.bottom() {
            let row = &picture.row(y as u32)[rect.x as usize..rect.right() as usize];
            (self.encode_row)(q, row, &mut out);
        }
        self.pack(rect, &out)
    }

    /// Packs already-encoded pixel values covering `rect`.
    pub(crate) fn pack(&self, rect: PixelRect, pixels: &[u32]) -> NativeImage {
        let (w, h) = (rect.width as u32, rect.height as u32);
        NativeImage::from_pixels(w, h, self.bytes_per_pixel, pixels)
    }

    /// Opaque straight-alpha picture of what `image` shows.
    pub(crate) fn decode(&self, q: &ColorQuantizer, image: &NativeImage) -> Picture {
        let mut pic = Picture::new(image.width, image.height);
        let pixels = image.pixels();
        let width = (image.width as usize).max(1);
        for (y, src) in pixels.chunks_exact(width).enumerate() {
            for (dst, &p) in pic.row_mut(y as u32).iter_mut().zip(src) {
                *dst = q.decode(p);
            }
        }
        pic
    }
}

fn encode_packed(q: &ColorQuantizer, src: &[Rgba], out: &mut Vec<u32>) {
    let f = q.forward();
    out.extend(src.iter().map(|c| f[0][c.r as usize] | f[1][c.g as usize] | f[2][c.b as usize]));
}

fn encode_indexed(q: &ColorQuantizer, src: &[Rgba], out: &mut Vec<u32>) {
    let f = q.forward();
    let device = q.device_table();
    out.extend(src.iter().map(|c| {
        device[(f[0][c.r as usize] + f[1][c.g as usize] + f[2][c.b as usize]) as usize]
    }));
}

fn encode_gray(q: &ColorQuantizer, src: &[Rgba], out: &mut Vec<u32>) {
    let f = q.forward();
    let device = q.device_table();
    let levels = device.len() as u32;
    out.extend(src.iter().map(|c| {
        let weighted = f[0][c.r as usize] + f[1][c.g as usize] + f[2][c.b as usize];
        device[gray_level(weighted, levels)]
    }));
}
