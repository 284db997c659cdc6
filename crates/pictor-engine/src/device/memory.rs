//! In-memory display and surface.
//!
//! A complete backend without a window system: colormaps with finite
//! capacity and optional allocation limits, and surfaces storing native
//! pixel values. Used by tests and the studio binary.

use std::collections::HashMap;

use crate::coords::{PixelRect, clip_transfer};
use crate::paint::Rgba;

use super::{
    AllocatedColor, CaptureError, ChannelField, ColormapId, Display, DisplayId, NativeImage,
    Surface, SurfaceDescriptor, Visual, VisualClass,
};

#[derive(Debug, Copy, Clone)]
struct Cell {
    pixel: u32,
    rgb: Rgba,
    refs: u32,
    reserved: bool,
}

#[derive(Debug)]
enum Colormap {
    /// Pixel values computed from channel fields; nothing to allocate.
    Computed([ChannelField; 3]),
    /// Finite cells; `layout` repeats the cell index in every channel field.
    Cells { cells: Vec<Option<Cell>>, layout: Option<[ChannelField; 3]>, limit: Option<usize> },
}

/// Display whose colormaps live in memory.
#[derive(Debug)]
pub struct MemoryDisplay {
    id: DisplayId,
    precision: u32,
    colormaps: HashMap<ColormapId, Colormap>,
}

impl MemoryDisplay {
    pub fn new(id: DisplayId) -> Self {
        Self { id, precision: 8, colormaps: HashMap::new() }
    }

    /// Realizes only the top `bits` bits of each requested channel.
    pub fn with_precision(mut self, bits: u32) -> Self {
        self.precision = bits.clamp(1, 8);
        self
    }

    /// Creates a colormap for `visual`. Cell-based colormaps start with
    /// black and white reserved in cells 0 and 1.
    pub fn add_colormap(&mut self, id: ColormapId, visual: &Visual) {
        let map = match (visual.class, visual.fields()) {
            (VisualClass::TrueColor, Some(fields)) => Colormap::Computed(fields),
            (class, fields) => {
                let layout = if class == VisualClass::DirectColor { fields } else { None };
                let pixel_of = |k: u32| match layout {
                    Some(f) => f.iter().fold(0, |p, f| p | f.place(k)),
                    None => k,
                };
                let mut cells = vec![None; visual.colormap_size as usize];
                for (k, rgb) in [Rgba::BLACK, Rgba::WHITE].into_iter().enumerate() {
                    if let Some(slot) = cells.get_mut(k) {
                        let pixel = pixel_of(k as u32);
                        *slot = Some(Cell { pixel, rgb, refs: 0, reserved: true });
                    }
                }
                Colormap::Cells { cells, layout, limit: None }
            }
        };
        self.colormaps.insert(id, map);
    }

    /// Makes allocation fail once `limit` cells are in use.
    pub fn limit_allocations(&mut self, colormap: ColormapId, limit: usize) {
        if let Some(Colormap::Cells { limit: l, .. }) = self.colormaps.get_mut(&colormap) {
            *l = Some(limit);
        }
    }

    /// Removes the reserved black and white cells.
    pub fn drop_black_white(&mut self, colormap: ColormapId) {
        if let Some(Colormap::Cells { cells, .. }) = self.colormaps.get_mut(&colormap) {
            for slot in cells.iter_mut() {
                if slot.is_some_and(|c| c.reserved) {
                    *slot = None;
                }
            }
        }
    }

    /// Number of allocated, non-reserved cells.
    pub fn allocated(&self, colormap: ColormapId) -> usize {
        match self.colormaps.get(&colormap) {
            Some(Colormap::Cells { cells, .. }) => {
                cells.iter().flatten().filter(|c| !c.reserved).count()
            }
            _ => 0,
        }
    }

    /// Color realized for a requested channel value.
    fn realize(&self, v: u8) -> u8 {
        let max = (1u32 << self.precision) - 1;
        let q = (v as u32 * max + 127) / 255;
        ((q * 255 + max / 2) / max) as u8
    }
}

impl Display for MemoryDisplay {
    fn id(&self) -> DisplayId {
        self.id
    }

    fn alloc_color(&mut self, colormap: ColormapId, rgb: Rgba) -> Option<AllocatedColor> {
        let rgb = Rgba::rgb(self.realize(rgb.r), self.realize(rgb.g), self.realize(rgb.b));
        match self.colormaps.get_mut(&colormap)? {
            Colormap::Computed(fields) => {
                let pixel = [rgb.r, rgb.g, rgb.b]
                    .iter()
                    .zip(fields.iter())
                    .fold(0, |p, (&v, f)| p | f.place((v as u32 * f.max() + 127) / 255));
                Some(AllocatedColor { pixel, rgb })
            }
            Colormap::Cells { cells, layout, limit } => {
                if let Some(cell) = cells.iter_mut().flatten().find(|c| c.rgb == rgb) {
                    if !cell.reserved {
                        cell.refs += 1;
                    }
                    return Some(AllocatedColor { pixel: cell.pixel, rgb });
                }

                let used = cells.iter().flatten().filter(|c| !c.reserved).count();
                if limit.is_some_and(|l| used >= l) {
                    return None;
                }
                let k = cells.iter().position(Option::is_none)?;
                let pixel = match layout {
                    Some(f) => f.iter().fold(0, |p, f| p | f.place(k as u32)),
                    None => k as u32,
                };
                cells[k] = Some(Cell { pixel, rgb, refs: 1, reserved: false });
                Some(AllocatedColor { pixel, rgb })
            }
        }
    }

    fn free_colors(&mut self, colormap: ColormapId, pixels: &[u32]) {
        let Some(Colormap::Cells { cells, .. }) = self.colormaps.get_mut(&colormap) else {
            return;
        };
        for &pixel in pixels {
            let Some(slot) = cells.iter_mut().find(|s| s.is_some_and(|c| c.pixel == pixel)) else {
                continue;
            };
            if let Some(cell) = slot.as_mut().filter(|c| !c.reserved) {
                cell.refs = cell.refs.saturating_sub(1);
                if cell.refs == 0 {
                    *slot = None;
                }
            }
        }
    }

    fn black_white(&self, colormap: ColormapId) -> Option<(u32, u32)> {
        match self.colormaps.get(&colormap)? {
            Colormap::Computed(fields) => {
                Some((0, fields.iter().fold(0, |p, f| p | f.place(f.max()))))
            }
            Colormap::Cells { cells, .. } => {
                let find = |rgb: Rgba| {
                    cells.iter().flatten().find(|c| c.reserved && c.rgb == rgb).map(|c| c.pixel)
                };
                Some((find(Rgba::BLACK)?, find(Rgba::WHITE)?))
            }
        }
    }
}

/// Surface storing one native pixel value per position.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    descriptor: SurfaceDescriptor,
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    obscured: Option<PixelRect>,
    writes: usize,
}

impl MemorySurface {
    /// Surface filled with pixel value 0.
    pub fn new(descriptor: SurfaceDescriptor, width: u32, height: u32) -> Self {
        Self {
            descriptor,
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            obscured: None,
            writes: 0,
        }
    }

    /// Marks a region whose contents cannot be read back.
    pub fn set_obscured(&mut self, rect: Option<PixelRect>) {
        self.obscured = rect;
    }

    pub fn fill(&mut self, pixel: u32) {
        self.pixels.fill(pixel);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Number of `write_native` transfers so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Surface for MemorySurface {
    fn descriptor(&self) -> &SurfaceDescriptor {
        &self.descriptor
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_native(&self, rect: PixelRect) -> Result<NativeImage, CaptureError> {
        let bpp = self.descriptor.bytes_per_pixel().ok_or(CaptureError::Unsupported)?;
        if rect.is_empty() || rect.intersect(self.bounds()) != Some(rect) {
            return Err(CaptureError::OutOfBounds(rect));
        }
        if let Some(hidden) = self.obscured.and_then(|o| o.intersect(rect)) {
            return Err(CaptureError::Obscured(hidden));
        }

        let stride = self.width as usize;
        let mut out = Vec::with_capacity(rect.area());
        for y in rect.y..rect.bottom() {
            let start = y as usize * stride + rect.x as usize;
            out.extend_from_slice(&self.pixels[start..start + rect.width as usize]);
        }
        Ok(NativeImage::from_pixels(rect.width as u32, rect.height as u32, bpp, &out))
    }

    fn write_native(&mut self, x: i32, y: i32, image: &NativeImage) {
        let src = PixelRect::from_size(image.width as i32, image.height as i32);
        let Some((s, dx, dy)) = clip_transfer(src, src, x, y, self.bounds()) else {
            return;
        };
        let stride = self.width as usize;
        for row in 0..s.height {
            for col in 0..s.width {
                let Some(p) = image.pixel((s.x + col) as u32, (s.y + row) as u32) else {
                    continue;
                };
                self.pixels[(dy + row) as usize * stride + (dx + col) as usize] = p;
            }
        }
        self.writes += 1;
    }
}
