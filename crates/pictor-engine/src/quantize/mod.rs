//! Color quantization for limited-color devices.
//!
//! A [`ColorQuantizer`] is built once per painter. It picks a color ramp
//! for the visual, realizes it through the [`Display`] (shrinking the ramp
//! until allocation succeeds), and bakes gamma correction into forward
//! (picture → device pixel) and inverse (device pixel → picture) tables.

mod gamma;
mod ramp;
mod tables;

pub use gamma::GammaTables;
pub use ramp::RampSize;
pub use tables::{ForwardTables, InverseTables};

use crate::device::{
    AllocatedColor, ChannelField, ColormapId, Display, PainterError, SurfaceDescriptor,
    VisualClass,
};
use crate::paint::Rgba;

use ramp::level_value;
use tables::LUMA_WEIGHTS;

/// How forward-table entries combine into a device pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorModel {
    /// OR of the three channel entries.
    Packed,
    /// Sum of the entries indexes the device table.
    Indexed,
    /// Luma-weighted sum picks one of `levels` gray device pixels.
    Gray { levels: u32 },
}

/// Realized color ramp and its lookup tables.
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    colormap: ColormapId,
    model: ColorModel,
    ramp: RampSize,
    gamma: GammaTables,
    forward: Box<ForwardTables>,
    device_table: Vec<u32>,
    inverse: InverseTables,
    allocated: Vec<u32>,
}

impl ColorQuantizer {
    /// Builds the quantizer for `descriptor`.
    ///
    /// `ramp` overrides the standard ramp for the visual. Allocation failures
    /// shrink the ramp and retry; when even the smallest ramp fails the
    /// quantizer falls back to the display's black and white pixels.
    pub fn build(
        display: &mut dyn Display,
        descriptor: &SurfaceDescriptor,
        ramp: Option<RampSize>,
        force_monochrome: bool,
    ) -> Result<Self, PainterError> {
        let visual = &descriptor.visual;
        let unsupported = PainterError::UnsupportedVisual {
            class: visual.class,
            bits_per_pixel: descriptor.bits_per_pixel,
        };
        if descriptor.bytes_per_pixel().is_none() {
            return Err(unsupported);
        }

        let gamma = GammaTables::new(descriptor.gamma);
        let colormap = descriptor.colormap;
        if force_monochrome {
            return Self::black_white(display, colormap, gamma);
        }

        let limit = visual.colormap_size.max(2);
        match visual.class {
            VisualClass::TrueColor => {
                let fields = visual.fields().ok_or(unsupported)?;
                Ok(Self::packed(colormap, &fields, gamma))
            }
            VisualClass::DirectColor => {
                let fields = visual.fields().ok_or(unsupported)?;
                let levels = ramp.unwrap_or(RampSize::for_fields(&fields)).diagonal();
                let start = RampSize::uniform(levels.clamp(2, limit.min(256)));
                Self::direct(display, colormap, &fields, start, gamma)
            }
            VisualClass::Indexed { grayscale: false } => {
                match ramp.or(RampSize::for_depth(descriptor.depth)).and_then(|r| r.fit(limit)) {
                    Some(start) => Self::cube(display, colormap, start, gamma),
                    None => Self::black_white(display, colormap, gamma),
                }
            }
            VisualClass::Indexed { grayscale: true } => {
                match ramp.map(RampSize::diagonal).or(RampSize::gray_levels(descriptor.depth)) {
                    Some(levels) if levels > 2 => {
                        let start = RampSize::uniform(levels.min(limit).min(256));
                        Self::gray(display, colormap, start, gamma)
                    }
                    _ => Self::black_white(display, colormap, gamma),
                }
            }
            VisualClass::Monochrome => Self::black_white(display, colormap, gamma),
        }
    }

    fn packed(colormap: ColormapId, fields: &[ChannelField; 3], gamma: GammaTables) -> Self {
        let forward = tables::packed_forward(fields, &gamma);
        let inverse = tables::packed_inverse(fields, &gamma);
        let ramp = RampSize::for_fields(fields);
        log::debug!("true-color tables built ({ramp} levels)");
        Self {
            colormap,
            model: ColorModel::Packed,
            ramp,
            gamma,
            forward,
            device_table: Vec::new(),
            inverse,
            allocated: Vec::new(),
        }
    }

    fn direct(
        display: &mut dyn Display,
        colormap: ColormapId,
        fields: &[ChannelField; 3],
        start: RampSize,
        gamma: GammaTables,
    ) -> Result<Self, PainterError> {
        let Some((ramp, cells)) = realize(display, colormap, start, gray_ramp) else {
            return Self::black_white(display, colormap, gamma);
        };

        let (forward, inverse) = tables::diagonal_tables(fields, &cells, &gamma);
        log::debug!("direct-color ramp realized with {} levels", cells.len());
        Ok(Self {
            colormap,
            model: ColorModel::Packed,
            ramp,
            gamma,
            forward,
            device_table: Vec::new(),
            inverse,
            allocated: cells.iter().map(|c| c.pixel).collect(),
        })
    }

    fn cube(
        display: &mut dyn Display,
        colormap: ColormapId,
        start: RampSize,
        gamma: GammaTables,
    ) -> Result<Self, PainterError> {
        let cube = |ramp: RampSize| -> Vec<Rgba> {
            let mut colors = Vec::with_capacity(ramp.colors() as usize);
            for r in 0..ramp.red {
                for g in 0..ramp.green {
                    for b in 0..ramp.blue {
                        colors.push(Rgba::rgb(
                            level_value(r, ramp.red),
                            level_value(g, ramp.green),
                            level_value(b, ramp.blue),
                        ));
                    }
                }
            }
            colors
        };
        let Some((ramp, cells)) = realize(display, colormap, start, cube) else {
            return Self::black_white(display, colormap, gamma);
        };

        log::debug!("color cube {ramp} realized");
        Ok(Self {
            colormap,
            model: ColorModel::Indexed,
            ramp,
            forward: tables::cube_forward(ramp, &gamma),
            device_table: cells.iter().map(|c| c.pixel).collect(),
            inverse: tables::palette_inverse(&cells, &gamma),
            allocated: cells.iter().map(|c| c.pixel).collect(),
            gamma,
        })
    }

    fn gray(
        display: &mut dyn Display,
        colormap: ColormapId,
        start: RampSize,
        gamma: GammaTables,
    ) -> Result<Self, PainterError> {
        let Some((ramp, cells)) = realize(display, colormap, start, gray_ramp) else {
            return Self::black_white(display, colormap, gamma);
        };

        log::debug!("gray ramp realized with {} levels", cells.len());
        Ok(Self {
            colormap,
            model: ColorModel::Gray { levels: cells.len() as u32 },
            ramp,
            forward: tables::gray_forward(&gamma),
            device_table: cells.iter().map(|c| c.pixel).collect(),
            inverse: tables::palette_inverse(&cells, &gamma),
            allocated: cells.iter().map(|c| c.pixel).collect(),
            gamma,
        })
    }

    fn black_white(
        display: &mut dyn Display,
        colormap: ColormapId,
        gamma: GammaTables,
    ) -> Result<Self, PainterError> {
        let (black, white) = display.black_white(colormap).ok_or(PainterError::NoColors)?;
        let cells = [
            AllocatedColor { pixel: black, rgb: Rgba::BLACK },
            AllocatedColor { pixel: white, rgb: Rgba::WHITE },
        ];
        log::debug!("using black/white pixels {black}/{white}");
        Ok(Self {
            colormap,
            model: ColorModel::Gray { levels: 2 },
            ramp: RampSize::BLACK_WHITE,
            forward: tables::gray_forward(&gamma),
            device_table: vec![black, white],
            inverse: tables::palette_inverse(&cells, &gamma),
            allocated: Vec::new(),
            gamma,
        })
    }

    #[inline]
    pub fn model(&self) -> ColorModel {
        self.model
    }

    /// Realized ramp. True-color visuals report their channel resolution.
    #[inline]
    pub fn ramp(&self) -> RampSize {
        self.ramp
    }

    #[inline]
    pub fn gamma(&self) -> &GammaTables {
        &self.gamma
    }

    #[inline]
    pub fn forward(&self) -> &ForwardTables {
        &self.forward
    }

    /// Ramp index to device pixel (indexed and gray models).
    #[inline]
    pub fn device_table(&self) -> &[u32] {
        &self.device_table
    }

    #[inline]
    pub fn inverse(&self) -> &InverseTables {
        &self.inverse
    }

    /// Device pixels allocated from the display.
    #[inline]
    pub fn allocated(&self) -> &[u32] {
        &self.allocated
    }

    pub fn is_monochrome(&self) -> bool {
        self.model == ColorModel::Gray { levels: 2 }
    }

    /// Whether some picture colors cannot be shown exactly.
    pub fn is_quantized(&self) -> bool {
        self.ramp.red.min(self.ramp.green).min(self.ramp.blue) < 256
    }

    /// Device pixel for an opaque color.
    #[inline]
    pub fn encode(&self, c: Rgba) -> u32 {
        let f = &self.forward;
        let (r, g, b) = (f[0][c.r as usize], f[1][c.g as usize], f[2][c.b as usize]);
        match self.model {
            ColorModel::Packed => r | g | b,
            ColorModel::Indexed => self.device_table[(r + g + b) as usize],
            ColorModel::Gray { levels } => self.device_table[gray_level(r + g + b, levels)],
        }
    }

    /// Picture color a device pixel shows.
    #[inline]
    pub fn decode(&self, pixel: u32) -> Rgba {
        self.inverse.decode(pixel)
    }

    /// Returns the allocated colors to the display.
    pub fn release(&mut self, display: &mut dyn Display) {
        if self.allocated.is_empty() {
            return;
        }
        log::debug!("freeing {} colors", self.allocated.len());
        display.free_colors(self.colormap, &self.allocated);
        self.allocated.clear();
    }
}

/// Gray ramp index for a luma-weighted sum from the gray forward tables.
#[inline]
pub(crate) fn gray_level(weighted: u32, levels: u32) -> usize {
    let scale = 255 * LUMA_WEIGHTS.iter().sum::<u32>();
    ((weighted as u64 * (levels as u64 - 1) + scale as u64 / 2) / scale as u64) as usize
}

/// Evenly spaced grays along the ramp's diagonal.
fn gray_ramp(ramp: RampSize) -> Vec<Rgba> {
    let n = ramp.diagonal();
    (0..n).map(|l| level_value(l, n)).map(|v| Rgba::rgb(v, v, v)).collect()
}

/// Allocates `colors(ramp)`, shrinking the ramp after each failure.
///
/// A failed attempt frees whatever it allocated. `None` once the smallest
/// ramp fails too.
fn realize(
    display: &mut dyn Display,
    colormap: ColormapId,
    mut ramp: RampSize,
    colors: impl Fn(RampSize) -> Vec<Rgba>,
) -> Option<(RampSize, Vec<AllocatedColor>)> {
    loop {
        let wanted = colors(ramp);
        let mut cells = Vec::with_capacity(wanted.len());
        for &rgb in &wanted {
            match display.alloc_color(colormap, rgb) {
                Some(cell) => cells.push(cell),
                None => break,
            }
        }
        if cells.len() == wanted.len() {
            return Some((ramp, cells));
        }

        let pixels: Vec<u32> = cells.iter().map(|c| c.pixel).collect();
        display.free_colors(colormap, &pixels);
        match ramp.shrink() {
            Some(next) => {
                log::debug!("ramp {ramp} failed after {} colors; retrying {next}", cells.len());
                ramp = next;
            }
            None => {
                log::warn!("no color ramp could be allocated; falling back to black and white");
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DisplayId, MemoryDisplay, Visual, VisualId};

    const CMAP: ColormapId = ColormapId(7);

    fn setup(visual: Visual, depth: u8) -> (MemoryDisplay, SurfaceDescriptor) {
        let mut d = MemoryDisplay::new(DisplayId(1));
        d.add_colormap(CMAP, &visual);
        (d, SurfaceDescriptor::new(DisplayId(1), CMAP, visual, depth))
    }

    fn rgb888() -> Visual {
        Visual::true_color(VisualId(1), 0xFF0000, 0x00FF00, 0x0000FF)
    }

    // ── true color ────────────────────────────────────────────────────────

    #[test]
    fn true_color_allocates_nothing() {
        let (mut d, desc) = setup(rgb888(), 24);
        let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert_eq!(q.model(), ColorModel::Packed);
        assert!(!q.is_quantized());
        assert!(q.allocated().is_empty());
        assert_eq!(q.encode(Rgba::rgb(1, 2, 3)), 0x010203);
        assert_eq!(q.decode(0xABCDEF), Rgba::rgb(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn rgb565_is_quantized() {
        let v = Visual::true_color(VisualId(1), 0xF800, 0x07E0, 0x001F);
        let (mut d, desc) = setup(v, 16);
        let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert!(q.is_quantized());
        assert_eq!(q.ramp(), RampSize::new(32, 64, 32));
        assert_eq!(q.encode(Rgba::WHITE), 0xFFFF);
        assert_eq!(q.decode(q.encode(Rgba::rgb(255, 0, 0))), Rgba::rgb(255, 0, 0));
    }

    #[test]
    fn gamma_is_baked_into_tables() {
        let (mut d, desc) = setup(rgb888(), 24);
        let q = ColorQuantizer::build(&mut d, &desc.with_gamma(2.0), None, false).unwrap();
        let dark = q.encode(Rgba::rgb(128, 0, 0)) >> 16;
        assert_eq!(dark, 64);
        assert_eq!(q.decode(dark << 16).r.abs_diff(128), 0);
    }

    // ── indexed ───────────────────────────────────────────────────────────

    #[test]
    fn indexed_depth8_realizes_standard_cube() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(2), 256, false), 8);
        let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert_eq!(q.model(), ColorModel::Indexed);
        assert_eq!(q.ramp(), RampSize::new(5, 6, 5));
        assert_eq!(q.decode(q.encode(Rgba::WHITE)), Rgba::WHITE);
        assert_eq!(q.decode(q.encode(Rgba::rgb(255, 0, 255))), Rgba::rgb(255, 0, 255));
        // Black and white share the reserved cells.
        assert_eq!(d.allocated(CMAP), 148);
        assert_eq!(q.allocated().len(), 150);
    }

    #[test]
    fn inverse_palette_reports_display_rounding() {
        let mut d = MemoryDisplay::new(DisplayId(1)).with_precision(4);
        let v = Visual::indexed(VisualId(2), 256, false);
        d.add_colormap(CMAP, &v);
        let desc = SurfaceDescriptor::new(DisplayId(1), CMAP, v, 8);
        let q = ColorQuantizer::build(&mut d, &desc, Some(RampSize::new(3, 3, 3)), false).unwrap();
        // Level 1 of 3 asks for 128 and the display shows 136.
        let mid = q.decode(q.encode(Rgba::rgb(128, 128, 128)));
        assert_eq!(mid, Rgba::rgb(136, 136, 136));
    }

    #[test]
    fn release_returns_colors() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(2), 64, false), 6);
        let mut q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert!(d.allocated(CMAP) > 0);
        q.release(&mut d);
        assert_eq!(d.allocated(CMAP), 0);
        assert!(q.allocated().is_empty());
    }

    // ── fallback ──────────────────────────────────────────────────────────

    #[test]
    fn allocation_limit_shrinks_ramp() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(2), 256, false), 8);
        d.limit_allocations(CMAP, 20);
        let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert!(q.ramp().colors() < 150);
        assert!(d.allocated(CMAP) <= 20);
        assert_eq!(q.model(), ColorModel::Indexed);
    }

    #[test]
    fn fallback_terminates_for_every_class() {
        let visuals = [
            (Visual::indexed(VisualId(2), 256, false), 8),
            (Visual::indexed(VisualId(3), 256, true), 8),
            (Visual::direct_color(VisualId(4), 0xFF0000, 0xFF00, 0xFF, 256), 24),
            (Visual::monochrome(VisualId(5)), 1),
            (rgb888(), 24),
        ];
        for (v, depth) in visuals {
            for limit in [0, 1, 3, 7, 30] {
                let (mut d, desc) = setup(v, depth);
                d.limit_allocations(CMAP, limit);
                let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
                assert!(d.allocated(CMAP) <= limit, "{v:?} limit {limit}");
                let white = q.decode(q.encode(Rgba::WHITE));
                assert_eq!(white, Rgba::WHITE, "{v:?} limit {limit}");
            }
        }
    }

    #[test]
    fn no_black_white_is_an_error() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(2), 256, false), 8);
        d.limit_allocations(CMAP, 0);
        d.drop_black_white(CMAP);
        let err = ColorQuantizer::build(&mut d, &desc, None, false).unwrap_err();
        assert_eq!(err, PainterError::NoColors);
    }

    // ── gray / monochrome ─────────────────────────────────────────────────

    #[test]
    fn grayscale_visual_uses_luma() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(3), 16, true), 4);
        let q = ColorQuantizer::build(&mut d, &desc, None, false).unwrap();
        assert_eq!(q.model(), ColorModel::Gray { levels: 16 });
        let g = q.decode(q.encode(Rgba::rgb(0, 255, 0)));
        assert_eq!((g.r, g.g, g.b), (153, 153, 153));
    }

    #[test]
    fn monochrome_thresholds_at_mid_gray() {
        let (mut d, desc) = setup(Visual::indexed(VisualId(2), 256, false), 8);
        let q = ColorQuantizer::build(&mut d, &desc, None, true).unwrap();
        assert!(q.is_monochrome());
        assert_eq!(d.allocated(CMAP), 0);
        assert_eq!(q.encode(Rgba::rgb(200, 200, 200)), 1);
        assert_eq!(q.encode(Rgba::rgb(40, 40, 40)), 0);
        assert_eq!(q.decode(1), Rgba::WHITE);
    }

    #[test]
    fn unsupported_storage_is_rejected() {
        let (mut d, desc) = setup(rgb888(), 24);
        let desc = desc.with_bits_per_pixel(48);
        assert!(matches!(
            ColorQuantizer::build(&mut d, &desc, None, false),
            Err(PainterError::UnsupportedVisual { .. })
        ));
    }
}
