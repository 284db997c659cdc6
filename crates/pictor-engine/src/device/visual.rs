/// Display connection identity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DisplayId(pub u32);

/// Colormap identity, scoped to a display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ColormapId(pub u32);

/// Visual identity, scoped to a display.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VisualId(pub u32);

/// Device color model.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VisualClass {
    /// Pixel values are computed from the channel masks.
    TrueColor,
    /// Channel fields index per-channel colormap cells.
    DirectColor,
    /// Pixel values index a shared colormap.
    Indexed { grayscale: bool },
    /// Black and white only.
    Monochrome,
}

/// Position and width of one color channel inside a device pixel.
///
/// Channels wider than 8 bits keep only their top 8 bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelField {
    pub shift: u32,
    pub bits: u32,
}

impl ChannelField {
    /// Derives the field from a channel mask; `None` for an empty mask.
    pub fn from_mask(mask: u32) -> Option<Self> {
        if mask == 0 {
            return None;
        }
        let bits = mask.count_ones();
        let shift = mask.trailing_zeros();
        let kept = bits.min(8);
        Some(Self { shift: shift + (bits - kept), bits: kept })
    }

    /// Largest value the field can hold.
    #[inline]
    pub fn max(self) -> u32 {
        (1 << self.bits) - 1
    }

    #[inline]
    pub fn extract(self, pixel: u32) -> u32 {
        (pixel >> self.shift) & self.max()
    }

    #[inline]
    pub fn place(self, value: u32) -> u32 {
        (value & self.max()) << self.shift
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Visual {
    pub id: VisualId,
    pub class: VisualClass,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    /// Number of cells in colormaps of this visual.
    pub colormap_size: u32,
}

impl Visual {
    /// Packed true-color visual with the given channel masks.
    pub const fn true_color(id: VisualId, red_mask: u32, green_mask: u32, blue_mask: u32) -> Self {
        let class = VisualClass::TrueColor;
        Self { id, class, red_mask, green_mask, blue_mask, colormap_size: 0 }
    }

    pub const fn direct_color(
        id: VisualId,
        red_mask: u32,
        green_mask: u32,
        blue_mask: u32,
        colormap_size: u32,
    ) -> Self {
        Self { id, class: VisualClass::DirectColor, red_mask, green_mask, blue_mask, colormap_size }
    }

    pub const fn indexed(id: VisualId, colormap_size: u32, grayscale: bool) -> Self {
        Self {
            id,
            class: VisualClass::Indexed { grayscale },
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            colormap_size,
        }
    }

    pub const fn monochrome(id: VisualId) -> Self {
        Self {
            id,
            class: VisualClass::Monochrome,
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            colormap_size: 2,
        }
    }

    /// Red, green and blue fields; `None` unless every mask is set.
    pub fn fields(&self) -> Option<[ChannelField; 3]> {
        Some([
            ChannelField::from_mask(self.red_mask)?,
            ChannelField::from_mask(self.green_mask)?,
            ChannelField::from_mask(self.blue_mask)?,
        ])
    }
}

/// Identity and pixel format of a drawable surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceDescriptor {
    pub display: DisplayId,
    pub colormap: ColormapId,
    pub visual: Visual,
    /// Significant bits per pixel.
    pub depth: u8,
    /// Storage bits per pixel.
    pub bits_per_pixel: u8,
    /// Monitor gamma; 1.0 disables correction.
    pub gamma: f32,
}

impl SurfaceDescriptor {
    /// Descriptor with the usual storage size for `depth` and no gamma
    /// correction.
    pub fn new(display: DisplayId, colormap: ColormapId, visual: Visual, depth: u8) -> Self {
        let bits_per_pixel = match depth {
            0..=8 => 8,
            9..=16 => 16,
            _ => 32,
        };
        Self { display, colormap, visual, depth, bits_per_pixel, gamma: 1.0 }
    }

    #[inline]
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    #[inline]
    pub fn with_bits_per_pixel(mut self, bits_per_pixel: u8) -> Self {
        self.bits_per_pixel = bits_per_pixel;
        self
    }

    /// Whether pixels encoded for `self` mean the same colors on `other`.
    /// Compares everything a painter depends on.
    pub fn same_format(&self, other: &SurfaceDescriptor) -> bool {
        self.display == other.display
            && self.colormap == other.colormap
            && self.visual.id == other.visual.id
            && self.depth == other.depth
            && self.bits_per_pixel == other.bits_per_pixel
            && self.gamma.to_bits() == other.gamma.to_bits()
    }

    /// Bytes per stored pixel; `None` for storage formats without a codec.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self.bits_per_pixel {
            32 => Some(4),
            24 => Some(3),
            16 => Some(2),
            1..=8 => Some(1),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── ChannelField ──────────────────────────────────────────────────────

    #[test]
    fn field_from_rgb565_masks() {
        let r = ChannelField::from_mask(0xF800).unwrap();
        let g = ChannelField::from_mask(0x07E0).unwrap();
        let b = ChannelField::from_mask(0x001F).unwrap();
        assert_eq!((r.shift, r.bits), (11, 5));
        assert_eq!((g.shift, g.bits), (5, 6));
        assert_eq!((b.shift, b.bits), (0, 5));
        assert_eq!(g.extract(0x07E0), 63);
        assert_eq!(r.place(31), 0xF800);
    }

    #[test]
    fn wide_field_keeps_top_bits() {
        let f = ChannelField::from_mask(0x3FF0_0000).unwrap();
        assert_eq!((f.shift, f.bits), (22, 8));
        assert!(ChannelField::from_mask(0).is_none());
    }

    // ── SurfaceDescriptor ─────────────────────────────────────────────────

    #[test]
    fn storage_size_follows_depth() {
        let v = Visual::monochrome(VisualId(1));
        let d = |depth| SurfaceDescriptor::new(DisplayId(0), ColormapId(0), v, depth);
        assert_eq!(d(1).bytes_per_pixel(), Some(1));
        assert_eq!(d(16).bytes_per_pixel(), Some(2));
        assert_eq!(d(24).bytes_per_pixel(), Some(4));
        assert_eq!(d(24).with_bits_per_pixel(24).bytes_per_pixel(), Some(3));
        assert_eq!(d(24).with_bits_per_pixel(48).bytes_per_pixel(), None);
    }
}
