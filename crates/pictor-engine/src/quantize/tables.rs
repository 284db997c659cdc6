use crate::device::{AllocatedColor, ChannelField};
use crate::paint::Rgba;

use super::GammaTables;
use super::ramp::{RampSize, nearest_level};

/// Per-channel contribution of an 8-bit intensity to a device pixel (or
/// to a ramp index), red, green, blue.
pub type ForwardTables = [[u32; 256]; 3];

/// Luma weights scaled by 1024 (ITU-R BT.601).
pub(crate) const LUMA_WEIGHTS: [u32; 3] = [306, 601, 117];

/// Device pixel back to picture color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InverseTables {
    /// Each channel field value maps to an intensity.
    Channels { fields: [ChannelField; 3], values: Box<[[u8; 256]; 3]> },
    /// Realized color per device pixel value.
    Palette(Vec<Rgba>),
    /// Realized colors sorted by device pixel, for pixel values too large
    /// to index directly.
    Sparse(Vec<(u32, Rgba)>),
}

impl InverseTables {
    #[inline]
    pub fn decode(&self, pixel: u32) -> Rgba {
        match self {
            InverseTables::Channels { fields, values } => Rgba::rgb(
                values[0][fields[0].extract(pixel) as usize],
                values[1][fields[1].extract(pixel) as usize],
                values[2][fields[2].extract(pixel) as usize],
            ),
            InverseTables::Palette(colors) => {
                colors.get(pixel as usize).copied().unwrap_or(Rgba::BLACK)
            }
            InverseTables::Sparse(colors) => colors
                .binary_search_by_key(&pixel, |&(p, _)| p)
                .map_or(Rgba::BLACK, |i| colors[i].1),
        }
    }
}

/// `v` rescaled from 0..=255 to 0..=max.
#[inline]
fn to_field(v: u8, max: u32) -> u32 {
    (v as u32 * max + 127) / 255
}

/// Field value rescaled from 0..=max to 0..=255.
#[inline]
fn from_field(v: u32, max: u32) -> u8 {
    ((v.min(max) * 255 + max / 2) / max.max(1)) as u8
}

fn empty_forward() -> Box<ForwardTables> {
    Box::new([[0; 256]; 3])
}

/// Shift-and-mask tables for a true-color visual.
pub(crate) fn packed_forward(
    fields: &[ChannelField; 3],
    gamma: &GammaTables,
) -> Box<ForwardTables> {
    let mut t = empty_forward();
    for (table, f) in t.iter_mut().zip(fields) {
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = f.place(to_field(gamma.forward(i as u8), f.max()));
        }
    }
    t
}

/// Field values scaled back to intensities, before any allocated cells
/// override them.
pub(crate) fn packed_inverse(fields: &[ChannelField; 3], gamma: &GammaTables) -> InverseTables {
    let mut values = Box::new([[0u8; 256]; 3]);
    for (table, f) in values.iter_mut().zip(fields) {
        for (v, slot) in table.iter_mut().enumerate().take(f.max() as usize + 1) {
            *slot = gamma.inverse(from_field(v as u32, f.max()));
        }
    }
    InverseTables::Channels { fields: *fields, values }
}

/// Tables for a direct-color visual whose ramp is the gray diagonal
/// `cells`, one per level.
pub(crate) fn diagonal_tables(
    fields: &[ChannelField; 3],
    cells: &[AllocatedColor],
    gamma: &GammaTables,
) -> (Box<ForwardTables>, InverseTables) {
    let levels = cells.len() as u32;
    let mut forward = empty_forward();
    for (table, f) in forward.iter_mut().zip(fields) {
        let mask = f.place(f.max());
        for (i, slot) in table.iter_mut().enumerate() {
            let level = nearest_level(gamma.forward(i as u8), levels) as usize;
            *slot = cells.get(level).map_or(0, |cell| cell.pixel & mask);
        }
    }

    let mut inverse = packed_inverse(fields, gamma);
    if let InverseTables::Channels { values, .. } = &mut inverse {
        for cell in cells {
            let rgb = [cell.rgb.r, cell.rgb.g, cell.rgb.b];
            for ((table, f), v) in values.iter_mut().zip(fields).zip(rgb) {
                table[f.extract(cell.pixel) as usize] = gamma.inverse(v);
            }
        }
    }
    (forward, inverse)
}

/// Ramp-index contributions for a color cube.
pub(crate) fn cube_forward(ramp: RampSize, gamma: &GammaTables) -> Box<ForwardTables> {
    let strides = [ramp.green * ramp.blue, ramp.blue, 1];
    let levels = [ramp.red, ramp.green, ramp.blue];
    let mut t = empty_forward();
    for ((table, stride), n) in t.iter_mut().zip(strides).zip(levels) {
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = nearest_level(gamma.forward(i as u8), n) * stride;
        }
    }
    t
}

/// Luma-weighted intensities; the three entries for a color sum to
/// `luma * 1024`.
pub(crate) fn gray_forward(gamma: &GammaTables) -> Box<ForwardTables> {
    let mut t = empty_forward();
    for (table, w) in t.iter_mut().zip(LUMA_WEIGHTS) {
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = gamma.forward(i as u8) as u32 * w;
        }
    }
    t
}

/// Pixel values below this are indexed directly.
const DENSE_PALETTE: u32 = 1 << 16;

/// Realized colors indexed by device pixel.
pub(crate) fn palette_inverse(cells: &[AllocatedColor], gamma: &GammaTables) -> InverseTables {
    let shown = |c: Rgba| Rgba::rgb(gamma.inverse(c.r), gamma.inverse(c.g), gamma.inverse(c.b));
    let top = cells.iter().map(|c| c.pixel).max().unwrap_or(0);
    if top >= DENSE_PALETTE {
        let mut colors: Vec<(u32, Rgba)> =
            cells.iter().map(|c| (c.pixel, shown(c.rgb))).collect();
        colors.sort_by_key(|&(p, _)| p);
        colors.dedup_by_key(|&mut (p, _)| p);
        return InverseTables::Sparse(colors);
    }

    let mut colors = vec![Rgba::BLACK; top as usize + 1];
    for cell in cells {
        colors[cell.pixel as usize] = shown(cell.rgb);
    }
    InverseTables::Palette(colors)
}
