//! Separable box filters: blur for shadows, block averaging for
//! supersampled antialiasing.

use crate::paint::Rgba;

use super::Picture;

/// Sliding-window box blur of `radius` pixels in both directions.
///
/// Runs on premultiplied channels so transparent surroundings do not darken
/// edges; a straight-alpha picture is converted back afterwards. Pixels
/// beyond the edges count as transparent.
pub fn box_blur(pic: &mut Picture, radius: u32) {
    if radius == 0 || pic.is_empty() {
        return;
    }
    let straight = !pic.is_premultiplied();
    pic.premultiply();

    let (w, h, stride) = (pic.width() as usize, pic.height() as usize, pic.stride());
    let radius = radius as usize;
    let mut line = Vec::with_capacity(w.max(h));
    let mut out = vec![Rgba::TRANSPARENT; w.max(h)];

    let pixels = pic.pixels_mut();
    for y in 0..h {
        let row = &mut pixels[y * stride..y * stride + w];
        line.clear();
        // Zero-alpha pixels may still carry color; it must not bleed.
        line.extend(row.iter().map(|&c| if c.a == 0 { Rgba::TRANSPARENT } else { c }));
        blur_line(&line, &mut out[..w], radius);
        row.copy_from_slice(&out[..w]);
    }
    for x in 0..w {
        line.clear();
        line.extend((0..h).map(|y| pixels[y * stride + x]));
        blur_line(&line, &mut out[..h], radius);
        for (y, px) in out[..h].iter().enumerate() {
            pixels[y * stride + x] = *px;
        }
    }

    if straight {
        pic.unpremultiply();
    }
}

fn blur_line(src: &[Rgba], dst: &mut [Rgba], radius: usize) {
    let n = src.len();
    let div = (2 * radius + 1) as u32;
    let half = div / 2;
    let mut sum = [0u32; 4];

    let add = |sum: &mut [u32; 4], c: Rgba| {
        sum[0] += c.r as u32;
        sum[1] += c.g as u32;
        sum[2] += c.b as u32;
        sum[3] += c.a as u32;
    };
    let sub = |sum: &mut [u32; 4], c: Rgba| {
        sum[0] -= c.r as u32;
        sum[1] -= c.g as u32;
        sum[2] -= c.b as u32;
        sum[3] -= c.a as u32;
    };

    for &c in &src[..(radius + 1).min(n)] {
        add(&mut sum, c);
    }
    for i in 0..n {
        dst[i] = Rgba::new(
            ((sum[0] + half) / div) as u8,
            ((sum[1] + half) / div) as u8,
            ((sum[2] + half) / div) as u8,
            ((sum[3] + half) / div) as u8,
        );
        if i >= radius {
            sub(&mut sum, src[i - radius]);
        }
        if i + radius + 1 < n {
            add(&mut sum, src[i + radius + 1]);
        }
    }
}

/// Averages `factor × factor` blocks into one pixel (box filter).
///
/// The result is `ceil(w / factor) × ceil(h / factor)`; partial blocks at
/// the right and bottom edges are padded with transparency.
pub fn downsample(src: &Picture, factor: u32) -> Picture {
    if factor <= 1 {
        return src.clone();
    }
    let w = src.width().div_ceil(factor);
    let h = src.height().div_ceil(factor);
    let mut out = Picture::new(w, h);
    let straight = !src.is_premultiplied();
    let area = factor * factor;
    let half = area / 2;

    for oy in 0..h {
        let mut sums = vec![[0u32; 4]; w as usize];
        for sy in oy * factor..((oy + 1) * factor).min(src.height()) {
            for (sx, &px) in src.row(sy).iter().enumerate() {
                if px.a == 0 {
                    continue;
                }
                let c = if straight { crate::composite::premultiply(px) } else { px };
                let s = &mut sums[sx / factor as usize];
                s[0] += c.r as u32;
                s[1] += c.g as u32;
                s[2] += c.b as u32;
                s[3] += c.a as u32;
            }
        }
        let row = out.row_mut(oy);
        for (px, s) in row.iter_mut().zip(&sums) {
            *px = Rgba::new(
                ((s[0] + half) / area) as u8,
                ((s[1] + half) / area) as u8,
                ((s[2] + half) / area) as u8,
                ((s[3] + half) / area) as u8,
            );
        }
    }

    out.set_premultiplied_flag(true);
    if straight {
        out.unpremultiply();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_spreads_and_preserves_mass() {
        let mut p = Picture::new(9, 1);
        p.set_pixel(4, 0, Rgba::new(0, 0, 0, 255));
        box_blur(&mut p, 1);
        let alphas: Vec<u8> = p.row(0).iter().map(|c| c.a).collect();
        // Horizontal pass: 85 across three pixels; vertical pass over a
        // single row divides by three again.
        assert_eq!(alphas, vec![0, 0, 0, 28, 28, 28, 0, 0, 0]);
        assert!(!p.is_premultiplied());
    }

    #[test]
    fn blur_keeps_color_of_solid_shape() {
        let mut p = Picture::new(12, 12);
        for y in 4..8 {
            for x in 4..8 {
                p.set_pixel(x, y, Rgba::rgb(200, 40, 10));
            }
        }
        box_blur(&mut p, 2);
        let edge = p.pixel(3, 5).unwrap();
        assert!(edge.a > 0 && edge.a < 255);
        assert!((edge.r as i32 - 200).abs() <= 4, "{edge:?}");
    }

    #[test]
    fn zero_radius_is_noop() {
        let mut p = Picture::new(3, 3);
        p.set_pixel(1, 1, Rgba::WHITE);
        let before = p.clone();
        box_blur(&mut p, 0);
        assert_eq!(p, before);
    }

    #[test]
    fn downsample_averages_blocks() {
        let mut p = Picture::new(6, 3);
        for y in 0..3 {
            for x in 0..3 {
                p.set_pixel(x, y, Rgba::WHITE);
            }
        }
        p.set_pixel(3, 0, Rgba::WHITE);
        let d = downsample(&p, 3);
        assert_eq!((d.width(), d.height()), (2, 1));
        assert_eq!(d.pixel(0, 0), Some(Rgba::WHITE));
        let partial = d.pixel(1, 0).unwrap();
        assert_eq!(partial.a, 28);
        assert_eq!(partial.r, 255);
    }
}
