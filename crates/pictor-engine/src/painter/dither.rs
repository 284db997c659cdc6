use crate::coords::PixelRect;
use crate::paint::Rgba;
use crate::picture::Picture;
use crate::quantize::ColorQuantizer;

/// Floyd–Steinberg error diffusion of `rect` (inside `picture`) onto the
/// quantizer's realized colors. Returns device pixels, row-major.
///
/// Errors are measured against what each chosen pixel actually shows, so
/// display rounding is diffused too. Weights are 7/16 right, 3/16 down-left,
/// 5/16 down, 1/16 down-right.
pub(crate) fn diffuse(q: &ColorQuantizer, picture: &Picture, rect: PixelRect) -> Vec<u32> {
    let width = rect.width as usize;
    // Error rows carry one pixel of padding on each side, scaled by 16.
    let mut cur = vec![[0i32; 3]; width + 2];
    let mut next = vec![[0i32; 3]; width + 2];
    let mut out = Vec::with_capacity(rect.area());

    for y in rect.y..rect.bottom() {
        let row = &picture.row(y as u32)[rect.x as usize..rect.right() as usize];
        for (i, c) in row.iter().enumerate() {
            let carried = cur[i + 1];
            let want: [i32; 3] = std::array::from_fn(|ch| {
                let v = [c.r, c.g, c.b][ch] as i32;
                (v + (carried[ch] + 8).div_euclid(16)).clamp(0, 255)
            });
            let pixel = q.encode(Rgba::rgb(want[0] as u8, want[1] as u8, want[2] as u8));
            let shown = q.decode(pixel);
            out.push(pixel);

            let shown = [shown.r as i32, shown.g as i32, shown.b as i32];
            let err: [i32; 3] = std::array::from_fn(|ch| want[ch] - shown[ch]);
            for (ch, e) in err.into_iter().enumerate() {
                cur[i + 2][ch] += e * 7;
                next[i][ch] += e * 3;
                next[i + 1][ch] += e * 5;
                next[i + 2][ch] += e;
            }
        }
        std::mem::swap(&mut cur, &mut next);
        next.fill([0; 3]);
    }
    out
}
