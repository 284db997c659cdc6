use crate::coords::{PixelRect, clip_transfer};
use crate::paint::Rgba;
use crate::picture::Picture;

use super::pixel::{blend_over, blend_over_premul, premultiply, unpremultiply};

/// Blends `src_rect` of `src` over `dst` at `(dx, dy)`.
///
/// Both sides are clipped symmetrically. Source pixels are converted to the
/// destination's alpha representation first, so straight and premultiplied
/// pictures can be mixed. Returns the destination rectangle that was
/// touched, or `None` when everything was clipped away.
pub fn blend_picture(
    dst: &mut Picture,
    src: &Picture,
    src_rect: PixelRect,
    dx: i32,
    dy: i32,
) -> Option<PixelRect> {
    let dst_premul = dst.is_premultiplied();
    let convert = converter(src.is_premultiplied(), dst_premul);
    transfer(dst, src, src_rect, dx, dy, |d, s| {
        let s = convert(s);
        if dst_premul { blend_over_premul(d, s) } else { blend_over(d, s) }
    })
}

/// Copies `src_rect` of `src` into `dst` at `(dx, dy)`, replacing pixels.
///
/// Clipping and alpha conversion as for [`blend_picture`].
pub fn copy_picture(
    dst: &mut Picture,
    src: &Picture,
    src_rect: PixelRect,
    dx: i32,
    dy: i32,
) -> Option<PixelRect> {
    let convert = converter(src.is_premultiplied(), dst.is_premultiplied());
    transfer(dst, src, src_rect, dx, dy, |_, s| convert(s))
}

fn converter(src_premul: bool, dst_premul: bool) -> fn(Rgba) -> Rgba {
    match (src_premul, dst_premul) {
        (false, true) => premultiply,
        (true, false) => unpremultiply,
        _ => |c| c,
    }
}

fn transfer(
    dst: &mut Picture,
    src: &Picture,
    src_rect: PixelRect,
    dx: i32,
    dy: i32,
    op: impl Fn(Rgba, Rgba) -> Rgba,
) -> Option<PixelRect> {
    let (s, dx, dy) = clip_transfer(src_rect, src.bounds(), dx, dy, dst.bounds())?;
    let (sx, dxu, w) = (s.x as usize, dx as usize, s.width as usize);

    for row in 0..s.height {
        let src_row = &src.row((s.y + row) as u32)[sx..sx + w];
        let dst_row = &mut dst.row_mut((dy + row) as u32)[dxu..dxu + w];
        for (d, &p) in dst_row.iter_mut().zip(src_row) {
            *d = op(*d, p);
        }
    }

    Some(PixelRect::new(dx, dy, s.width, s.height))
}
