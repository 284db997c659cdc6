use crate::paint::Rgba;

/// `round(a * b / 255)` for 8-bit operands.
#[inline]
pub fn mul_div_255(a: u32, b: u32) -> u32 {
    (a * b + 128) / 255
}

/// Porter-Duff "over" on straight-alpha pixels.
///
/// An opaque `src` is returned unchanged and a fully transparent `src`
/// leaves `dst` unchanged; drawing code relies on both identities.
#[inline]
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    if src.a == 255 {
        return src;
    }
    if src.a == 0 {
        return dst;
    }

    let sa = src.a as u32;
    let dw = mul_div_255(dst.a as u32, 255 - sa);
    let oa = sa + dw;
    if oa == 0 {
        return Rgba::TRANSPARENT;
    }

    let half = oa / 2;
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * dw + half) / oa).min(255) as u8;
    Rgba::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), oa.min(255) as u8)
}

/// "Over" for premultiplied pixels: `src + dst * (1 - src.a)`.
#[inline]
pub fn blend_over_premul(dst: Rgba, src: Rgba) -> Rgba {
    if src.a == 255 {
        return src;
    }
    if src.a == 0 && src.r == 0 && src.g == 0 && src.b == 0 {
        return dst;
    }

    let inv = 255 - src.a as u32;
    let mix = |s: u8, d: u8| (s as u32 + mul_div_255(d as u32, inv)).min(255) as u8;
    Rgba::new(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), mix(src.a, dst.a))
}

/// Scales RGB by `a / 255`. Opaque and fully transparent colors pass
/// through unchanged.
#[inline]
pub fn premultiply(c: Rgba) -> Rgba {
    if c.a == 0 || c.a == 255 {
        return c;
    }
    let a = c.a as u32;
    Rgba::new(
        mul_div_255(c.r as u32, a) as u8,
        mul_div_255(c.g as u32, a) as u8,
        mul_div_255(c.b as u32, a) as u8,
        c.a,
    )
}

/// Inverse of [`premultiply`]: divides RGB by `a / 255`, saturating.
#[inline]
pub fn unpremultiply(c: Rgba) -> Rgba {
    if c.a == 0 || c.a == 255 {
        return c;
    }
    let a = c.a as u32;
    let div = |v: u8| ((v as u32 * 255 + a / 2) / a).min(255) as u8;
    Rgba::new(div(c.r), div(c.g), div(c.b), c.a)
}

/// Scales the effective alpha by `weight / 255`; expresses antialiasing
/// coverage as a blend weight.
#[inline]
pub fn fade_by_weight(c: Rgba, weight: u8) -> Rgba {
    match weight {
        255 => c,
        0 => c.with_alpha(0),
        w => c.with_alpha(mul_div_255(c.a as u32, w as u32) as u8),
    }
}
