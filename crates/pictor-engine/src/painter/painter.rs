use crate::composite::blend_picture;
use crate::coords::{PixelRect, clip_transfer};
use crate::device::{
    Display, NativeImage, PaintError, PainterError, Surface, SurfaceDescriptor,
};
use crate::picture::Picture;
use crate::quantize::{ColorQuantizer, RampSize};

use super::codec::PixelCodec;
use super::dither::diffuse;

/// Painter construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PainterInit {
    /// Overrides the standard ramp for indexed and direct-color visuals.
    pub ramp: Option<RampSize>,
    /// Paint in black and white regardless of the visual.
    pub force_monochrome: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PainterState {
    Ready,
    Destroyed,
}

/// Converts pictures to the native pixels of one surface format.
#[derive(Debug)]
pub struct Painter {
    descriptor: SurfaceDescriptor,
    quantizer: ColorQuantizer,
    codec: PixelCodec,
    state: PainterState,
}

impl Painter {
    pub fn new(
        display: &mut dyn Display,
        descriptor: &SurfaceDescriptor,
        init: &PainterInit,
    ) -> Result<Self, PainterError> {
        let quantizer =
            ColorQuantizer::build(display, descriptor, init.ramp, init.force_monochrome)?;
        let bytes_per_pixel =
            descriptor.bytes_per_pixel().ok_or(PainterError::UnsupportedVisual {
                class: descriptor.visual.class,
                bits_per_pixel: descriptor.bits_per_pixel,
            })?;
        let codec = PixelCodec::new(quantizer.model(), bytes_per_pixel);
        log::debug!(
            "painter ready: {:?} depth {} ({} ramp)",
            descriptor.visual.class,
            descriptor.depth,
            quantizer.ramp()
        );
        Ok(Self { descriptor: *descriptor, quantizer, codec, state: PainterState::Ready })
    }

    #[inline]
    pub fn descriptor(&self) -> &SurfaceDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn quantizer(&self) -> &ColorQuantizer {
        &self.quantizer
    }

    #[inline]
    pub fn state(&self) -> PainterState {
        self.state
    }

    /// Paints `src` of `picture` onto `surface` with its top-left corner at
    /// `(dx, dy)`.
    ///
    /// Opaque regions are encoded directly. Anything translucent is blended
    /// over the captured destination first. Fully transparent or fully
    /// clipped requests succeed without touching the surface. The surface
    /// must have the format this painter was created for.
    pub fn paint(
        &self,
        surface: &mut dyn Surface,
        picture: &Picture,
        src: PixelRect,
        dx: i32,
        dy: i32,
        dither: bool,
    ) -> Result<(), PaintError> {
        let target = surface.descriptor();
        if target.bytes_per_pixel() != Some(self.codec.bytes_per_pixel()) {
            return Err(PaintError::Unsupported { bits_per_pixel: target.bits_per_pixel });
        }
        if !target.same_format(&self.descriptor) {
            log::warn!(
                "refusing to paint a {:?} surface with a {:?} painter",
                target.visual.class,
                self.descriptor.visual.class
            );
            return Err(PaintError::FormatMismatch);
        }

        let Some((s, dx, dy)) = clip_transfer(src, picture.bounds(), dx, dy, surface.bounds())
        else {
            log::trace!("paint of {src:?} clipped away");
            return Ok(());
        };
        if picture.is_transparent_in(s) {
            return Ok(());
        }

        let dest = PixelRect::new(dx, dy, s.width, s.height);
        let image = if picture.is_opaque_in(s) {
            self.encode(picture, s, dither)
        } else {
            let mut backdrop = self.snapshot(surface, dest)?;
            blend_picture(&mut backdrop, picture, s, 0, 0);
            self.encode(&backdrop, backdrop.bounds(), dither)
        };
        surface.write_native(dx, dy, &image);
        Ok(())
    }

    fn encode(&self, picture: &Picture, rect: PixelRect, dither: bool) -> NativeImage {
        if dither && self.quantizer.is_quantized() {
            let pixels = diffuse(&self.quantizer, picture, rect);
            self.codec.pack(rect, &pixels)
        } else {
            self.codec.encode(&self.quantizer, picture, rect)
        }
    }

    /// Captures `region` of `surface` as an opaque picture of the colors it
    /// shows.
    pub fn snapshot(
        &self,
        surface: &dyn Surface,
        region: PixelRect,
    ) -> Result<Picture, PaintError> {
        let image = surface.read_native(region).inspect_err(|e| {
            log::warn!("capture of {region:?} failed: {e}");
        })?;
        Ok(self.codec.decode(&self.quantizer, &image))
    }

    /// Frees the device colors held by this painter.
    pub(crate) fn destroy(&mut self, display: &mut dyn Display) {
        if self.state == PainterState::Destroyed {
            return;
        }
        self.quantizer.release(display);
        self.state = PainterState::Destroyed;
        log::debug!("painter for {:?} destroyed", self.descriptor.visual.class);
    }
}
