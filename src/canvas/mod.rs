//! 2D drawing targets the magnifier renders into and reads back from.

mod raster;
mod text;

pub use raster::RasterCanvas;
pub use text::{text_size, GLYPH_ADVANCE, GLYPH_HEIGHT};

use crate::geometry::{PixelPoint, PixelRect, PixelSize};
use image::{Rgba, RgbaImage};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba<u8>,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Rgba<u8>, width: f64) -> Self {
        Self { color, width }
    }
}

/// A raster surface supporting the primitives the magnifier tile is built
/// from, plus single-pixel read-back.
///
/// Coordinates address pixels directly: `(x, y)` is the pixel in column `x`,
/// row `y`. Drawing outside the target is clipped.
pub trait DrawingTarget {
    fn size(&self) -> PixelSize;

    /// Resets every pixel to fully transparent.
    fn clear(&mut self);

    /// When disabled, scaled image draws use nearest-neighbour sampling.
    fn set_smoothing(&mut self, enabled: bool);

    /// Draws `src` of `source` scaled into `dst`. Parts of `src` lying outside
    /// `source` are not drawn.
    fn draw_image_region(&mut self, source: &RgbaImage, src: PixelRect, dst: PixelRect);

    fn stroke_line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke);

    /// Outlines the rectangle edges at columns `x` and `x + width` and rows `y`
    /// and `y + height`.
    fn stroke_rect(&mut self, rect: PixelRect, stroke: Stroke);

    fn fill_rounded_rect(&mut self, rect: PixelRect, radius: f64, color: Rgba<u8>);

    /// Strokes a circle of `radius` centred on `center`; the band spans
    /// `radius ± stroke.width / 2`.
    fn stroke_circle(&mut self, center: PixelPoint, radius: f64, stroke: Stroke);

    /// Draws `text` with its top-left glyph corner at `origin`.
    fn fill_text(&mut self, text: &str, origin: PixelPoint, color: Rgba<u8>);

    /// Reads back one rendered pixel. `None` when the target has nothing to
    /// read at that position.
    fn pixel_color(&self, x: u32, y: u32) -> Option<[u8; 4]>;
}

/// Source-over compositing of `src` onto `dst`.
pub(crate) fn blend_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }
    let a = f64::from(src[3]) / 255.0;
    let inv = 1.0 - a;
    let out_a = a + f64::from(dst[3]) / 255.0 * inv;
    if out_a <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |index: usize| {
        let dst_a = f64::from(dst[3]) / 255.0;
        let value =
            (f64::from(src[index]) * a + f64::from(dst[index]) * dst_a * inv) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_pixel_keeps_opaque_source_and_ignores_transparent_source() {
        let dst = Rgba([10, 20, 30, 255]);
        assert_eq!(blend_pixel(dst, Rgba([200, 100, 50, 255])), Rgba([200, 100, 50, 255]));
        assert_eq!(blend_pixel(dst, TRANSPARENT), dst);
    }

    #[test]
    fn blend_pixel_onto_transparent_keeps_source_color() {
        let blended = blend_pixel(TRANSPARENT, Rgba([200, 100, 50, 128]));
        assert_eq!(blended, Rgba([200, 100, 50, 128]));
    }

    #[test]
    fn blend_pixel_mixes_half_alpha_over_opaque() {
        let blended = blend_pixel(Rgba([0, 0, 0, 255]), Rgba([255, 255, 255, 128]));
        assert_eq!(blended[3], 255);
        assert!((127..=129).contains(&blended[0]));
    }
}
