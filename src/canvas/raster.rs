use image::{imageops, Rgba, RgbaImage};

use super::{blend_pixel, text, DrawingTarget, Stroke, TRANSPARENT};
use crate::geometry::{PixelPoint, PixelRect, PixelSize};

/// CPU drawing target backed by an `RgbaImage`.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    pixels: RgbaImage,
    smoothing: bool,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            smoothing: true,
        }
    }

    pub fn from_image(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            smoothing: true,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    fn blend_at(&mut self, x: i64, y: i64, color: Rgba<u8>) {
        if x < 0 || y < 0 || x >= i64::from(self.pixels.width()) || y >= i64::from(self.pixels.height())
        {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let dst = *self.pixels.get_pixel(x, y);
        self.pixels.put_pixel(x, y, blend_pixel(dst, color));
    }

    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.blend_at(x, y, color);
            }
        }
    }

    fn draw_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
        let r2 = radius * radius;
        let min_x = (cx - radius).floor() as i64;
        let max_x = (cx + radius).ceil() as i64;
        let min_y = (cy - radius).floor() as i64;
        let max_y = (cy + radius).ceil() as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend_at(x, y, color);
                }
            }
        }
    }

    fn draw_nearest(&mut self, source: &RgbaImage, src: PixelRect, dst: PixelRect) {
        let Some(visible) = dst.clamp_to(self.size()) else {
            return;
        };
        let scale_x = f64::from(src.width) / f64::from(dst.width);
        let scale_y = f64::from(src.height) / f64::from(dst.height);
        let source_width = i64::from(source.width());
        let source_height = i64::from(source.height());

        for ty in visible.y..(visible.y + visible.height as i32) {
            let offset_y = f64::from(ty - dst.y) + 0.5;
            let sy = i64::from(src.y) + (offset_y * scale_y).floor() as i64;
            if sy < 0 || sy >= source_height {
                continue;
            }
            for tx in visible.x..(visible.x + visible.width as i32) {
                let offset_x = f64::from(tx - dst.x) + 0.5;
                let sx = i64::from(src.x) + (offset_x * scale_x).floor() as i64;
                if sx < 0 || sx >= source_width {
                    continue;
                }
                let color = *source.get_pixel(sx as u32, sy as u32);
                self.blend_at(i64::from(tx), i64::from(ty), color);
            }
        }
    }

    fn draw_smoothed(&mut self, source: &RgbaImage, src: PixelRect, dst: PixelRect) {
        let source_size = PixelSize::new(source.width(), source.height());
        let Some(readable) = src.clamp_to(source_size) else {
            return;
        };
        let scale_x = f64::from(dst.width) / f64::from(src.width);
        let scale_y = f64::from(dst.height) / f64::from(src.height);
        let dst_x = f64::from(dst.x) + f64::from(readable.x - src.x) * scale_x;
        let dst_y = f64::from(dst.y) + f64::from(readable.y - src.y) * scale_y;
        let dst_width = (f64::from(readable.width) * scale_x).round().max(1.0) as u32;
        let dst_height = (f64::from(readable.height) * scale_y).round().max(1.0) as u32;

        let region = imageops::crop_imm(
            source,
            readable.x as u32,
            readable.y as u32,
            readable.width,
            readable.height,
        )
        .to_image();
        let scaled = if (dst_width, dst_height) == region.dimensions() {
            region
        } else {
            imageops::resize(&region, dst_width, dst_height, imageops::FilterType::Triangle)
        };

        let origin_x = dst_x.round() as i64;
        let origin_y = dst_y.round() as i64;
        for (x, y, color) in scaled.enumerate_pixels() {
            self.blend_at(origin_x + i64::from(x), origin_y + i64::from(y), *color);
        }
    }
}

impl DrawingTarget for RasterCanvas {
    fn size(&self) -> PixelSize {
        PixelSize::new(self.pixels.width(), self.pixels.height())
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    fn set_smoothing(&mut self, enabled: bool) {
        self.smoothing = enabled;
    }

    fn draw_image_region(&mut self, source: &RgbaImage, src: PixelRect, dst: PixelRect) {
        if src.width == 0 || src.height == 0 || dst.width == 0 || dst.height == 0 {
            return;
        }
        if self.smoothing {
            self.draw_smoothed(source, src, dst);
        } else {
            self.draw_nearest(source, src, dst);
        }
    }

    fn stroke_line(&mut self, from: PixelPoint, to: PixelPoint, stroke: Stroke) {
        let thickness = stroke.width.round().max(1.0) as i64;
        let before = (thickness - 1) / 2;
        let after = thickness - 1 - before;
        let (x0, y0) = (i64::from(from.x), i64::from(from.y));
        let (x1, y1) = (i64::from(to.x), i64::from(to.y));

        if y0 == y1 {
            self.fill_span(x0, y0 - before, x1, y0 + after, stroke.color);
            return;
        }
        if x0 == x1 {
            self.fill_span(x0 - before, y0, x0 + after, y1, stroke.color);
            return;
        }

        let dx = (x1 - x0) as f64;
        let dy = (y1 - y0) as f64;
        let steps = dx.abs().max(dy.abs()).ceil() as i64;
        let radius = (stroke.width.max(1.0) / 2.0).max(0.6);
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            self.draw_disc(x0 as f64 + dx * t, y0 as f64 + dy * t, radius, stroke.color);
        }
    }

    fn stroke_rect(&mut self, rect: PixelRect, stroke: Stroke) {
        let left = rect.x;
        let top = rect.y;
        let right = rect.x.saturating_add(rect.width as i32);
        let bottom = rect.y.saturating_add(rect.height as i32);
        self.stroke_line(PixelPoint::new(left, top), PixelPoint::new(right, top), stroke);
        self.stroke_line(PixelPoint::new(left, bottom), PixelPoint::new(right, bottom), stroke);
        self.stroke_line(PixelPoint::new(left, top), PixelPoint::new(left, bottom), stroke);
        self.stroke_line(PixelPoint::new(right, top), PixelPoint::new(right, bottom), stroke);
    }

    fn fill_rounded_rect(&mut self, rect: PixelRect, radius: f64, color: Rgba<u8>) {
        let Some(visible) = rect.clamp_to(self.size()) else {
            return;
        };
        let left = f64::from(rect.x);
        let top = f64::from(rect.y);
        let right = left + f64::from(rect.width);
        let bottom = top + f64::from(rect.height);
        let r = radius
            .max(0.0)
            .min(f64::from(rect.width) / 2.0)
            .min(f64::from(rect.height) / 2.0);
        let corners = [
            (left + r, top + r),
            (right - r, top + r),
            (left + r, bottom - r),
            (right - r, bottom - r),
        ];

        for y in visible.y..(visible.y + visible.height as i32) {
            for x in visible.x..(visible.x + visible.width as i32) {
                let px = f64::from(x) + 0.5;
                let py = f64::from(y) + 0.5;
                let in_cross = (px >= left + r && px <= right - r) || (py >= top + r && py <= bottom - r);
                let in_corner = corners.iter().any(|(cx, cy)| {
                    let dx = px - cx;
                    let dy = py - cy;
                    dx * dx + dy * dy <= r * r
                });
                if in_cross || in_corner {
                    self.blend_at(i64::from(x), i64::from(y), color);
                }
            }
        }
    }

    fn stroke_circle(&mut self, center: PixelPoint, radius: f64, stroke: Stroke) {
        let half = stroke.width.max(1.0) / 2.0;
        let inner = (radius - half).max(0.0);
        let outer = radius + half;
        let (inner2, outer2) = (inner * inner, outer * outer);
        let cx = f64::from(center.x);
        let cy = f64::from(center.y);
        let reach = outer.ceil() as i64;

        for y in (i64::from(center.y) - reach)..=(i64::from(center.y) + reach) {
            for x in (i64::from(center.x) - reach)..=(i64::from(center.x) + reach) {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 >= inner2 && d2 <= outer2 {
                    self.blend_at(x, y, stroke.color);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, origin: PixelPoint, color: Rgba<u8>) {
        text::for_each_glyph_pixel(text, |x, y| {
            self.blend_at(
                i64::from(origin.x) + i64::from(x),
                i64::from(origin.y) + i64::from(y),
                color,
            );
        });
    }

    fn pixel_color(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return None;
        }
        Some(self.pixels.get_pixel(x, y).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 0, 255])
        })
    }

    #[test]
    fn clear_resets_every_pixel_to_transparent() {
        let mut canvas = RasterCanvas::from_image(RgbaImage::from_pixel(4, 4, WHITE));
        canvas.clear();
        assert!(canvas.image().pixels().all(|pixel| *pixel == TRANSPARENT));
    }

    #[test]
    fn nearest_draw_replicates_source_pixels_in_blocks() {
        let source = checker(4, 4);
        let mut canvas = RasterCanvas::new(12, 12);
        canvas.set_smoothing(false);
        canvas.draw_image_region(&source, PixelRect::new(1, 1, 2, 2), PixelRect::new(0, 0, 12, 12));

        assert_eq!(canvas.pixel_color(0, 0), Some([10, 10, 0, 255]));
        assert_eq!(canvas.pixel_color(5, 5), Some([10, 10, 0, 255]));
        assert_eq!(canvas.pixel_color(6, 0), Some([20, 10, 0, 255]));
        assert_eq!(canvas.pixel_color(11, 11), Some([20, 20, 0, 255]));
    }

    #[test]
    fn nearest_draw_leaves_out_of_source_area_untouched() {
        let source = checker(4, 4);
        let mut canvas = RasterCanvas::new(8, 8);
        canvas.set_smoothing(false);
        canvas.draw_image_region(&source, PixelRect::new(2, 2, 4, 4), PixelRect::new(0, 0, 8, 8));

        assert_eq!(canvas.pixel_color(0, 0), Some([20, 20, 0, 255]));
        assert_eq!(canvas.pixel_color(3, 3), Some([30, 30, 0, 255]));
        assert_eq!(canvas.pixel_color(4, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel_color(7, 7), Some([0, 0, 0, 0]));
    }

    #[test]
    fn smoothed_draw_fills_destination_from_uniform_source() {
        let source = RgbaImage::from_pixel(8, 8, RED);
        let mut canvas = RasterCanvas::new(32, 16);
        canvas.draw_image_region(&source, PixelRect::new(0, 0, 8, 8), PixelRect::new(0, 0, 32, 16));
        assert!(canvas
            .image()
            .pixels()
            .all(|pixel| pixel[0] >= 254 && pixel[1] <= 1 && pixel[2] <= 1 && pixel[3] >= 254));
    }

    #[test]
    fn stroke_rect_outlines_both_edge_columns_and_rows() {
        let mut canvas = RasterCanvas::new(16, 16);
        canvas.stroke_rect(PixelRect::new(2, 3, 6, 4), Stroke::new(WHITE, 1.0));

        assert_eq!(canvas.pixel_color(2, 3), Some(WHITE.0));
        assert_eq!(canvas.pixel_color(8, 7), Some(WHITE.0));
        assert_eq!(canvas.pixel_color(5, 3), Some(WHITE.0));
        assert_eq!(canvas.pixel_color(8, 5), Some(WHITE.0));
        assert_eq!(canvas.pixel_color(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn stroke_circle_paints_band_and_leaves_centre_empty() {
        let mut canvas = RasterCanvas::new(41, 41);
        canvas.stroke_circle(PixelPoint::new(20, 20), 16.0, Stroke::new(RED, 4.0));

        assert_eq!(canvas.pixel_color(20, 20), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel_color(36, 20), Some(RED.0));
        assert_eq!(canvas.pixel_color(20, 2), Some(RED.0));
        assert_eq!(canvas.pixel_color(20, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fill_rounded_rect_skips_the_very_corner() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.fill_rounded_rect(PixelRect::new(0, 0, 20, 10), 4.0, RED);

        assert_eq!(canvas.pixel_color(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel_color(10, 5), Some(RED.0));
        assert_eq!(canvas.pixel_color(0, 5), Some(RED.0));
        assert_eq!(canvas.pixel_color(10, 12), Some([0, 0, 0, 0]));
    }

    #[test]
    fn pixel_color_outside_target_is_none() {
        let canvas = RasterCanvas::new(4, 4);
        assert_eq!(canvas.pixel_color(4, 0), None);
        assert_eq!(RasterCanvas::new(0, 0).pixel_color(0, 0), None);
    }
}
