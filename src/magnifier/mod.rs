//! Magnified pixel-grid tile rendered around the pointer.

use image::Rgba;

use crate::canvas::{text_size, DrawingTarget, Stroke};
use crate::color::SampledColor;
use crate::geometry::{PixelPoint, PixelRect, PixelSize};
use crate::surface::ImageSurface;

/// Side of one magnified source pixel, in tile pixels.
pub const GRID_UNIT: u32 = 12;
/// Source pixels sampled per tile side.
pub const GRID_SIZE: u32 = 17;
/// Side of the square overlay tile.
pub const P_SIZE: u32 = GRID_SIZE * GRID_UNIT;
/// Stroke width of the ring showing the sampled color.
pub const LINE_WIDTH: u32 = 12;

const TILE_CENTER: u32 = P_SIZE / 2;
const GRID_COLOR: Rgba<u8> = Rgba([0xcc, 0xcc, 0xff, 255]);
const CROSSHAIR_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CHIP_RECT: PixelRect = PixelRect::new(72, 120, 62, 20);
const CHIP_RADIUS: f64 = 2.0;
const CHIP_COLOR: Rgba<u8> = Rgba([0x88, 0x88, 0x88, 255]);
const CHIP_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Top-left corner of the `GRID_SIZE × GRID_SIZE` block of the surface that
/// the tile magnifies.
///
/// The origin is clamped against `GRID_UNIT`, not `GRID_SIZE`, so near the
/// right and bottom edges the block runs past the surface and that part of
/// the tile stays transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    pub x: i32,
    pub y: i32,
}

impl SampleWindow {
    pub fn for_cursor(cursor: PixelPoint, display: PixelSize) -> Self {
        Self {
            x: clamp_origin(cursor.x, display.width),
            y: clamp_origin(cursor.y, display.height),
        }
    }

    pub const fn source_rect(self) -> PixelRect {
        PixelRect::new(self.x, self.y, GRID_SIZE, GRID_SIZE)
    }
}

fn clamp_origin(cursor: i32, extent: u32) -> i32 {
    let upper = i32::try_from(extent.saturating_sub(GRID_UNIT)).unwrap_or(i32::MAX);
    cursor.max(0).min(upper)
}

/// Tile offsets of the interior grid lines, shared by both axes.
pub fn grid_line_offsets() -> impl Iterator<Item = u32> {
    (GRID_UNIT..P_SIZE).step_by(GRID_UNIT as usize)
}

/// The crosshair square, centred on the tile centre.
pub const fn crosshair_rect() -> PixelRect {
    PixelRect::new(
        (TILE_CENTER - GRID_UNIT / 2) as i32,
        (TILE_CENTER - GRID_UNIT / 2) as i32,
        GRID_UNIT,
        GRID_UNIT,
    )
}

/// Reads the color currently rendered at the tile centre.
pub fn read_center_color<T: DrawingTarget + ?Sized>(target: &T) -> Option<SampledColor> {
    target
        .pixel_color(TILE_CENTER, TILE_CENTER)
        .map(SampledColor::from_rgba)
}

/// Redraws the magnifier tile for a pointer at surface-local `cursor` and
/// returns the color under the crosshair.
///
/// Does nothing while the surface has no rendered frame. If the centre pixel
/// cannot be read back, the tile keeps what was drawn so far without the
/// readout chip and ring.
pub fn render_tile<T: DrawingTarget + ?Sized>(
    target: &mut T,
    surface: &ImageSurface,
    cursor: PixelPoint,
    display: PixelSize,
) -> Option<SampledColor> {
    let Some(raster) = surface.raster() else {
        tracing::trace!("magnifier skipped: surface not rendered yet");
        return None;
    };

    target.clear();
    target.set_smoothing(false);

    let window = SampleWindow::for_cursor(cursor, display);
    target.draw_image_region(
        raster,
        window.source_rect(),
        PixelRect::new(0, 0, P_SIZE, P_SIZE),
    );

    draw_grid(target);
    target.stroke_rect(crosshair_rect(), Stroke::new(CROSSHAIR_COLOR, 1.0));

    let Some(color) = read_center_color(target) else {
        tracing::trace!("magnifier centre pixel unreadable; skipping readout");
        return None;
    };

    draw_readout(target, color);
    let center = PixelPoint::new(TILE_CENTER as i32, TILE_CENTER as i32);
    let radius = f64::from(P_SIZE) / 2.0 - f64::from(LINE_WIDTH) / 2.0;
    target.stroke_circle(
        center,
        radius,
        Stroke::new(Rgba(color.to_rgba()), f64::from(LINE_WIDTH)),
    );

    Some(color)
}

fn draw_grid<T: DrawingTarget + ?Sized>(target: &mut T) {
    let stroke = Stroke::new(GRID_COLOR, 1.0);
    let far = P_SIZE as i32;
    for offset in grid_line_offsets() {
        let offset = offset as i32;
        target.stroke_line(PixelPoint::new(0, offset), PixelPoint::new(far, offset), stroke);
        target.stroke_line(PixelPoint::new(offset, 0), PixelPoint::new(offset, far), stroke);
    }
}

fn draw_readout<T: DrawingTarget + ?Sized>(target: &mut T, color: SampledColor) {
    target.fill_rounded_rect(CHIP_RECT, CHIP_RADIUS, CHIP_COLOR);

    let label = color.to_display_hex();
    let label_size = text_size(&label);
    let origin = PixelPoint::new(
        CHIP_RECT.x + (CHIP_RECT.width.saturating_sub(label_size.width) / 2) as i32,
        CHIP_RECT.y + (CHIP_RECT.height.saturating_sub(label_size.height) / 2) as i32,
    );
    target.fill_text(&label, origin, CHIP_TEXT_COLOR);
}
