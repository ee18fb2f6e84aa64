use gtk4::cairo;
use image::RgbaImage;

/// Converts straight RGBA into cairo's premultiplied native-endian ARGB32.
pub(super) fn rgba_to_cairo_surface(image: &RgbaImage) -> Option<cairo::ImageSurface> {
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let mut surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).ok()?;
    let stride = usize::try_from(surface.stride()).ok()?;
    let row_len = usize::try_from(image.width()).ok()?.checked_mul(4)?;

    {
        let mut data = surface.data().ok()?;
        for (src_row, dst_row) in image
            .as_raw()
            .chunks_exact(row_len)
            .zip(data.chunks_exact_mut(stride))
        {
            for (src, dst) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let alpha = u16::from(src[3]);
                let premultiply = |channel: u8| ((u16::from(channel) * alpha + 127) / 255) as u8;
                let argb = u32::from(src[3]) << 24
                    | u32::from(premultiply(src[0])) << 16
                    | u32::from(premultiply(src[1])) << 8
                    | u32::from(premultiply(src[2]));
                dst.copy_from_slice(&argb.to_ne_bytes());
            }
        }
    }

    surface.mark_dirty();
    Some(surface)
}

pub(super) fn paint_surface(context: &cairo::Context, surface: &cairo::ImageSurface) {
    context.save().ok();
    if context.set_source_surface(surface, 0.0, 0.0).is_ok() {
        context.paint().ok();
    }
    context.restore().ok();
}
