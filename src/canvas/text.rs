use font8x8::{UnicodeFonts, BASIC_FONTS};

use crate::geometry::PixelSize;

pub const GLYPH_ADVANCE: u32 = 8;
pub const GLYPH_HEIGHT: u32 = 8;

/// Box covered by `text` set in the 8x8 bitmap font.
pub fn text_size(text: &str) -> PixelSize {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    PixelSize::new(chars.saturating_mul(GLYPH_ADVANCE), GLYPH_HEIGHT)
}

/// Calls `plot` for every lit pixel of `text`, relative to its top-left corner.
/// Characters missing from the font render as `?`.
pub(super) fn for_each_glyph_pixel(text: &str, mut plot: impl FnMut(u32, u32)) {
    for (index, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            continue;
        };
        let base_x = u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(GLYPH_ADVANCE);
        for (row, bits) in glyph.iter().copied().enumerate() {
            for col in 0..8_u32 {
                if (bits >> col) & 1 == 1 {
                    plot(base_x + col, row as u32);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_size_counts_characters_not_bytes() {
        assert_eq!(text_size("#12AB0F"), PixelSize::new(56, 8));
        assert_eq!(text_size(""), PixelSize::new(0, 8));
    }

    #[test]
    fn glyph_pixels_stay_inside_text_box() {
        let mut lit = 0;
        for_each_glyph_pixel("#FF00AA", |x, y| {
            assert!(x < 56 && y < 8);
            lit += 1;
        });
        assert!(lit > 0);
    }

    #[test]
    fn space_lights_nothing() {
        let mut lit = 0;
        for_each_glyph_pixel("   ", |_, _| lit += 1);
        assert_eq!(lit, 0);
    }
}
