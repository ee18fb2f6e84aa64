//! Sampled color values and their hex encoding.

use std::fmt;

use thiserror::Error;

pub type ColorResult<T> = std::result::Result<T, ColorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color component {channel}={value}: must be within 0..=255")]
    ComponentOutOfRange { channel: char, value: u32 },

    #[error("invalid hex color {input:?}: expected 6 hex digits")]
    MalformedHex { input: String },
}

/// An RGB color read back from exactly one rendered pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampledColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SampledColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from wide components, failing on anything above 255.
    pub fn try_from_components(r: u32, g: u32, b: u32) -> ColorResult<Self> {
        Ok(Self {
            r: component(r, 'r')?,
            g: component(g, 'g')?,
            b: component(b, 'b')?,
        })
    }

    /// Alpha is ignored; the readback of a transparent pixel is `000000`.
    pub const fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2])
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Lowercase, zero padded, no prefix: `"12ab0f"`.
    pub fn to_hex(self) -> String {
        format!("{:06x}", packed(self))
    }

    /// Display form `"#12AB0F"`.
    pub fn to_display_hex(self) -> String {
        format!("#{}", self.to_hex().to_uppercase())
    }

    pub fn to_cairo_rgb(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl fmt::Display for SampledColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

impl std::str::FromStr for SampledColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (r, g, b) = hex_to_rgb(s)?;
        Ok(Self::new(r, g, b))
    }
}

/// Encodes an RGB triple as 6 lowercase hex digits.
///
/// Components are taken wide so that an out-of-range value coming from an
/// upstream sampling bug is reported instead of being truncated.
pub fn rgb_to_hex(r: u32, g: u32, b: u32) -> ColorResult<String> {
    SampledColor::try_from_components(r, g, b).map(SampledColor::to_hex)
}

/// Decodes 6 hex digits, with or without a leading `#`, in either case.
pub fn hex_to_rgb(input: &str) -> ColorResult<(u8, u8, u8)> {
    let digits = input.strip_prefix('#').unwrap_or(input);
    let malformed = || ColorError::MalformedHex {
        input: input.to_string(),
    };
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let value = u32::from_str_radix(digits, 16).map_err(|_| malformed())?;
    Ok((
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

fn component(value: u32, channel: char) -> ColorResult<u8> {
    u8::try_from(value).map_err(|_| ColorError::ComponentOutOfRange { channel, value })
}

fn packed(color: SampledColor) -> u32 {
    (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_to_hex_zero_pads_lowercase_digits() {
        assert_eq!(rgb_to_hex(0, 0, 0).expect("black"), "000000");
        assert_eq!(rgb_to_hex(255, 0, 0).expect("red"), "ff0000");
        assert_eq!(rgb_to_hex(0, 255, 255).expect("cyan"), "00ffff");
        assert_eq!(rgb_to_hex(1, 2, 3).expect("near black"), "010203");
    }

    #[test]
    fn rgb_to_hex_rejects_components_above_255() {
        let err = rgb_to_hex(256, 0, 0).expect_err("256 must be rejected");
        assert_eq!(
            err,
            ColorError::ComponentOutOfRange {
                channel: 'r',
                value: 256
            }
        );
        assert!(matches!(
            rgb_to_hex(0, 0, 1000),
            Err(ColorError::ComponentOutOfRange { channel: 'b', .. })
        ));
    }

    #[test]
    fn hex_round_trips_channel_extremes_and_mixed_values() {
        for (r, g, b) in [(0, 0, 0), (255, 255, 255), (18, 52, 86), (0, 128, 255)] {
            let hex = rgb_to_hex(r, g, b).expect("in range");
            assert_eq!(hex.len(), 6);
            let decoded = hex_to_rgb(&hex).expect("decodes");
            assert_eq!(
                (u32::from(decoded.0), u32::from(decoded.1), u32::from(decoded.2)),
                (r, g, b)
            );
        }
    }

    #[test]
    fn display_hex_is_prefixed_and_uppercase() {
        let color = SampledColor::new(18, 52, 86);
        assert_eq!(color.to_display_hex(), "#123456");
        assert_eq!(SampledColor::new(171, 205, 239).to_string(), "#ABCDEF");
    }

    #[test]
    fn hex_to_rgb_rejects_malformed_input() {
        assert!(matches!(
            hex_to_rgb("#12345"),
            Err(ColorError::MalformedHex { .. })
        ));
        assert!(matches!(
            hex_to_rgb("zz0000"),
            Err(ColorError::MalformedHex { .. })
        ));
        assert_eq!(
            "#AbCdEf".parse::<SampledColor>().expect("mixed case parses"),
            SampledColor::new(0xab, 0xcd, 0xef)
        );
    }
}
