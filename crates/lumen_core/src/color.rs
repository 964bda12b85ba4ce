//! Linear-light colour helpers.
//!
//! All shading happens in linear light. Images entering the system are
//! gamma-decoded once at load time and the accumulated result is
//! gamma-encoded only when it is quantised for display.

use lumen_math::Vec3;

/// RGB colour in linear light. Values are unbounded above (HDR).
pub type Color = Vec3;

/// Display gamma used when none is configured.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// Convert an encoded value to linear light: `x^gamma`.
#[inline]
pub fn gamma_decode(value: f32, gamma: f32) -> f32 {
    if value <= 0.0 {
        0.0
    } else {
        value.powf(gamma)
    }
}

/// Convert a linear value to its encoded form: `x^(1/gamma)`.
#[inline]
pub fn gamma_encode(value: f32, gamma: f32) -> f32 {
    if value <= 0.0 {
        0.0
    } else {
        value.powf(1.0 / gamma)
    }
}

pub fn decode_color(color: Color, gamma: f32) -> Color {
    Color::new(
        gamma_decode(color.x, gamma),
        gamma_decode(color.y, gamma),
        gamma_decode(color.z, gamma),
    )
}

pub fn encode_color(color: Color, gamma: f32) -> Color {
    Color::new(
        gamma_encode(color.x, gamma),
        gamma_encode(color.y, gamma),
        gamma_encode(color.z, gamma),
    )
}

/// Rec. 709 relative luminance of a linear colour.
#[inline]
pub fn luminance(color: Color) -> f32 {
    0.2126 * color.x + 0.7152 * color.y + 0.0722 * color.z
}

/// Quantise an encoded channel in [0, 1] to a byte.
#[inline]
pub fn quantize(encoded: f32) -> u8 {
    (encoded.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Gamma-encode and quantise a linear colour to 8-bit RGBA (alpha = 255).
pub fn color_to_rgba(color: Color, gamma: f32) -> [u8; 4] {
    let encoded = encode_color(color, gamma);
    [
        quantize(encoded.x),
        quantize(encoded.y),
        quantize(encoded.z),
        255,
    ]
}

/// Replace non-finite or negative channels with zero.
pub fn sanitize(color: Color) -> Color {
    let fix = |c: f32| if c.is_finite() && c > 0.0 { c } else { 0.0 };
    Color::new(fix(color.x), fix(color.y), fix(color.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_round_trip() {
        for gamma in [1.0, 2.2] {
            for i in 0..=100 {
                let x = i as f32 / 100.0;
                let back = gamma_encode(gamma_decode(x, gamma), gamma);
                assert!(
                    (back - x).abs() < 1e-4,
                    "gamma {gamma}: {x} came back as {back}"
                );
            }
        }
    }

    #[test]
    fn test_mid_grey_is_darker_in_linear() {
        let mid = gamma_decode(0.5, DEFAULT_GAMMA);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
        assert_eq!(gamma_decode(-1.0, 2.2), 0.0);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO, 2.2), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE, 2.2), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::splat(5.0), 2.2), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(0.25, 0.0, 0.0), 2.0)[0], 128);
    }

    #[test]
    fn test_sanitize_and_luminance() {
        let c = sanitize(Color::new(f32::NAN, -1.0, f32::INFINITY));
        assert_eq!(c, Color::ZERO);
        assert!((luminance(Color::ONE) - 1.0).abs() < 1e-6);
    }
}
