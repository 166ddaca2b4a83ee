//! sRGB transfer functions on single float channels.
//!
//! Negative inputs map to `0.0` on both sides; values above `1.0` follow the curve unclamped.

/// Encode a linear-light channel into sRGB display space.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        if c < 0.0 { 0.0 } else { c * 12.92 }
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Decode an sRGB display-space channel into linear light.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.040_45 {
        if c < 0.0 { 0.0 } else { c * (1.0 / 12.92) }
    } else {
        ((c + 0.055) * (1.0 / 1.055)).powf(2.4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
