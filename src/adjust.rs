//! Pixel-level image adjustments.
//!
//! Four point-wise transformations over an RGBA buffer: brighten, contrast,
//! greyscale, and invert. All of them operate in place, leave the alpha
//! channel untouched, and never change the buffer dimensions.

use std::str::FromStr;

use image::RgbaImage;

use crate::error::Error;

/// Fixed magnitude used by the driver-facing brighten/contrast keywords.
pub const DEFAULT_AMOUNT: f32 = 0.5;

/// Maximum contrast amount: clamp to avoid division by near-zero in the
/// contrast factor.
const MAX_CONTRAST: f32 = 0.99;

/// Rec. 709 luminance weights for greyscale conversion.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// A single pixel-value adjustment.
///
/// Amounts are clamped to `[-1.0, 1.0]` when applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Lighten (positive) or darken (negative) every channel along a curve
    /// that keeps 255 fixed: `v' = v + (255 - v) * amount` for positive
    /// amounts, `v' = v * (1 + amount)` for negative ones.
    Brighten(f32),
    /// Stretch channel values away from the 127.5 midpoint. Monotonic,
    /// symmetric about the midpoint, and fixes 0 and 255.
    Contrast(f32),
    /// Replace R, G, B with their Rec. 709 luminance. Idempotent.
    Greyscale,
    /// Replace every channel value `v` with `255 - v`. Involutive.
    Invert,
}

impl FromStr for Adjustment {
    type Err = Error;

    /// Parse one of the driver-facing adjustment keywords.
    ///
    /// The four supported phrases map to fixed specs; anything else is
    /// [`Error::UnsupportedAdjustment`] rather than a silent no-op.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "make image brighter" => Ok(Self::Brighten(DEFAULT_AMOUNT)),
            "increase contrast" => Ok(Self::Contrast(DEFAULT_AMOUNT)),
            "make image b&w" => Ok(Self::Greyscale),
            "invert image" => Ok(Self::Invert),
            other => Err(Error::UnsupportedAdjustment(other.to_string())),
        }
    }
}

/// Apply an adjustment to an image in-place.
///
/// Dimensions never change; only channel values are rewritten. Alpha is
/// always left as-is.
pub fn apply(image: &mut RgbaImage, adjustment: Adjustment) {
    match adjustment {
        Adjustment::Brighten(amount) => brighten(image, amount),
        Adjustment::Contrast(amount) => contrast(image, amount),
        Adjustment::Greyscale => greyscale(image),
        Adjustment::Invert => invert(image),
    }
}

/// Rewrite the R, G, B channels of every pixel through `f`.
fn map_channels(image: &mut RgbaImage, f: impl Fn(f32) -> f32) {
    for px in image.pixels_mut() {
        for ch in 0..3 {
            let v = f(f32::from(px[ch]));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                px[ch] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Lightening curve: positive amounts pull values toward 255, negative
/// amounts scale them toward 0. Not simple addition, so 255 stays 255.
fn brighten(image: &mut RgbaImage, amount: f32) {
    let amount = amount.clamp(-1.0, 1.0);
    if amount >= 0.0 {
        map_channels(image, |v| v + (255.0 - v) * amount);
    } else {
        map_channels(image, |v| v * (1.0 + amount));
    }
}

/// Contrast stretch about the 127.5 midpoint with factor
/// `(amount + 1) / (1 - amount)`.
fn contrast(image: &mut RgbaImage, amount: f32) {
    let amount = amount.clamp(-1.0, MAX_CONTRAST);
    let factor = (amount + 1.0) / (1.0 - amount);
    map_channels(image, |v| factor * (v - 127.5) + 127.5);
}

/// Luminance-weighted greyscale; R, G, B all become the same value.
fn greyscale(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        let lum = LUMA_R * f32::from(px[0]) + LUMA_G * f32::from(px[1]) + LUMA_B * f32::from(px[2]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lum = lum.round().clamp(0.0, 255.0) as u8;
        px[0] = lum;
        px[1] = lum;
        px[2] = lum;
    }
}

/// Per-channel complement.
fn invert(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
}
