//! Source-over compositing of a watermark onto a base image.
//!
//! The watermark is placed by its top-left corner, which may lie outside the
//! base image: the blend loop clips to the overlapping region and discards
//! the rest. Base pixels outside the watermark footprint are never touched.

use image::{Rgba, RgbaImage};

/// Fixed opacity factor applied to image watermarks.
pub const IMAGE_WATERMARK_OPACITY: f32 = 0.5;

/// Below this output alpha a blended pixel is treated as fully transparent.
const MIN_ALPHA: f32 = 0.001;

/// Top-left corner for centering `mark` over `base`.
///
/// Both coordinates follow `base/2 - mark/2` per axis and may be negative
/// when the watermark is larger than the base image. That is a valid
/// placement, not an error; [`overlay`] clips it.
#[must_use]
pub fn centered_position(base_w: u32, base_h: u32, mark_w: u32, mark_h: u32) -> (i32, i32) {
    #[allow(clippy::cast_possible_wrap)]
    let (bw, bh, mw, mh) = (base_w as i32, base_h as i32, mark_w as i32, mark_h as i32);
    (bw / 2 - mw / 2, bh / 2 - mh / 2)
}

/// Blend `mark` over `base` with its top-left corner at `(x, y)`.
///
/// Standard source-over alpha compositing; each mark pixel's alpha is scaled
/// by `opacity` before blending. The overlap region is clipped to the base
/// bounds, so negative or out-of-range coordinates simply drop the portion
/// that falls outside.
pub fn overlay(base: &mut RgbaImage, mark: &RgbaImage, x: i32, y: i32, opacity: f32) {
    #[allow(clippy::cast_possible_wrap)]
    let (base_w, base_h) = (base.width() as i32, base.height() as i32);
    #[allow(clippy::cast_possible_wrap)]
    let (mark_w, mark_h) = (mark.width() as i32, mark.height() as i32);

    // Visible region in base coordinates
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + mark_w).min(base_w);
    let y_end = (y + mark_h).min(base_h);

    if x_start >= x_end || y_start >= y_end {
        return;
    }

    for by in y_start..y_end {
        for bx in x_start..x_end {
            #[allow(clippy::cast_sign_loss)]
            let (mx, my) = ((bx - x) as u32, (by - y) as u32);
            let mark_px = *mark.get_pixel(mx, my);

            #[allow(clippy::cast_sign_loss)]
            let (bx, by) = (bx as u32, by as u32);
            let base_px = *base.get_pixel(bx, by);
            base.put_pixel(bx, by, blend_pixels(base_px, mark_px, opacity));
        }
    }
}

/// Composite `mark` centered over `base` at the given opacity.
pub fn overlay_centered(base: &mut RgbaImage, mark: &RgbaImage, opacity: f32) {
    let (x, y) = centered_position(base.width(), base.height(), mark.width(), mark.height());
    overlay(base, mark, x, y, opacity);
}

/// Porter-Duff "over" for a single pixel pair, with an extra opacity factor
/// on the foreground alpha.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (f32::from(foreground[3]) / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = f32::from(background[3]) / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < MIN_ALPHA {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = f32::from(fg) / 255.0;
        let bg_f = f32::from(bg) / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    let out_alpha = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        out_alpha,
    ])
}
