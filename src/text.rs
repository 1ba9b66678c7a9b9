//! Text watermark rasterization.
//!
//! Renders a text string to a transparent RGBA sprite that the compositor
//! centers over the base image. The policy is fixed: one sans-serif face at
//! 32 px, black, single line. Overflowing text is clipped by the compositor,
//! never wrapped or shrunk.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Fixed font size for all text watermarks, in pixels.
pub const FONT_SIZE: f32 = 32.0;

/// Fixed text color (black, fully opaque before compositing).
const TEXT_COLOR: [u8; 3] = [0, 0, 0];

/// Horizontal padding added around the measured text, in pixels.
const PADDING: u32 = 2;

/// Well-known sans-serif font locations, tried in order.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/gnu-free/FreeSans.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A loaded font face used for text watermarks.
pub struct FontHandle {
    font: FontVec,
    path: PathBuf,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FontHandle {
    /// Load a font from an explicit file path.
    ///
    /// Font collections (`.ttc`) use their first face.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontLoad`] if the file cannot be read or does not
    /// contain a parseable font.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| Error::FontLoad(format!("{}: {e}", path.display())))?;
        let font = FontVec::try_from_vec_and_index(data, 0)
            .map_err(|e| Error::FontLoad(format!("{}: {e}", path.display())))?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    /// Load the default sans-serif face by probing well-known system font
    /// locations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FontLoad`] when none of the candidate paths yields a
    /// usable font.
    pub fn load_default() -> Result<Self> {
        for candidate in SYSTEM_FONT_PATHS {
            let path = Path::new(candidate);
            if path.is_file() {
                if let Ok(handle) = Self::from_path(path) {
                    return Ok(handle);
                }
            }
        }
        Err(Error::FontLoad(
            "no sans-serif font found in system font directories".to_string(),
        ))
    }

    /// Path the font was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Measure the rendered dimensions of `text` at the fixed watermark size.
///
/// Returns `(width, height)` in pixels, kerning included.
#[must_use]
pub fn measure_text(font: &FontHandle, text: &str) -> (u32, u32) {
    let scale = PxScale::from(FONT_SIZE);
    let scaled = font.font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    let height = scaled.height();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let w = width.ceil().max(0.0) as u32 + PADDING;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let h = height.ceil().max(0.0) as u32 + PADDING;
    (w, h)
}

/// Render `text` to a transparent RGBA sprite.
///
/// Glyph coverage becomes the alpha channel, so anti-aliased edges blend
/// cleanly when the sprite is composited.
///
/// # Errors
///
/// Returns [`Error::EmptyWatermarkText`] for an empty string.
pub fn render_text(font: &FontHandle, text: &str) -> Result<RgbaImage> {
    if text.is_empty() {
        return Err(Error::EmptyWatermarkText);
    }

    let scale = PxScale::from(FONT_SIZE);
    let scaled = font.font.as_scaled(scale);
    let (width, height) = measure_text(font, text);

    let mut sprite = RgbaImage::new(width.max(1), height.max(1));

    let baseline_y = scaled.ascent();
    let mut cursor_x = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));
        if let Some(outlined) = font.font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let x = px as i32 + bounds.min.x as i32;
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let y = py as i32 + bounds.min.y as i32;

                #[allow(clippy::cast_possible_wrap)]
                let (w, h) = (sprite.width() as i32, sprite.height() as i32);
                if x >= 0 && y >= 0 && x < w && y < h {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    #[allow(clippy::cast_sign_loss)]
                    let (x, y) = (x as u32, y as u32);

                    // Keep the higher coverage where glyph boxes overlap
                    let existing = sprite.get_pixel(x, y);
                    if alpha > existing[3] {
                        sprite.put_pixel(
                            x,
                            y,
                            Rgba([TEXT_COLOR[0], TEXT_COLOR[1], TEXT_COLOR[2], alpha]),
                        );
                    }
                }
            });
        }

        cursor_x += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    Ok(sprite)
}
