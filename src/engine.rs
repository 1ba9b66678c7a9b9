//! Watermark pipeline orchestration.
//!
//! A [`ProcessRequest`] carries everything a pipeline run needs: the input
//! path, an optional adjustment, and the watermark spec. The driver fills it
//! in completely before calling [`WatermarkEngine::process`], so the image
//! logic stays free of interactive I/O and can run headless.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::adjust::{self, Adjustment};
use crate::compose::{self, IMAGE_WATERMARK_OPACITY};
use crate::error::{Error, Result};
use crate::text::{self, FontHandle};

/// Encoding quality for watermark outputs (no extra lossy compression).
pub const MAX_QUALITY: u8 = 100;

/// Codec default quality, used when re-encoding an adjusted source in place.
const DEFAULT_QUALITY: u8 = 75;

/// Suffix inserted into derived output filenames.
const OUTPUT_SUFFIX: &str = "-with-watermark";

/// The watermark to composite onto the source image.
#[derive(Debug, Clone)]
pub enum WatermarkSpec {
    /// Rasterize this string centered over the image.
    Text(String),
    /// Decode this image file and blend it centered at half opacity.
    Image(PathBuf),
}

/// A fully-populated pipeline request.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Source image path.
    pub input: PathBuf,
    /// Optional adjustment applied to the source in place before
    /// watermarking.
    pub adjustment: Option<Adjustment>,
    /// Watermark to composite.
    pub watermark: WatermarkSpec,
    /// Explicit output path; derived from the input when `None`.
    pub output: Option<PathBuf>,
}

/// Outcome of one file in a batch run.
#[derive(Debug)]
pub struct BatchResult {
    /// Source image path.
    pub input: PathBuf,
    /// Output path on success, pipeline error otherwise.
    pub outcome: Result<PathBuf>,
}

/// The watermark engine.
///
/// Create once and reuse across images; the watermark font is loaded on
/// first use and cached for the lifetime of the engine.
#[derive(Debug, Default)]
pub struct WatermarkEngine {
    font_path: Option<PathBuf>,
    font: OnceLock<FontHandle>,
}

impl WatermarkEngine {
    /// Create an engine that uses the default system sans-serif font for
    /// text watermarks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine that loads its text watermark font from `path`.
    #[must_use]
    pub fn with_font_path(path: PathBuf) -> Self {
        Self {
            font_path: Some(path),
            font: OnceLock::new(),
        }
    }

    /// Get the cached font, loading it on first use.
    fn font(&self) -> Result<&FontHandle> {
        if let Some(font) = self.font.get() {
            return Ok(font);
        }
        let loaded = match &self.font_path {
            Some(path) => FontHandle::from_path(path)?,
            None => FontHandle::load_default()?,
        };
        Ok(self.font.get_or_init(|| loaded))
    }

    /// Apply an adjustment to an image file in place.
    ///
    /// Decodes the file, rewrites its pixel values, and re-encodes it to the
    /// same path at codec default quality.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the file cannot be read as an image
    /// and [`Error::Encode`] when writing it back fails.
    pub fn adjust_file(&self, path: &Path, adjustment: Adjustment) -> Result<()> {
        let mut img = load_image(path)?;
        adjust::apply(&mut img, adjustment);
        save_image(&img, path, DEFAULT_QUALITY)
    }

    /// Composite a watermark onto `input` and write the result to `output`
    /// at maximum quality.
    ///
    /// Text watermarks are rasterized at the fixed 32 px black policy and
    /// composited centered at full opacity. Image watermarks are decoded
    /// from their file and blended centered at half opacity; marks larger
    /// than the base are clipped, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`], [`Error::FontLoad`],
    /// [`Error::EmptyWatermarkText`], or [`Error::Encode`] depending on the
    /// failing step.
    pub fn watermark_file(
        &self,
        input: &Path,
        output: &Path,
        watermark: &WatermarkSpec,
    ) -> Result<()> {
        let mut base = load_image(input)?;

        match watermark {
            WatermarkSpec::Text(text) => {
                let sprite = text::render_text(self.font()?, text)?;
                compose::overlay_centered(&mut base, &sprite, 1.0);
            }
            WatermarkSpec::Image(mark_path) => {
                let mark = load_image(mark_path)?;
                compose::overlay_centered(&mut base, &mark, IMAGE_WATERMARK_OPACITY);
            }
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        save_image(&base, output, MAX_QUALITY)
    }

    /// Run the full pipeline for one request.
    ///
    /// The optional adjustment mutates the source file in place first; the
    /// watermark is then composited onto the (possibly adjusted) source and
    /// written to the derived or explicit output path, which is returned.
    ///
    /// # Errors
    ///
    /// Propagates the tagged error of whichever pipeline step fails.
    pub fn process(&self, request: &ProcessRequest) -> Result<PathBuf> {
        if let Some(adjustment) = request.adjustment {
            self.adjust_file(&request.input, adjustment)?;
        }

        let output = request
            .output
            .clone()
            .unwrap_or_else(|| output_path_for(&request.input));
        self.watermark_file(&request.input, &output, &request.watermark)?;
        Ok(output)
    }

    /// Process every supported image in a directory with the same
    /// adjustment and watermark, writing outputs into `output_dir`.
    ///
    /// Files are processed in parallel when the `cli` feature is enabled.
    ///
    /// # Panics
    ///
    /// Panics if a directory entry has no filename (not possible for
    /// regular files).
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        adjustment: Option<Adjustment>,
        watermark: &WatermarkSpec,
    ) -> Vec<BatchResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![BatchResult {
                    input: input_dir.to_path_buf(),
                    outcome: Err(Error::Io(e)),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![BatchResult {
                    input: output_dir.to_path_buf(),
                    outcome: Err(Error::Io(e)),
                }];
            }
        }

        let run = |input: &PathBuf| -> BatchResult {
            let derived = output_path_for(input);
            let output = output_dir.join(derived.file_name().unwrap());
            let request = ProcessRequest {
                input: input.clone(),
                adjustment,
                watermark: watermark.clone(),
                output: Some(output),
            };
            BatchResult {
                input: input.clone(),
                outcome: self.process(&request),
            }
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(run).collect()
        }
    }
}

/// Decode an image file into an RGBA buffer.
///
/// # Errors
///
/// Returns [`Error::Decode`] carrying the offending path.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgba8())
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image with format-specific quality settings.
///
/// JPEG output is flattened to RGB and encoded at the given quality;
/// lossless formats ignore the quality knob.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for formats outside the supported
/// set and [`Error::Encode`] when writing fails.
pub fn save_image(img: &RgbaImage, path: &Path, quality: u8) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, quality);
            encoder
                .encode_image(&DynamicImage::ImageRgb8(rgb))
                .map_err(|source| Error::Encode {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            DynamicImage::ImageRgba8(img.clone())
                .save(path)
                .map_err(|source| Error::Encode {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Derive the output path for a watermarked image.
///
/// `photo.jpg` becomes `photo-with-watermark.jpg`, next to the input. The
/// split point is the last dot, so multi-dot names keep their full stem:
/// `a.b.c` becomes `a.b-with-watermark.c`. (The original tool split on the
/// first dot and silently dropped trailing extension segments.)
#[must_use]
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    match input.extension() {
        Some(ext) => parent.join(format!("{stem}{OUTPUT_SUFFIX}.{}", ext.to_string_lossy())),
        None => parent.join(format!("{stem}{OUTPUT_SUFFIX}")),
    }
}
