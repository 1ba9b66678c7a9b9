//! Apply pixel adjustments and text/image watermarks to image files.
//!
//! The pipeline has two stateless stages over an in-memory RGBA buffer:
//! an adjustment engine (brighten, contrast, greyscale, invert) that rewrites
//! the source file in place, and a watermark compositor that centers either a
//! rasterized text string or a second image over the source and writes the
//! result to a `{name}-with-watermark.{ext}` sibling at maximum quality.
//!
//! # Quick Start
//!
//! ```no_run
//! use watermark_manager::{ProcessRequest, WatermarkEngine, WatermarkSpec};
//!
//! let engine = WatermarkEngine::new();
//! let request = ProcessRequest {
//!     input: "photo.jpg".into(),
//!     adjustment: Some("make image brighter".parse().unwrap()),
//!     watermark: WatermarkSpec::Text("hello!".to_string()),
//!     output: None,
//! };
//! let written = engine.process(&request).expect("pipeline failed");
//! println!("wrote {}", written.display());
//! ```
//!
//! # Image watermarks
//!
//! An image watermark is blended centered over the base with the standard
//! source-over operator at a fixed half opacity. Marks larger than the base
//! are clipped rather than rejected.
//!
//! ```no_run
//! use watermark_manager::{ProcessRequest, WatermarkEngine, WatermarkSpec};
//!
//! let engine = WatermarkEngine::new();
//! let request = ProcessRequest {
//!     input: "photo.jpg".into(),
//!     adjustment: None,
//!     watermark: WatermarkSpec::Image("logo.png".into()),
//!     output: None,
//! };
//! engine.process(&request).expect("pipeline failed");
//! ```

#![deny(missing_docs)]

pub mod adjust;
pub mod compose;
mod engine;
pub mod error;
pub mod text;

pub use adjust::Adjustment;
pub use engine::{
    is_supported_image, load_image, output_path_for, save_image, BatchResult, ProcessRequest,
    WatermarkEngine, WatermarkSpec, MAX_QUALITY,
};
pub use error::{Error, Result};
pub use text::FontHandle;
