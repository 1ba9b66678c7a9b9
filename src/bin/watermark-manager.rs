use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser};

use watermark_manager::{
    Adjustment, BatchResult, Error, ProcessRequest, WatermarkEngine, WatermarkSpec,
};

#[derive(Parser)]
#[command(
    name = "watermark-manager",
    about = "Apply pixel adjustments and text/image watermarks to image files",
    version,
    after_help = "Simple usage: watermark-manager photo.jpg --text \"hello\"\n\n\
                  The result is written next to the input as {name}-with-watermark.{ext}.\n\
                  An --adjust edit re-encodes the INPUT file in place before watermarking."
)]
#[command(group(ArgGroup::new("watermark").required(true).args(["text", "mark"])))]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Text to rasterize centered over the image (32px black)
    #[arg(short, long)]
    text: Option<String>,

    /// Watermark image blended centered at half opacity
    #[arg(short, long)]
    mark: Option<PathBuf>,

    /// Pixel adjustment applied to the input first: "make image brighter",
    /// "increase contrast", "make image b&w", or "invert image"
    #[arg(short, long)]
    adjust: Option<String>,

    /// Output file (or directory in batch mode); default: {name}-with-watermark.{ext}
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Font file for text watermarks (default: system sans-serif)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,

    /// Print full error details instead of the short summary
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let adjustment = match &cli.adjust {
        Some(keyword) => match keyword.parse::<Adjustment>() {
            Ok(a) => Some(a),
            Err(e) => {
                eprintln!("Error: {e}");
                eprintln!(
                    "Supported adjustments: \"make image brighter\", \"increase contrast\", \
                     \"make image b&w\", \"invert image\""
                );
                process::exit(1);
            }
        },
        None => None,
    };

    let watermark = if let Some(text) = cli.text.clone() {
        if text.is_empty() {
            eprintln!("Error: Watermark text must not be empty");
            process::exit(1);
        }
        WatermarkSpec::Text(text)
    } else if let Some(mark) = cli.mark.clone() {
        if !mark.exists() {
            eprintln!("Error: Watermark image does not exist: {}", mark.display());
            process::exit(1);
        }
        WatermarkSpec::Image(mark)
    } else {
        // clap's group requirement makes this unreachable
        eprintln!("Error: Either --text or --mark is required");
        process::exit(1);
    };

    let engine = match &cli.font {
        Some(path) => WatermarkEngine::with_font_path(path.clone()),
        None => WatermarkEngine::new(),
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let results = if input_path.is_dir() {
        let Some(output_dir) = cli.output.clone() else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: watermark-manager <input_dir> --text \"...\" -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, adjustment, &watermark)
    } else {
        let request = ProcessRequest {
            input: input_path.to_path_buf(),
            adjustment,
            watermark,
            output: cli.output.clone(),
        };
        vec![BatchResult {
            input: input_path.to_path_buf(),
            outcome: engine.process(&request),
        }]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &cli);
        if r.outcome.is_ok() {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn print_result(result: &BatchResult, cli: &Cli) {
    let filename = result.input.file_name().map_or_else(
        || result.input.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    match &result.outcome {
        Ok(output) => {
            if !cli.quiet {
                eprintln!("[OK] {filename} -> {}", output.display());
            }
        }
        Err(e) => {
            eprintln!("Something went wrong... Try again.");
            if cli.verbose {
                eprintln!("[FAIL] {filename}: {e}");
            } else {
                eprintln!("[FAIL] {filename}: {}", error_kind(e));
            }
        }
    }
}

/// Short per-kind summary for non-verbose failure output.
fn error_kind(e: &Error) -> &'static str {
    match e {
        Error::Decode { .. } => "could not decode image",
        Error::Encode { .. } => "could not write output",
        Error::FontLoad(_) => "could not load font",
        Error::UnsupportedAdjustment(_) => "unsupported adjustment",
        Error::EmptyWatermarkText => "watermark text is empty",
        Error::UnsupportedFormat(_) => "unsupported image format",
        Error::Io(_) => "I/O error",
    }
}
