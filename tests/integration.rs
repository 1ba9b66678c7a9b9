use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use watermark_manager::{
    output_path_for, save_image, Adjustment, Error, ProcessRequest, WatermarkEngine,
    WatermarkSpec, MAX_QUALITY,
};

/// Unique scratch directory per test to keep parallel tests isolated.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("watermark-manager-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &PathBuf, img: &RgbaImage) {
    save_image(img, path, MAX_QUALITY).unwrap();
}

#[test]
fn image_watermark_end_to_end_blends_centered_footprint() {
    let dir = scratch_dir("image-e2e");
    let input = dir.join("base.png");
    let mark_path = dir.join("mark.png");

    write_png(&input, &RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
    write_png(&mark_path, &RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255])));

    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input: input.clone(),
        adjustment: None,
        watermark: WatermarkSpec::Image(mark_path),
        output: None,
    };

    let output = engine.process(&request).unwrap();
    assert_eq!(output, dir.join("base-with-watermark.png"));

    let result = image::open(&output).unwrap().to_rgba8();
    assert_eq!(result.dimensions(), (10, 10));

    // 2x2 mark centered on 10x10 sits at (4, 4)
    for (x, y, px) in result.enumerate_pixels() {
        if (4..6).contains(&x) && (4..6).contains(&y) {
            assert!((i32::from(px[0]) - 128).abs() <= 1, "red at ({x},{y})");
            assert!((i32::from(px[2]) - 128).abs() <= 1, "blue at ({x},{y})");
        } else {
            assert_eq!(*px, Rgba([255, 0, 0, 255]), "bled at ({x},{y})");
        }
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn oversized_image_watermark_is_clipped_not_rejected() {
    let dir = scratch_dir("oversized");
    let input = dir.join("small.png");
    let mark_path = dir.join("big.png");

    write_png(&input, &RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255])));
    write_png(
        &mark_path,
        &RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255])),
    );

    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input,
        adjustment: None,
        watermark: WatermarkSpec::Image(mark_path),
        output: Some(dir.join("out.png")),
    };

    let output = engine.process(&request).unwrap();
    let result = image::open(output).unwrap().to_rgba8();
    assert_eq!(result.dimensions(), (4, 4));
    // Opaque white mark at half opacity over green: red/blue lift to ~128
    for px in result.pixels() {
        assert!((i32::from(px[0]) - 128).abs() <= 1);
        assert!((i32::from(px[2]) - 128).abs() <= 1);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn adjustment_rewrites_source_in_place_before_watermarking() {
    let dir = scratch_dir("adjust-e2e");
    let input = dir.join("base.png");
    let mark_path = dir.join("mark.png");

    write_png(&input, &RgbaImage::from_pixel(6, 6, Rgba([10, 20, 30, 255])));
    write_png(&mark_path, &RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])));

    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input: input.clone(),
        adjustment: Some(Adjustment::Invert),
        watermark: WatermarkSpec::Image(mark_path),
        output: None,
    };
    engine.process(&request).unwrap();

    // The source itself was inverted and re-encoded
    let source = image::open(&input).unwrap().to_rgba8();
    assert_eq!(*source.get_pixel(0, 0), Rgba([245, 235, 225, 255]));

    // The transparent 1x1 mark leaves the watermarked output identical
    let output = image::open(dir.join("base-with-watermark.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(*output.get_pixel(0, 0), Rgba([245, 235, 225, 255]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn text_watermark_end_to_end_darkens_center() {
    let dir = scratch_dir("text-e2e");
    let input = dir.join("base.png");
    write_png(
        &input,
        &RgbaImage::from_pixel(300, 120, Rgba([255, 255, 255, 255])),
    );

    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input,
        adjustment: None,
        watermark: WatermarkSpec::Text("WM".to_string()),
        output: None,
    };

    match engine.process(&request) {
        Ok(output) => {
            let result = image::open(output).unwrap().to_rgba8();
            assert_eq!(result.dimensions(), (300, 120));
            // Black 32px glyphs on white must leave darkened pixels
            assert!(result.pixels().any(|p| p[0] < 128));
            // Corners sit outside the sprite footprint
            assert_eq!(*result.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
            assert_eq!(*result.get_pixel(299, 119), Rgba([255, 255, 255, 255]));
        }
        Err(Error::FontLoad(msg)) => {
            eprintln!("skipping text watermark test, no system font: {msg}");
        }
        Err(other) => panic!("unexpected error: {other}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_surfaces_decode_error() {
    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input: PathBuf::from("/nonexistent/missing.jpg"),
        adjustment: None,
        watermark: WatermarkSpec::Text("x".to_string()),
        output: Some(std::env::temp_dir().join("never-written.jpg")),
    };

    let err = engine.process(&request).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn missing_watermark_image_surfaces_decode_error() {
    let dir = scratch_dir("missing-mark");
    let input = dir.join("base.png");
    write_png(&input, &RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

    let engine = WatermarkEngine::new();
    let request = ProcessRequest {
        input,
        adjustment: None,
        watermark: WatermarkSpec::Image(dir.join("no-such-logo.png")),
        output: None,
    };

    let err = engine.process(&request).unwrap_err();
    match err {
        Error::Decode { path, .. } => assert!(path.ends_with("no-such-logo.png")),
        other => panic!("expected Decode, got {other:?}"),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn batch_mode_processes_directory_into_output_dir() {
    let dir = scratch_dir("batch-in");
    let out_dir = scratch_dir("batch-out");
    let mark_path = dir.join("logo.bmp");

    write_png(
        &dir.join("a.png"),
        &RgbaImage::from_pixel(8, 8, Rgba([50, 50, 50, 255])),
    );
    write_png(
        &dir.join("b.png"),
        &RgbaImage::from_pixel(8, 8, Rgba([50, 50, 50, 255])),
    );
    std::fs::write(dir.join("notes.txt"), "not an image").unwrap();
    save_image(
        &RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])),
        &mark_path,
        MAX_QUALITY,
    )
    .unwrap();

    let engine = WatermarkEngine::new();
    let results =
        engine.process_directory(&dir, &out_dir, None, &WatermarkSpec::Image(mark_path));

    // a.png, b.png, and logo.bmp itself are supported entries; notes.txt is not
    assert_eq!(results.len(), 3);
    for r in &results {
        let output = r.outcome.as_ref().unwrap();
        assert!(output.starts_with(&out_dir));
        assert!(output.exists());
    }
    assert!(out_dir.join("a-with-watermark.png").exists());
    assert!(out_dir.join("b-with-watermark.png").exists());

    let _ = std::fs::remove_dir_all(&dir);
    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn derived_output_name_keeps_full_stem_for_multi_dot_names() {
    let p = output_path_for(std::path::Path::new("a.b.c"));
    assert_eq!(
        p.file_name().unwrap().to_str().unwrap(),
        "a.b-with-watermark.c"
    );
}
