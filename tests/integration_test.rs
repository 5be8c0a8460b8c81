use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use signature_extract::batch::{self, BatchOptions};
use signature_extract::{ExtractError, ExtractorConfig, SignatureExtractor};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const INK: Rgb<u8> = Rgb([30, 28, 40]);

/// Off-white paper
fn blank_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([250, 250, 248]))
}

/// Cursive-like mark roughly 200x80 px whose top-left corner is at `origin`
fn draw_signature(page: &mut RgbImage, origin: (i32, i32)) {
    let (ox, oy) = origin;
    // Main wavy stroke
    for i in 0..196 {
        let y = oy + 40 + (30.0 * (i as f32 / 13.0).sin()) as i32;
        draw_filled_circle_mut(page, (ox + 2 + i, y), 3, INK);
    }
    // Flourish underneath, a few pixels clear of the main stroke
    for i in 0..120 {
        let y = oy + 82 + (2.0 * (i as f32 / 20.0).sin()) as i32;
        draw_filled_circle_mut(page, (ox + 40 + i, y), 2, INK);
    }
}

fn signed_page() -> RgbImage {
    let mut page = blank_page(1000, 1400);
    draw_signature(&mut page, (300, 560));
    page
}

fn extractor() -> SignatureExtractor {
    SignatureExtractor::new(ExtractorConfig::default()).unwrap()
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_signature-extract"))
        .args(args)
        .output()
        .expect("Failed to run signature-extract")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

fn write_jpeg(path: &Path, page: &RgbImage) {
    DynamicImage::ImageRgb8(page.clone())
        .save_with_format(path, ImageFormat::Jpeg)
        .expect("Failed to write fixture");
}

#[test]
fn test_signed_page_produces_fixed_size_rgba() {
    let page = DynamicImage::ImageRgb8(signed_page());
    let extraction = extractor().extract(&page).unwrap();
    let image = &extraction.image;

    assert_eq!(image.dimensions(), (300, 100));
    assert!(image.pixels().all(|p| p.0[..3] == [0, 0, 0]));

    // Alpha coverage spans the output like the mark spans its crop
    let covered: Vec<(u32, u32)> = image
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!covered.is_empty());
    let min_x = covered.iter().map(|c| c.0).min().unwrap();
    let max_x = covered.iter().map(|c| c.0).max().unwrap();
    let min_y = covered.iter().map(|c| c.1).min().unwrap();
    let max_y = covered.iter().map(|c| c.1).max().unwrap();
    assert!(max_x - min_x >= 180, "alpha spans x {}..{}", min_x, max_x);
    assert!(max_y - min_y >= 50, "alpha spans y {}..{}", min_y, max_y);
}

#[test]
fn test_ink_region_matches_mark_and_stays_inside_coarse_region() {
    let page = DynamicImage::ImageRgb8(signed_page());
    let extraction = extractor().extract(&page).unwrap();
    let ink = extraction.ink_region;

    assert!(extraction.coarse_region.contains(&ink));
    // Mark covers roughly x 300..500, y 560..640 plus 20 px of padding
    assert!((270..=300).contains(&ink.x), "{:?}", ink);
    assert!((500..=530).contains(&ink.right()), "{:?}", ink);
    assert!((530..=570).contains(&ink.y), "{:?}", ink);
    assert!((640..=680).contains(&ink.bottom()), "{:?}", ink);
}

#[test]
fn test_extraction_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.png");
    signed_page().save(&input).unwrap();
    let first = dir.path().join("first.png");
    let second = dir.path().join("second.png");

    let extractor = extractor();
    batch::extract_file(&extractor, &input, &first).unwrap();
    batch::extract_file(&extractor, &input, &second).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_written_png_keeps_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.jpg");
    write_jpeg(&input, &signed_page());
    let output = dir.path().join("page_signature.png");

    batch::extract_file(&extractor(), &input, &output).unwrap();

    let written = image::open(&output).unwrap();
    assert_eq!(written.color(), image::ColorType::Rgba8);
    assert_eq!((written.width(), written.height()), (300, 100));
}

#[test]
fn test_white_page_reports_no_signature() {
    let page = DynamicImage::ImageRgb8(RgbImage::from_pixel(500, 500, Rgb([255, 255, 255])));
    let result = extractor().extract(&page);
    assert!(matches!(result, Err(ExtractError::NoSignatureFound)));
}

#[test]
fn test_cli_extract_white_page_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("white.png");
    RgbImage::from_pixel(500, 500, Rgb([255, 255, 255]))
        .save(&input)
        .unwrap();
    let output = dir.path().join("white_signature.png");

    let result = run_cli(&["extract", path_arg(&input), path_arg(&output)]);

    assert!(!result.status.success());
    assert!(!output.exists());
    let logs = String::from_utf8_lossy(&result.stdout);
    assert!(logs.contains("No signature found in"), "{}", logs);
    assert!(logs.contains("white.png"), "{}", logs);
}

#[test]
fn test_cli_extract_single_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("contract.jpg");
    write_jpeg(&input, &signed_page());
    let output = dir.path().join("contract.png");

    let result = run_cli(&[
        "extract",
        path_arg(&input),
        path_arg(&output),
        "--output-size",
        "150x50",
    ]);

    assert!(result.status.success(), "{:?}", result);
    let written = image::open(&output).unwrap();
    assert_eq!((written.width(), written.height()), (150, 50));
}

#[test]
fn test_cli_batch_skips_blank_pages() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("input_images");
    let output_dir: PathBuf = dir.path().join("nested").join("output_signatures");
    fs::create_dir(&input_dir).unwrap();

    write_jpeg(&input_dir.join("alpha.jpg"), &signed_page());
    let mut second = blank_page(900, 700);
    draw_signature(&mut second, (500, 300));
    write_jpeg(&input_dir.join("bravo.jpg"), &second);
    write_jpeg(&input_dir.join("charlie.jpg"), &blank_page(600, 800));
    // Not matched by the default pattern
    signed_page().save(input_dir.join("delta.png")).unwrap();

    let result = run_cli(&[
        "batch",
        path_arg(&input_dir),
        path_arg(&output_dir),
        "--report",
    ]);
    assert!(result.status.success(), "{:?}", result);

    let mut produced: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    produced.sort();
    assert_eq!(produced, ["alpha_signature.png", "bravo_signature.png"]);

    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("No signature found in"), "{}", stdout);
    assert!(stdout.contains("charlie.jpg"), "{}", stdout);
    assert!(stdout.contains("\"succeeded\": 2"), "{}", stdout);
    assert!(stdout.contains("\"failed\": 1"), "{}", stdout);
}

#[test]
fn test_batch_library_report() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("scans");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir).unwrap();

    signed_page().save(input_dir.join("one.png")).unwrap();
    blank_page(400, 400).save(input_dir.join("two.png")).unwrap();
    fs::write(input_dir.join("three.png"), b"not an image").unwrap();

    let options = BatchOptions {
        pattern: "*.png".to_string(),
        ..Default::default()
    };
    let report = batch::process_folder(&extractor(), &input_dir, &output_dir, &options).unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);

    let codes: Vec<&str> = report.files.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, ["OK", "DECODE_ERROR", "NO_SIGNATURE"]);
    assert!(output_dir.join("one_signature.png").exists());
    assert!(!output_dir.join("two_signature.png").exists());
}
