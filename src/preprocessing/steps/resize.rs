use crate::config::{Size, UpscaleFilter};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Resample the signature to the output size
///
/// Shrinking in both axes averages every source pixel covered by a target
/// pixel (area interpolation), which keeps thin strokes from aliasing away.
/// Any enlargement falls back to the configured interpolation filter.
pub fn apply(image: &RgbaImage, target: Size, upscale: UpscaleFilter) -> RgbaImage {
    let (width, height) = image.dimensions();
    if (width, height) == (target.width, target.height) {
        return image.clone();
    }

    if target.width <= width && target.height <= height {
        area_resample(image, target)
    } else {
        imageops::resize(image, target.width, target.height, FilterType::from(upscale))
    }
}

/// Source indices and normalized coverage weights for each target index
fn coverage(src: u32, dst: u32) -> Vec<Vec<(u32, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|d| {
            let start = d as f64 * scale;
            let end = (d + 1) as f64 * scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(s as f64 + 1.0) - start.max(s as f64);
                    (overlap > 1e-9).then_some((s, overlap / scale))
                })
                .collect()
        })
        .collect()
}

fn area_resample(image: &RgbaImage, target: Size) -> RgbaImage {
    let xs = coverage(image.width(), target.width);
    let ys = coverage(image.height(), target.height);

    RgbaImage::from_fn(target.width, target.height, |x, y| {
        let mut acc = [0.0f64; 4];
        for &(sy, wy) in &ys[y as usize] {
            for &(sx, wx) in &xs[x as usize] {
                let p = image.get_pixel(sx, sy).0;
                for (a, &c) in acc.iter_mut().zip(p.iter()) {
                    *a += c as f64 * wx * wy;
                }
            }
        }
        Rgba(acc.map(|v| v.round().clamp(0.0, 255.0) as u8))
    })
}
