use image::{GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::filter::separable_filter_equal;

/// Global inverted binarization
/// Pixels at or below `level` (ink) become 255, everything brighter becomes 0
pub fn binary_inverted(gray: &GrayImage, level: u8) -> GrayImage {
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Inverted adaptive thresholding against a Gaussian-weighted local mean
///
/// A pixel is foreground (255) when it is at least `c` levels darker than the
/// weighted mean of its `block_size` x `block_size` neighbourhood. Borders are
/// handled by replicating edge pixels. `block_size` must be odd.
pub fn adaptive_gaussian_inverted(gray: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let kernel = gaussian_kernel(block_size);
    let mean = separable_filter_equal(gray, &kernel);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y).0[0] as i32;
        let local = mean.get_pixel(x, y).0[0] as i32;
        if pixel - local <= -c {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Normalized 1D Gaussian of `size` taps with sigma derived from the size
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let scale = -0.5 / (sigma * sigma);
    let center = (size as f32 - 1.0) * 0.5;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}
