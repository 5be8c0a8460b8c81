//! Grey-level morphology with rectangular structuring elements
//!
//! The anchor sits at `(width / 2, height / 2)`. Samples falling outside the
//! image are ignored, so borders never erode or grow regions on their own.

use crate::config::Size;
use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

/// Largest side accepted for a structuring element
pub const MAX_KERNEL_SIDE: u32 = 255;

/// Filled rectangle anchored at its centre
fn rectangle(kernel: Size) -> Mask {
    let element = GrayImage::from_pixel(kernel.width, kernel.height, Luma([255]));
    Mask::from_image(
        &element,
        (kernel.width / 2) as u8,
        (kernel.height / 2) as u8,
    )
}

/// Grow bright regions: each pixel becomes the maximum under the element
pub fn dilate(image: &GrayImage, kernel: Size, iterations: u32) -> GrayImage {
    let mask = rectangle(kernel);
    repeat(image, iterations, |img| grayscale_dilate(img, &mask))
}

/// Shrink bright regions: each pixel becomes the minimum under the element
pub fn erode(image: &GrayImage, kernel: Size, iterations: u32) -> GrayImage {
    let mask = rectangle(kernel);
    repeat(image, iterations, |img| grayscale_erode(img, &mask))
}

/// `iterations` erosions followed by as many dilations with the same element
/// Removes bright specks smaller than the element
pub fn open(image: &GrayImage, kernel: Size, iterations: u32) -> GrayImage {
    let mask = rectangle(kernel);
    let eroded = repeat(image, iterations, |img| grayscale_erode(img, &mask));
    repeat(&eroded, iterations, |img| grayscale_dilate(img, &mask))
}

fn repeat<F>(image: &GrayImage, iterations: u32, op: F) -> GrayImage
where
    F: Fn(&GrayImage) -> GrayImage,
{
    let mut current = image.clone();
    for _ in 0..iterations {
        current = op(&current);
    }
    current
}
