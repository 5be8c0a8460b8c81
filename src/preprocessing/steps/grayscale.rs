use image::{GrayImage, RgbImage};

/// Convert a colour page or crop to a single luminance channel
/// This is the foundation for most other steps
pub fn apply(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}
