use image::{GrayImage, Rgba, RgbaImage};

/// Turn a binary ink mask into black ink on a transparent background
/// Colour channels are always zero; the mask becomes the alpha channel
pub fn from_mask(mask: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        Rgba([0, 0, 0, mask.get_pixel(x, y).0[0]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_mask_becomes_alpha() {
        let mut mask = GrayImage::new(4, 3);
        mask.put_pixel(1, 1, Luma([255]));

        let rgba = from_mask(&mask);

        assert_eq!(rgba.dimensions(), (4, 3));
        assert_eq!(rgba.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert!(rgba.pixels().all(|p| p.0[..3] == [0, 0, 0]));
    }
}
