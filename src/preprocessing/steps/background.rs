use super::morphology;
use crate::config::Size;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::stretch_contrast;
use imageproc::filter::median_filter;

/// Flatten uneven page illumination
///
/// For each colour plane the paper background is estimated by a grey dilation
/// (which swallows thin dark strokes) followed by a wide median blur. The plane
/// is replaced by `255 - |plane - background|` and stretched to the full range,
/// so paper ends up near white and ink keeps its contrast.
pub fn apply(image: &RgbImage, kernel: Size, median_size: u32) -> RgbImage {
    let radius = median_size / 2;
    let planes: Vec<GrayImage> = (0..3)
        .map(|c| {
            let plane = GrayImage::from_fn(image.width(), image.height(), |x, y| {
                Luma([image.get_pixel(x, y).0[c]])
            });
            correct_plane(&plane, kernel, radius)
        })
        .collect();

    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb([
            planes[0].get_pixel(x, y).0[0],
            planes[1].get_pixel(x, y).0[0],
            planes[2].get_pixel(x, y).0[0],
        ])
    })
}

fn correct_plane(plane: &GrayImage, kernel: Size, radius: u32) -> GrayImage {
    let dilated = morphology::dilate(plane, kernel, 1);
    let background = median_filter(&dilated, radius, radius);

    let flattened = GrayImage::from_fn(plane.width(), plane.height(), |x, y| {
        let p = plane.get_pixel(x, y).0[0];
        let b = background.get_pixel(x, y).0[0];
        Luma([255 - p.abs_diff(b)])
    });

    let (lo, hi) = flattened
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p.0[0]), hi.max(p.0[0])));
    if hi <= lo {
        return flattened;
    }
    stretch_contrast(&flattened, lo, hi, 0, 255)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_gradient_and_keeps_ink() {
        // Paper darkening from left to right with a thin stroke across it
        let mut img = RgbImage::from_fn(80, 60, |x, _| {
            let v = (250 - x) as u8;
            Rgb([v, v, v])
        });
        for x in 10..70 {
            for y in 29..32 {
                img.put_pixel(x, y, Rgb([30, 30, 30]));
            }
        }

        let corrected = apply(&img, Size::new(7, 7), 23);

        assert_eq!(corrected.dimensions(), (80, 60));
        // Paper on both sides of the gradient ends up bright
        assert!(corrected.get_pixel(5, 5).0[0] > 200);
        assert!(corrected.get_pixel(75, 50).0[0] > 200);
        // Ink stays dark
        assert!(corrected.get_pixel(40, 30).0[0] < 100);
    }

    #[test]
    fn test_plane_is_stretched_to_full_range() {
        let mut plane = GrayImage::from_pixel(60, 60, Luma([180]));
        for x in 20..40 {
            plane.put_pixel(x, 30, Luma([90]));
        }

        let corrected = correct_plane(&plane, Size::new(7, 7), 11);
        let min = corrected.pixels().map(|p| p.0[0]).min().unwrap();
        let max = corrected.pixels().map(|p| p.0[0]).max().unwrap();

        assert_eq!((min, max), (0, 255));
        assert_eq!(corrected.get_pixel(30, 30).0[0], 0);
        assert_eq!(corrected.get_pixel(5, 5).0[0], 255);
    }

    #[test]
    fn test_uniform_page_is_unchanged_in_shape() {
        let img = RgbImage::from_pixel(30, 30, Rgb([240, 240, 240]));
        let corrected = apply(&img, Size::new(7, 7), 23);
        let first = *corrected.get_pixel(0, 0);
        assert!(corrected.pixels().all(|p| *p == first));
    }
}
