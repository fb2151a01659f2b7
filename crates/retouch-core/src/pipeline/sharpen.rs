//! Fixed 3x3 sharpening convolution.

use image::RgbImage;

use crate::config::SharpenConfig;
use crate::math::{clamp_to_u8, reflect_101};

/// Convolve each channel with the configured 3x3 kernel.
///
/// Borders are reflect-101 mirrored. Sums are integer and clamped to
/// `0..=255`, so the output is always a valid 8-bit image of the same size.
#[must_use = "returns the sharpened image"]
pub fn sharpen(image: &RgbImage, config: &SharpenConfig) -> RgbImage {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return image.clone();
    }

    RgbImage::from_fn(width, height, |x, y| {
        let mut acc = [0i32; 3];
        for (ky, row) in config.kernel.iter().enumerate() {
            let sy = reflect_101(y as isize + ky as isize - 1, h) as u32;
            for (kx, &k) in row.iter().enumerate() {
                if k == 0 {
                    continue;
                }
                let sx = reflect_101(x as isize + kx as isize - 1, w) as u32;
                let pixel = image.get_pixel(sx, sy).0;
                for c in 0..3 {
                    acc[c] += k * i32::from(pixel[c]);
                }
            }
        }
        image::Rgb(acc.map(clamp_to_u8))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient() -> RgbImage {
        RgbImage::from_fn(8, 6, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 128]))
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let image = RgbImage::from_pixel(10, 10, Rgb([17, 99, 240]));
        assert_eq!(sharpen(&image, &SharpenConfig::default()), image);
    }

    #[test]
    fn test_preserves_dimensions() {
        let image = gradient();
        assert_eq!(sharpen(&image, &SharpenConfig::default()).dimensions(), (8, 6));
    }

    #[test]
    fn test_not_idempotent() {
        let image = gradient();
        let config = SharpenConfig::default();
        let once = sharpen(&image, &config);
        let twice = sharpen(&once, &config);
        assert_ne!(once, twice);
    }

    #[test]
    fn test_clamps_extremes() {
        // A bright dot on black overshoots to 5*255 at the center and
        // undershoots to -255 around it.
        let mut image = RgbImage::new(5, 5);
        image.put_pixel(2, 2, Rgb([255, 255, 255]));
        let out = sharpen(&image, &SharpenConfig::default());
        assert_eq!(out.get_pixel(2, 2).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(1, 2).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_known_center_value() {
        // center 100, cross neighbors 50 -> 5*100 - 4*50 = 300 -> clamped 255;
        // center 60 -> 300 - 200 = 100.
        let mut image = RgbImage::from_pixel(3, 3, Rgb([50, 50, 50]));
        image.put_pixel(1, 1, Rgb([100, 60, 50]));
        let out = sharpen(&image, &SharpenConfig::default());
        assert_eq!(out.get_pixel(1, 1).0, [255, 100, 50]);
    }

    #[test]
    fn test_identity_kernel() {
        let config = SharpenConfig {
            kernel: [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
        };
        let image = gradient();
        assert_eq!(sharpen(&image, &config), image);
    }

    #[test]
    fn test_reflect_border() {
        // Left column 10, everything else 20. At x=0 the mirrored left
        // neighbor is x=1 (20): 5*10 - 20 - 20 - 10 - 10 = -10 -> 0.
        let image = RgbImage::from_fn(4, 3, |x, _| if x == 0 { Rgb([10; 3]) } else { Rgb([20; 3]) });
        let out = sharpen(&image, &SharpenConfig::default());
        assert_eq!(out.get_pixel(0, 1).0, [0, 0, 0]);
    }
}
