//! Unsharp masking.

use image::imageops;
use image::{Rgb, RgbImage};

use crate::config::UnsharpConfig;
use crate::math::round_to_u8;

/// Add `amount` times the difference between `image` and a Gaussian blur of
/// it, skipping samples whose difference is within `threshold`.
#[must_use = "returns the sharpened image"]
pub fn unsharp_mask(image: &RgbImage, config: &UnsharpConfig) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let blurred = imageops::blur(image, config.sigma);
    let threshold = i32::from(config.threshold);

    RgbImage::from_fn(width, height, |x, y| {
        let original = image.get_pixel(x, y).0;
        let blur = blurred.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| {
            let diff = i32::from(original[c]) - i32::from(blur[c]);
            if diff.abs() > threshold {
                round_to_u8(f32::from(original[c]) + diff as f32 * config.amount)
            } else {
                original[c]
            }
        }))
    })
}
