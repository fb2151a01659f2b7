//! Bilateral color denoising.
//!
//! Each channel sample becomes a weighted mean of its neighbourhood, where a
//! neighbour's weight falls off both with distance and with how far its
//! value is from the centre's. Flat areas are smoothed; edges whose step is
//! well above `range_sigma` survive.

use image::{Rgb, RgbImage};

use crate::config::DenoiseConfig;
use crate::error::PipelineError;
use crate::math::{reflect_101, round_to_u8};
use crate::types::StageKind;

use super::cancel::CancelToken;

/// Bilateral-filter `image` using `config.spatial_radius` and
/// `config.range_sigma`. Borders are reflect-101 mirrored.
///
/// Polls `cancel` once per output row.
pub fn bilateral(
    image: &RgbImage,
    config: &DenoiseConfig,
    cancel: &CancelToken,
) -> Result<RgbImage, PipelineError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }
    let (w, h) = (width as usize, height as usize);

    let radius = config.spatial_radius as isize;
    let spatial = spatial_weights(config.spatial_radius);
    let range = range_weights(config.range_sigma);
    let side = (2 * radius + 1) as usize;

    let mut out = RgbImage::new(width, height);
    for y in 0..h {
        cancel.check(StageKind::Denoise)?;
        for x in 0..w {
            let center = image.get_pixel(x as u32, y as u32).0;
            let mut sum = [0.0f32; 3];
            let mut norm = [0.0f32; 3];

            for dy in -radius..=radius {
                let sy = reflect_101(y as isize + dy, h) as u32;
                for dx in -radius..=radius {
                    let sx = reflect_101(x as isize + dx, w) as u32;
                    let neighbour = image.get_pixel(sx, sy).0;
                    let ws = spatial[(dy + radius) as usize * side + (dx + radius) as usize];
                    for c in 0..3 {
                        let wr = range[center[c].abs_diff(neighbour[c]) as usize];
                        sum[c] += ws * wr * f32::from(neighbour[c]);
                        norm[c] += ws * wr;
                    }
                }
            }

            // The centre always contributes weight 1, so `norm` is never zero.
            let pixel: [u8; 3] = std::array::from_fn(|c| round_to_u8(sum[c] / norm[c]));
            out.put_pixel(x as u32, y as u32, Rgb(pixel));
        }
    }
    Ok(out)
}

/// Gaussian weights over the `(2r+1)²` window with sigma `r`, row-major.
fn spatial_weights(radius: u32) -> Vec<f32> {
    let r = radius as i32;
    let two_sigma2 = 2.0 * (radius as f32).powi(2);
    (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .map(|(dx, dy)| (-((dx * dx + dy * dy) as f32) / two_sigma2).exp())
        .collect()
}

/// Gaussian weight for every possible 8-bit difference.
fn range_weights(sigma: f32) -> [f32; 256] {
    let two_sigma2 = 2.0 * sigma * sigma;
    std::array::from_fn(|d| (-((d * d) as f32) / two_sigma2).exp())
}
