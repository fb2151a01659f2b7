//! Non-local-means color denoising.
//!
//! Every output pixel is a weighted average of the pixels in its search
//! window. A candidate's weight depends on how similar the patch around it is
//! to the patch around the pixel being filtered, so repeated texture
//! elsewhere in the window contributes while unrelated structure does not.
//!
//! The image is filtered in BT.601 YCbCr so luminance and chroma get
//! independent strengths. Patch distances are the mean squared difference
//! over all three channels; channel `c` then uses weight `exp(-d² / h_c²)`.
//!
//! Per search offset, the squared-difference image is box-summed over the
//! template with an integral image, so cost is independent of template size.
//!
//! The search loop polls a [`CancelToken`] once per offset, so an abandoned
//! run stops within one pass over the image.

use image::RgbImage;

use crate::config::DenoiseConfig;
use crate::error::PipelineError;
use crate::math::{reflect_101, round_to_u8};
use crate::types::StageKind;

use super::cancel::CancelToken;

/// Denoise an RGB image with the given non-local-means parameters.
///
/// Deterministic: identical input and parameters give identical output.
/// Uniform images are returned unchanged.
pub fn denoise(
    image: &RgbImage,
    config: &DenoiseConfig,
    cancel: &CancelToken,
) -> Result<RgbImage, PipelineError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }
    let (w, h) = (width as usize, height as usize);

    let search_radius = (config.search_window / 2) as usize;
    let template_radius = (config.template_window / 2) as usize;
    let pad = search_radius + template_radius;

    let padded = PaddedYcc::new(image, pad);
    let inv_h2 = [
        1.0 / (config.strength * config.strength),
        1.0 / (config.color_strength * config.color_strength),
        1.0 / (config.color_strength * config.color_strength),
    ];
    let template_area = (config.template_window * config.template_window) as f64;
    let norm = 1.0 / (template_area * 3.0);

    // The squared-difference image covers the output plus a template-radius
    // margin so every template box lies inside it.
    let dw = w + 2 * template_radius;
    let dh = h + 2 * template_radius;
    let mut integral = vec![0.0f64; (dw + 1) * (dh + 1)];

    let mut sums = vec![[0.0f32; 3]; w * h];
    let mut weights = vec![[0.0f32; 3]; w * h];

    let sr = search_radius as isize;
    for dy in -sr..=sr {
        for dx in -sr..=sr {
            cancel.check(StageKind::Denoise)?;

            // Integral image of per-pixel squared differences at this offset.
            for y in 0..dh {
                let mut row_sum = 0.0f64;
                // Padded coordinates of the margin origin.
                let py = y + pad - template_radius;
                for x in 0..dw {
                    let px = x + pad - template_radius;
                    let a = padded.get(px, py);
                    let b = padded.get(offset(px, dx), offset(py, dy));
                    let diff = (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2);
                    row_sum += f64::from(diff);
                    integral[(y + 1) * (dw + 1) + x + 1] = integral[y * (dw + 1) + x + 1] + row_sum;
                }
            }

            let side = 2 * template_radius + 1;
            for y in 0..h {
                for x in 0..w {
                    let box_sum = integral[(y + side) * (dw + 1) + x + side]
                        - integral[y * (dw + 1) + x + side]
                        - integral[(y + side) * (dw + 1) + x]
                        + integral[y * (dw + 1) + x];
                    let d2 = (box_sum.max(0.0) * norm) as f32;

                    let candidate = padded.get(offset(x + pad, dx), offset(y + pad, dy));
                    let idx = y * w + x;
                    for c in 0..3 {
                        let weight = (-d2 * inv_h2[c]).exp();
                        sums[idx][c] += weight * candidate[c];
                        weights[idx][c] += weight;
                    }
                }
            }
        }
    }

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let idx = y as usize * w + x as usize;
        let ycc = [
            sums[idx][0] / weights[idx][0],
            sums[idx][1] / weights[idx][1],
            sums[idx][2] / weights[idx][2],
        ];
        image::Rgb(ycc_to_rgb(ycc))
    }))
}

/// Apply a signed search offset to a padded coordinate.
///
/// Padding is at least the search radius, so the result is never negative.
fn offset(base: usize, delta: isize) -> usize {
    (base as isize + delta) as usize
}

/// The source image in YCbCr, mirrored out by `pad` pixels on every side.
struct PaddedYcc {
    data: Vec<[f32; 3]>,
    stride: usize,
}

impl PaddedYcc {
    fn new(image: &RgbImage, pad: usize) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 2 * pad;
        let rows = h + 2 * pad;
        let mut data = Vec::with_capacity(stride * rows);
        for py in 0..rows {
            let sy = reflect_101(py as isize - pad as isize, h);
            for px in 0..stride {
                let sx = reflect_101(px as isize - pad as isize, w);
                data.push(rgb_to_ycc(image.get_pixel(sx as u32, sy as u32).0));
            }
        }
        Self { data, stride }
    }

    fn get(&self, x: usize, y: usize) -> [f32; 3] {
        self.data[y * self.stride + x]
    }
}

fn rgb_to_ycc([r, g, b]: [u8; 3]) -> [f32; 3] {
    let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
    [
        0.299 * r + 0.587 * g + 0.114 * b,
        128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b,
        128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b,
    ]
}

fn ycc_to_rgb([y, cb, cr]: [f32; 3]) -> [u8; 3] {
    let (cb, cr) = (cb - 128.0, cr - 128.0);
    [
        round_to_u8(y + 1.402 * cr),
        round_to_u8(y - 0.344_136 * cb - 0.714_136 * cr),
        round_to_u8(y + 1.772 * cb),
    ]
}
