//! Integer-factor upscaling.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::config::UpscaleFilter;
use crate::error::PipelineError;
use crate::types::{StageKind, UpscaleFactor};

impl UpscaleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resize `image` by `factor` with the given resampling filter.
///
/// `X1` returns the input unchanged. Output dimensions are exactly the input
/// dimensions times the factor.
pub fn upscale(
    image: RgbImage,
    factor: UpscaleFactor,
    filter: UpscaleFilter,
) -> Result<RgbImage, PipelineError> {
    let multiplier = factor.multiplier();
    if multiplier == 1 {
        return Ok(image);
    }

    let (width, height) = image.dimensions();
    let overflow = || PipelineError::Stage {
        stage: StageKind::Upscale.to_string(),
        message: format!("{}x{} times {} overflows", width, height, multiplier),
    };
    let new_width = width.checked_mul(multiplier).ok_or_else(overflow)?;
    let new_height = height.checked_mul(multiplier).ok_or_else(overflow)?;

    Ok(imageops::resize(
        &image,
        new_width,
        new_height,
        filter.filter_type(),
    ))
}
