//! PNG encoding of pipeline output.

use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::PipelineError;

/// Encodes finished images for the response body.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngEncoder;

impl PngEncoder {
    /// Encode an RGB image as PNG bytes.
    pub fn encode(&self, image: &RgbImage) -> Result<Vec<u8>, PipelineError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| PipelineError::Encode {
                message: e.to_string(),
            })?;
        Ok(buffer.into_inner())
    }

    /// MIME type of the encoded output.
    pub fn content_type(&self) -> &'static str {
        "image/png"
    }
}
