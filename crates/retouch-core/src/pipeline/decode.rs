//! Image decoding with format detection, dimension limits, and timeout support.
//!
//! Dimensions come from the format header and are checked before any pixel
//! buffer is allocated, so an oversized image costs a header parse, not a
//! full decode.

use image::{DynamicImage, ImageDecoder as _, ImageFormat, RgbImage};
use std::io::Cursor;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an upload.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded pixels, converted to 8-bit RGB
    pub image: RgbImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory upload on a blocking thread, bounded by the
    /// configured decode timeout.
    pub async fn decode_from_bytes(&self, bytes: Vec<u8>) -> Result<DecodedImage, PipelineError> {
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);
        let max_dimension = self.limits.max_image_dimension;

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(bytes, max_dimension))
                .await
        })
        .await;

        match decode_result {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(PipelineError::Decode {
                message: format!("Task join error: {}", e),
            }),
            Err(_) => Err(PipelineError::Timeout {
                stage: "decode".to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    ///
    /// Fails with [`PipelineError::ImageTooLarge`] when the header declares a
    /// side longer than `max_dimension`, before decoding pixels.
    pub fn decode_bytes_sync(
        bytes: Vec<u8>,
        max_dimension: u32,
    ) -> Result<DecodedImage, PipelineError> {
        let decode_error = |e: image::ImageError| PipelineError::Decode {
            message: e.to_string(),
        };

        let mut reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = reader.format().ok_or_else(|| PipelineError::Decode {
            message: "Unrecognized image format".to_string(),
        })?;

        // The dimension check below replaces the reader's generic allocation
        // cap, which would otherwise report large images as decode errors.
        reader.no_limits();
        let decoder = reader.into_decoder().map_err(decode_error)?;
        let (width, height) = decoder.dimensions();
        if width > max_dimension || height > max_dimension {
            return Err(PipelineError::ImageTooLarge {
                width,
                height,
                max_dim: max_dimension,
            });
        }

        let image = DynamicImage::from_decoder(decoder)
            .map_err(decode_error)?
            .into_rgb8();

        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Bmp => "bmp".to_string(),
        _ => "unknown".to_string(),
    }
}
