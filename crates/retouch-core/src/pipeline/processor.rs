//! Pipeline orchestration - wires validation, decoding, stages and encoding.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::types::{EnhanceParams, EnhancedImage, ProcessingStats};

use super::cancel::CancelToken;
use super::decode::{format_to_string, ImageDecoder};
use super::encode::PngEncoder;
use super::executor::Pipeline;
use super::validate::Validator;

/// The main image processor that orchestrates the full pipeline.
///
/// Holds no per-request state; share it behind an `Arc` across requests.
pub struct ImageProcessor {
    config: Arc<Config>,
    decoder: ImageDecoder,
    encoder: PngEncoder,
    validator: Validator,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            config: Arc::new(config.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            encoder: PngEncoder,
            validator: Validator::new(config.limits.clone()),
        }
    }

    /// The configuration this processor was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// MIME type of [`EnhancedImage::png`].
    pub fn content_type(&self) -> &'static str {
        self.encoder.content_type()
    }

    /// Enhance one uploaded image.
    ///
    /// bytes → validate → decode → stages → PNG. Any failure aborts the
    /// whole run; there are no partial results.
    pub async fn process(&self, bytes: Vec<u8>, params: &EnhanceParams) -> Result<EnhancedImage> {
        let start = Instant::now();
        tracing::debug!("Enhancing {} bytes with {:?}", bytes.len(), params);

        // Plan first so a rejected stage fails before any decoding work.
        let pipeline = Pipeline::plan(params, &self.config)?;

        // Validate
        self.validator.validate(&bytes)?;
        let validate_time = start.elapsed();
        tracing::trace!("  Validate: {:?}", validate_time);

        // Decode
        let decode_start = Instant::now();
        let decoded = self.decoder.decode_from_bytes(bytes).await?;
        let decode_time = decode_start.elapsed();
        tracing::trace!("  Decode: {:?}", decode_time);

        let (input_width, input_height) = (decoded.width, decoded.height);
        let format = format_to_string(decoded.format);
        let stages_applied = pipeline.active_kinds();

        // Stages + encode
        let rendered = self.render(pipeline, decoded.image).await?;
        tracing::trace!("  Pipeline: {:?}", rendered.pipeline_time);
        tracing::trace!("  Encode: {:?}", rendered.encode_time);

        let total_time = start.elapsed();
        tracing::debug!(
            "Enhanced {}x{} {} -> {}x{} in {:?}",
            input_width,
            input_height,
            format,
            rendered.width,
            rendered.height,
            total_time
        );

        Ok(EnhancedImage {
            png: rendered.png,
            input_width,
            input_height,
            width: rendered.width,
            height: rendered.height,
            format,
            stages_applied,
            stats: ProcessingStats {
                validate_ms: millis(validate_time),
                decode_ms: millis(decode_time),
                pipeline_ms: millis(rendered.pipeline_time),
                encode_ms: millis(rendered.encode_time),
                total_ms: millis(total_time),
            },
        })
    }

    /// Run the planned stages and the PNG encode on a blocking thread under
    /// the process timeout.
    ///
    /// On timeout the worker is told to stop; stages poll the token, so the
    /// abandoned run ends soon after instead of finishing in the background.
    async fn render(
        &self,
        pipeline: Pipeline,
        image: image::RgbImage,
    ) -> std::result::Result<Rendered, PipelineError> {
        let timeout_ms = self.config.limits.process_timeout_ms;
        let cancel = CancelToken::new();
        let encoder = self.encoder;

        let worker = cancel.clone();
        let work = move || -> std::result::Result<Rendered, PipelineError> {
            let pipeline_start = Instant::now();
            let image = pipeline.run_cancellable(image, &worker)?;
            let pipeline_time = pipeline_start.elapsed();

            worker.check("encode")?;
            let encode_start = Instant::now();
            let png = encoder.encode(&image)?;
            Ok(Rendered {
                png,
                width: image.width(),
                height: image.height(),
                pipeline_time,
                encode_time: encode_start.elapsed(),
            })
        };

        let task = tokio::task::spawn_blocking(work);
        match timeout(Duration::from_millis(timeout_ms), task).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => Err(PipelineError::Stage {
                stage: "pipeline".to_string(),
                message: format!("Task join error: {}", e),
            }),
            Err(_) => {
                cancel.cancel();
                tracing::warn!("Processing exceeded {}ms, cancelling", timeout_ms);
                Err(PipelineError::Timeout {
                    stage: "pipeline".to_string(),
                    timeout_ms,
                })
            }
        }
    }
}

/// Output of the blocking half of a run.
struct Rendered {
    png: Vec<u8>,
    width: u32,
    height: u32,
    pipeline_time: Duration,
    encode_time: Duration,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
