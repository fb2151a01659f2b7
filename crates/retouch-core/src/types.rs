//! Core data types for the Retouch enhancement pipeline.
//!
//! Request parameters flow in, an [`EnhancedImage`] flows out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Re-export so downstream crates can hold pipeline buffers without
/// depending on `image` directly.
pub use image::RgbImage;

/// Supported upscale factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpscaleFactor {
    /// Keep the original size
    #[default]
    X1,
    /// Double width and height
    X2,
}

impl UpscaleFactor {
    /// Map an integer factor onto a supported one.
    ///
    /// Only `2` enlarges; every other value leaves the size unchanged.
    pub fn from_int(value: i64) -> Self {
        if value == 2 {
            Self::X2
        } else {
            Self::X1
        }
    }

    /// Integer multiplier applied to each dimension.
    pub fn multiplier(self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
        }
    }
}

/// Per-request enhancement parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceParams {
    /// Upscale factor
    pub upscale: UpscaleFactor,

    /// Run the non-local-means denoise stage
    pub denoise: bool,

    /// Run face restoration (placeholder, see [`StageKind::FaceRestore`])
    pub face_restore: bool,
}

/// Named slots of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    Denoise,
    /// Placeholder slot with no implementation yet.
    Deblur,
    Upscale,
    /// Placeholder slot with no implementation yet.
    FaceRestore,
    Sharpen,
    /// Optional post-processing, off unless configured.
    UnsharpMask,
    /// Optional post-processing, off unless configured.
    Clahe,
}

impl StageKind {
    /// All stage slots in the order they run.
    pub const ORDER: [StageKind; 5] = [
        StageKind::Denoise,
        StageKind::Deblur,
        StageKind::Upscale,
        StageKind::FaceRestore,
        StageKind::Sharpen,
    ];

    /// Optional stages appended after [`Self::ORDER`] when enabled in config.
    pub const POST_PROCESS: [StageKind; 2] = [StageKind::UnsharpMask, StageKind::Clahe];

    /// Stable lowercase name used in logs and errors.
    pub fn name(self) -> &'static str {
        match self {
            Self::Denoise => "denoise",
            Self::Deblur => "deblur",
            Self::Upscale => "upscale",
            Self::FaceRestore => "face-restore",
            Self::Sharpen => "sharpen",
            Self::UnsharpMask => "unsharp-mask",
            Self::Clahe => "clahe",
        }
    }

    /// Whether a real transform exists for this slot.
    pub fn is_implemented(self) -> bool {
        !matches!(self, Self::Deblur | Self::FaceRestore)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of running one image through the processor.
#[derive(Debug, Clone)]
pub struct EnhancedImage {
    /// PNG-encoded output
    pub png: Vec<u8>,

    /// Decoded input width in pixels
    pub input_width: u32,

    /// Decoded input height in pixels
    pub input_height: u32,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Detected input format ("jpeg", "png", ...)
    pub format: String,

    /// Stages that transformed the image (identity slots excluded)
    pub stages_applied: Vec<StageKind>,

    /// Per-phase timings
    pub stats: ProcessingStats,
}

/// Wall-clock timings of one processing run, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub validate_ms: f64,
    pub decode_ms: f64,
    pub pipeline_ms: f64,
    pub encode_ms: f64,
    pub total_ms: f64,
}
