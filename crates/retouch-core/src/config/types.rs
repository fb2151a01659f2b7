//! Sub-configuration structs with their documented defaults.

use serde::{Deserialize, Serialize};

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Maximum request body size in megabytes (multipart overhead included)
    pub max_body_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_body_mb: 50,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum uploaded image size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum decoded image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Timeout for running the stage pipeline, in milliseconds
    pub process_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 40,
            max_image_dimension: 8192,
            decode_timeout_ms: 10_000,
            process_timeout_ms: 120_000,
        }
    }
}

/// Resampling filter for the upscale stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpscaleFilter {
    /// Catmull-Rom cubic interpolation
    #[default]
    CatmullRom,
    /// Lanczos windowed sinc, three lobes. Sharper, with more ringing.
    Lanczos3,
}

/// Upscale stage settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscaleConfig {
    /// Resampling filter
    pub filter: UpscaleFilter,
}

/// Which algorithm the denoise stage runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DenoiseMethod {
    /// Non-local means over YCbCr patches
    #[default]
    Nlm,
    /// Per-channel bilateral filter; much faster, less thorough
    Bilateral,
}

/// Denoise stage parameters.
///
/// NLM defaults reproduce the classic `10, 10, 7, 21` colored NLM call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    /// Algorithm to run
    pub method: DenoiseMethod,

    /// NLM filter strength for the luminance channel. Higher removes more
    /// noise and more detail.
    pub strength: f32,

    /// NLM filter strength for the two chroma channels.
    pub color_strength: f32,

    /// NLM: side of the square patch compared between pixels (odd).
    pub template_window: u32,

    /// NLM: side of the square area searched for similar patches (odd).
    pub search_window: u32,

    /// Bilateral: neighbourhood radius in pixels, also the spatial sigma
    pub spatial_radius: u32,

    /// Bilateral: intensity difference at which a neighbour's weight falls
    /// to `e^-0.5`
    pub range_sigma: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            method: DenoiseMethod::Nlm,
            strength: 10.0,
            color_strength: 10.0,
            template_window: 7,
            search_window: 21,
            spatial_radius: 2,
            range_sigma: 50.0,
        }
    }
}

/// Sharpening convolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpenConfig {
    /// Row-major 3x3 kernel
    pub kernel: [[i32; 3]; 3],
}

impl Default for SharpenConfig {
    fn default() -> Self {
        Self {
            kernel: [[0, -1, 0], [-1, 5, -1], [0, -1, 0]],
        }
    }
}

/// Unsharp-mask post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsharpConfig {
    /// Append the stage after sharpening
    pub enabled: bool,

    /// Multiplier on the detail layer (1.0 = +100%)
    pub amount: f32,

    /// Gaussian sigma of the blur the detail layer is taken against
    pub sigma: f32,

    /// Differences at or below this are left alone, which keeps flat areas
    /// from picking up grain
    pub threshold: u8,
}

impl Default for UnsharpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 1.3,
            sigma: 0.7,
            threshold: 2,
        }
    }
}

/// Contrast-limited adaptive histogram equalization post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    /// Append the stage after unsharp masking
    pub enabled: bool,

    /// Histogram bin cap as a multiple of the mean bin height
    pub clip_limit: f32,

    /// Tiles per side
    pub grid_size: u32,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            clip_limit: 2.0,
            grid_size: 8,
        }
    }
}

/// Optional stages that run after the fixed pipeline. All off by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessConfig {
    pub unsharp: UnsharpConfig,
    pub clahe: ClaheConfig,
}

/// Stage planning policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    /// Fail requests that ask for a stage with no implementation
    /// (face restore) instead of passing the image through unchanged.
    pub reject_unimplemented: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
