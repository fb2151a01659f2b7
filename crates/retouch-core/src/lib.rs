//! Retouch Core - Embeddable image enhancement library.
//!
//! Retouch takes an encoded image and a handful of request flags and
//! returns an enhanced PNG. Processing is a fixed, ordered list of pure
//! stages over an in-memory RGB buffer.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Decode → [Denoise → Deblur → Upscale → FaceRestore → Sharpen (→ post)] → PNG
//! ```
//!
//! Deblur and face restore are identity slots for now; see
//! [`pipeline::Stage::Identity`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use retouch_core::{Config, EnhanceParams, ImageProcessor, UpscaleFactor};
//!
//! #[tokio::main]
//! async fn main() -> retouch_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = ImageProcessor::new(&config);
//!
//!     let bytes = std::fs::read("./photo.jpg")?;
//!     let params = EnhanceParams { upscale: UpscaleFactor::X2, ..Default::default() };
//!     let result = processor.process(bytes, &params).await?;
//!     std::fs::write("./photo.png", &result.png)?;
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, Result, RetouchError};
pub use pipeline::{CancelToken, ImageProcessor, Pipeline, Stage};
pub use types::{EnhanceParams, EnhancedImage, ProcessingStats, StageKind, UpscaleFactor};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
