//! Error types for the Retouch enhancement pipeline.
//!
//! Errors are organized by phase so callers (the HTTP layer in particular)
//! can map each failure to a precise response without string matching.

use thiserror::Error;

/// Top-level error type for Retouch operations.
#[derive(Error, Debug)]
pub enum RetouchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by phase.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input bytes are not a decodable image
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// PNG encoding of the result failed
    #[error("Encode error: {message}")]
    Encode { message: String },

    /// Upload exceeds the configured size limit
    #[error("File too large: {size_bytes} bytes > {max_mb}MB")]
    FileTooLarge { size_bytes: u64, max_mb: u64 },

    /// Decoded dimensions exceed the configured limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// A phase did not finish within its deadline
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// A transform stage failed
    #[error("Stage {stage} failed: {message}")]
    Stage { stage: String, message: String },

    /// A stage was requested that has no implementation yet
    #[error("Stage {0} is not available")]
    StageUnavailable(String),

    /// Work stopped early because its deadline had already passed
    #[error("Stage {stage} cancelled")]
    Cancelled { stage: String },
}

/// Convenience type alias for Retouch results.
pub type Result<T> = std::result::Result<T, RetouchError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
