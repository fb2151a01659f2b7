//! Image enhancement pipeline components.
//!
//! This module contains every phase an upload goes through:
//! - **validate**: Size and magic-byte checks on the raw upload
//! - **decode**: Format detection, header dimension check, decoding to 8-bit RGB
//! - **executor**: Stage planning and ordered execution
//! - **denoise**, **bilateral**, **upscale**, **sharpen**: The transform stages
//! - **unsharp**, **clahe**: Optional post-processing
//! - **cancel**: Cooperative stop flag for abandoned runs
//! - **encode**: PNG output
//! - **processor**: Orchestrates the full run

pub mod bilateral;
pub mod cancel;
pub mod clahe;
pub mod decode;
pub mod denoise;
pub mod encode;
pub mod executor;
pub mod processor;
pub mod sharpen;
pub mod unsharp;
pub mod upscale;
pub mod validate;

// Re-exports for convenient access
pub use cancel::CancelToken;
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::PngEncoder;
pub use executor::{Pipeline, Stage};
pub use processor::ImageProcessor;
pub use validate::Validator;
