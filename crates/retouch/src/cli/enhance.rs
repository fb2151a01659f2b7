//! The `retouch enhance` command: run the pipeline on a local file.

use anyhow::Context;
use clap::Args;
use retouch_core::{Config, EnhanceParams, ImageProcessor, UpscaleFactor};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the `enhance` command.
#[derive(Args, Debug)]
pub struct EnhanceArgs {
    /// Image file to enhance
    #[arg(required = true)]
    pub input: PathBuf,

    /// Where to write the PNG result
    #[arg(short, long)]
    pub output: PathBuf,

    /// Upscale factor (2 doubles the size; anything else keeps it)
    #[arg(short, long, default_value = "1")]
    pub upscale: i64,

    /// Apply the configured denoise method (NLM by default)
    #[arg(long)]
    pub denoise: bool,

    /// Request face restoration
    #[arg(long)]
    pub face_restore: bool,

    /// Print a JSON summary to stdout
    #[arg(long)]
    pub json: bool,
}

impl EnhanceArgs {
    fn params(&self) -> EnhanceParams {
        EnhanceParams {
            upscale: UpscaleFactor::from_int(self.upscale),
            denoise: self.denoise,
            face_restore: self.face_restore,
        }
    }
}

/// Machine-readable summary of one run.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    input: &'a std::path::Path,
    output: &'a std::path::Path,
    format: &'a str,
    input_size: [u32; 2],
    output_size: [u32; 2],
    stages: &'a [retouch_core::StageKind],
    stats: &'a retouch_core::ProcessingStats,
}

/// Execute the enhance command.
pub async fn execute(args: EnhanceArgs, config: Config) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let processor = ImageProcessor::new(&config);
    let result = processor.process(bytes, &args.params()).await?;

    std::fs::write(&args.output, &result.png)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    tracing::info!(
        "Enhanced {} ({}x{}) -> {} ({}x{}) in {:.1}ms",
        args.input.display(),
        result.input_width,
        result.input_height,
        args.output.display(),
        result.width,
        result.height,
        result.stats.total_ms
    );

    if args.json {
        let summary = Summary {
            input: &args.input,
            output: &args.output,
            format: &result.format,
            input_size: [result.input_width, result.input_height],
            output_size: [result.width, result.height],
            stages: &result.stages_applied,
            stats: &result.stats,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn args(input: PathBuf, output: PathBuf) -> EnhanceArgs {
        EnhanceArgs {
            input,
            output,
            upscale: 2,
            denoise: false,
            face_restore: false,
            json: false,
        }
    }

    #[test]
    fn test_params_from_args() {
        let mut a = args(PathBuf::from("in.png"), PathBuf::from("out.png"));
        assert_eq!(a.params().upscale, UpscaleFactor::X2);
        a.upscale = 3;
        a.denoise = true;
        let params = a.params();
        assert_eq!(params.upscale, UpscaleFactor::X1);
        assert!(params.denoise);
    }

    #[tokio::test]
    async fn test_execute_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        RgbImage::from_pixel(5, 3, Rgb([9, 9, 9])).save(&input).unwrap();

        execute(args(input, output.clone()), Config::default())
            .await
            .unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!((written.width(), written.height()), (10, 6));
    }

    #[tokio::test]
    async fn test_execute_missing_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute(
            args(dir.path().join("missing.png"), dir.path().join("out.png")),
            Config::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
