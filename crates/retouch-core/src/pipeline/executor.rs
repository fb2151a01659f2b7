//! Stage planning and execution.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s built from the request
//! parameters. Running it threads one owned buffer through every stage and
//! stops at the first failure.
//!
//! ```text
//! denoise → deblur → upscale → face-restore → sharpen [→ unsharp-mask] [→ clahe]
//! ```
//!
//! Slots that are disabled for a request, or that have no implementation
//! yet, are planned as [`Stage::Identity`]. A real deblur or face-restore
//! transform becomes a new variant; the executor itself does not change.
//! The bracketed post-processing stages are config-driven and only planned
//! when enabled.

use image::RgbImage;

use crate::config::{
    ClaheConfig, Config, DenoiseConfig, DenoiseMethod, SharpenConfig, UnsharpConfig, UpscaleFilter,
};
use crate::error::PipelineError;
use crate::types::{EnhanceParams, StageKind, UpscaleFactor};

use super::bilateral::bilateral;
use super::cancel::CancelToken;
use super::clahe::clahe;
use super::denoise::denoise;
use super::sharpen::sharpen;
use super::unsharp::unsharp_mask;
use super::upscale::upscale;

/// One pure transform step.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Color denoise, NLM or bilateral per `method`
    Denoise(DenoiseConfig),
    /// Resize by an integer factor
    Upscale {
        factor: UpscaleFactor,
        filter: UpscaleFilter,
    },
    /// 3x3 sharpening convolution
    Sharpen(SharpenConfig),
    /// Gaussian unsharp mask
    UnsharpMask(UnsharpConfig),
    /// Local contrast equalization
    Clahe(ClaheConfig),
    /// Pass-through for a slot that is disabled or not implemented.
    ///
    /// Returns its input unchanged and never fails.
    Identity(StageKind),
}

impl Stage {
    /// Which pipeline slot this stage fills.
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Denoise(_) => StageKind::Denoise,
            Self::Upscale { .. } => StageKind::Upscale,
            Self::Sharpen(_) => StageKind::Sharpen,
            Self::UnsharpMask(_) => StageKind::UnsharpMask,
            Self::Clahe(_) => StageKind::Clahe,
            Self::Identity(kind) => *kind,
        }
    }

    /// Whether this stage leaves the image untouched.
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity(_))
    }

    /// Apply the stage, consuming the previous stage's output.
    ///
    /// Long-running stages poll `cancel` and stop early with
    /// [`PipelineError::Cancelled`].
    pub fn apply(&self, image: RgbImage, cancel: &CancelToken) -> Result<RgbImage, PipelineError> {
        match self {
            Self::Denoise(config) => match config.method {
                DenoiseMethod::Nlm => denoise(&image, config, cancel),
                DenoiseMethod::Bilateral => bilateral(&image, config, cancel),
            },
            Self::Upscale { factor, filter } => upscale(image, *factor, *filter),
            Self::Sharpen(config) => Ok(sharpen(&image, config)),
            Self::UnsharpMask(config) => Ok(unsharp_mask(&image, config)),
            Self::Clahe(config) => Ok(clahe(&image, config)),
            Self::Identity(_) => Ok(image),
        }
    }
}

/// An ordered, validated list of stages for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Plan the fixed stage order for `params`, followed by the
    /// post-processing slots (identity unless enabled in config).
    ///
    /// When `config.stages.reject_unimplemented` is set, asking for a stage
    /// without an implementation fails with
    /// [`PipelineError::StageUnavailable`]; otherwise it is planned as
    /// identity.
    pub fn plan(params: &EnhanceParams, config: &Config) -> Result<Self, PipelineError> {
        let kinds = StageKind::ORDER.into_iter().chain(StageKind::POST_PROCESS);
        let mut stages = Vec::with_capacity(StageKind::ORDER.len() + StageKind::POST_PROCESS.len());
        for kind in kinds {
            let requested = match kind {
                StageKind::Denoise => params.denoise,
                StageKind::Deblur => false,
                StageKind::Upscale => params.upscale != UpscaleFactor::X1,
                StageKind::FaceRestore => params.face_restore,
                StageKind::Sharpen => true,
                StageKind::UnsharpMask => config.postprocess.unsharp.enabled,
                StageKind::Clahe => config.postprocess.clahe.enabled,
            };

            let stage = match kind {
                _ if !requested => Stage::Identity(kind),
                StageKind::Denoise => Stage::Denoise(config.denoise.clone()),
                StageKind::Upscale => Stage::Upscale {
                    factor: params.upscale,
                    filter: config.upscale.filter,
                },
                StageKind::Sharpen => Stage::Sharpen(config.sharpen.clone()),
                StageKind::UnsharpMask => Stage::UnsharpMask(config.postprocess.unsharp.clone()),
                StageKind::Clahe => Stage::Clahe(config.postprocess.clahe.clone()),
                StageKind::Deblur | StageKind::FaceRestore => {
                    if config.stages.reject_unimplemented {
                        return Err(PipelineError::StageUnavailable(kind.to_string()));
                    }
                    tracing::debug!("Stage {} requested but not implemented; skipping", kind);
                    Stage::Identity(kind)
                }
            };
            stages.push(stage);
        }
        Ok(Self { stages })
    }

    /// Build a pipeline from an explicit stage list.
    pub fn from_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// The planned stages, in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Slots that will actually transform the image.
    pub fn active_kinds(&self) -> Vec<StageKind> {
        self.stages
            .iter()
            .filter(|s| !s.is_identity())
            .map(Stage::kind)
            .collect()
    }

    /// Run every stage in order, aborting on the first failure.
    pub fn run(&self, image: RgbImage) -> Result<RgbImage, PipelineError> {
        self.run_cancellable(image, &CancelToken::new())
    }

    /// Like [`Pipeline::run`], but stops with [`PipelineError::Cancelled`]
    /// once `cancel` is set: between stages, and inside stages that poll it.
    pub fn run_cancellable(
        &self,
        image: RgbImage,
        cancel: &CancelToken,
    ) -> Result<RgbImage, PipelineError> {
        self.stages.iter().try_fold(image, |image, stage| {
            cancel.check(stage.kind())?;
            let start = std::time::Instant::now();
            let out = stage.apply(image, cancel)?;
            tracing::trace!(
                "  Stage {}: {:?} ({}x{})",
                stage.kind(),
                start.elapsed(),
                out.width(),
                out.height()
            );
            Ok(out)
        })
    }
}
