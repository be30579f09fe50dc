use crate::coords::{Vec2, Viewport};
use crate::temporal::{
    BicubicConstants, MotionBlurConstants, NoiseConstants, PostProcessConstants, ResolveMode,
    ResolveView, TemporalPsConstants, TemporalVsConstants,
};

/// Uniforms of the resolve pass, by resolve mode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ResolveConstants {
    /// `ResolveMode::None`: the active region is copied without scaling.
    Unscaled(PostProcessConstants),
    /// Point or bilinear magnification.
    Sampled(PostProcessConstants),
    Bicubic {
        post: PostProcessConstants,
        cubic: BicubicConstants,
    },
    Noise {
        post: PostProcessConstants,
        noise: NoiseConstants,
    },
    Temporal {
        vs: TemporalVsConstants,
        ps: TemporalPsConstants,
        /// Present for the noise offset variant.
        noise: Option<NoiseConstants>,
    },
}

/// Everything the renderer needs to record one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePlan {
    /// Scene and post-process render into the dynamic targets. When false,
    /// they render straight to the backbuffer and there is no resolve.
    pub dynamic: bool,
    /// Viewport for the scene and post-process passes.
    pub viewport: Viewport,
    /// Jitter for `temporal::apply_jitter`; `None` outside temporal modes.
    pub jitter: Option<Vec2>,
    /// Final color/velocity pair written by this frame.
    pub write_index: usize,
    pub resolve_mode: ResolveMode,
    /// Pairs sampled by the resolve pass.
    pub resolve: ResolveView,
    /// Ratio for passes reading the dynamic color target.
    pub post_process: PostProcessConstants,
    /// `None` when motion blur is off.
    pub motion_blur: Option<MotionBlurConstants>,
    pub resolve_constants: ResolveConstants,
}

impl ResolveConstants {
    /// Bytes of the primary uniform record bound to the resolve pass.
    pub fn primary_bytes(&self) -> &[u8] {
        match self {
            ResolveConstants::Unscaled(post) | ResolveConstants::Sampled(post) => {
                bytemuck::bytes_of(post)
            }
            ResolveConstants::Bicubic { cubic, .. } => bytemuck::bytes_of(cubic),
            ResolveConstants::Noise { noise, .. } => bytemuck::bytes_of(noise),
            ResolveConstants::Temporal { vs, .. } => bytemuck::bytes_of(vs),
        }
    }
}
