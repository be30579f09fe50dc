//! Temporal resolve bookkeeping: resolve modes, sub-pixel jitter and the
//! ping-pong history buffers.

mod constants;
mod mode;
mod state;

pub use constants::{
    BicubicConstants, MotionBlurConstants, NoiseConstants, PostProcessConstants,
    TemporalPsConstants, TemporalVsConstants, NOISE_TEXTURE_SIZE, VELOCITY_TO_ALPHA_SCALE,
};
pub use mode::{JitterPattern, ResolveMode};
pub use state::{apply_jitter, resolve_view, ResolveView, TemporalState};
