//! Per-application dynamic resolution state and the per-frame plan derived
//! from it.

mod config;
mod pipeline;
mod plan;
mod stats;

pub use config::{SessionConfig, MAX_RT_SIZE};
pub use pipeline::{DynamicResolutionSession, ScaleAxis};
pub use plan::{FramePlan, ResolveConstants};
pub use stats::FrameStats;
