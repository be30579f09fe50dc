use crate::control::ControllerConfig;
use crate::temporal::{JitterPattern, ResolveMode};

/// Upper bound for either side of the dynamic render targets.
pub const MAX_RT_SIZE: u32 = 8192;

/// Startup configuration for `DynamicResolutionSession`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device limits for the dynamic targets; clamped to `MAX_RT_SIZE`.
    pub max_rt_width: u32,
    pub max_rt_height: u32,

    /// Allow scales up to 2 (rendering above backbuffer resolution).
    pub supersampling: bool,

    /// Render into the dynamic targets at all. When off, frames render at
    /// backbuffer size and nothing is resolved.
    pub enabled: bool,

    /// Its `scale_max` is ignored; the cap follows `supersampling`.
    pub controller: ControllerConfig,
    pub resolve_mode: ResolveMode,
    pub jitter_pattern: JitterPattern,

    /// Run the motion blur post pass between scene and resolve.
    pub motion_blur: bool,

    /// Manual scale requests on one axis also set the other.
    pub aspect_ratio_lock: bool,

    /// Window of the smoothed scene clock, in frames.
    pub clock_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_rt_width: MAX_RT_SIZE,
            max_rt_height: MAX_RT_SIZE,
            supersampling: false,
            enabled: true,
            controller: ControllerConfig::default(),
            resolve_mode: ResolveMode::TemporalAa,
            jitter_pattern: JitterPattern::Asymmetric,
            motion_blur: true,
            aspect_ratio_lock: true,
            clock_window: 10,
        }
    }
}

impl SessionConfig {
    /// Limits the dynamic targets to what the device can allocate.
    pub fn with_device_limit(mut self, max_texture_dimension_2d: u32) -> Self {
        self.max_rt_width = self.max_rt_width.min(max_texture_dimension_2d);
        self.max_rt_height = self.max_rt_height.min(max_texture_dimension_2d);
        self
    }
}
