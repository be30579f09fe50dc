use std::fmt;

use crate::gpu_timer::{Phase, PhaseTimes};
use crate::resolution::ScalePercent;

use super::DynamicResolutionSession;

/// Timing and resolution readout published whenever the scene timer
/// completes an averaging window.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameStats {
    pub inner_frame_ms: f32,
    pub clear_ms: f32,
    pub scene_ms: f32,
    pub post_process_ms: f32,
    pub scale_ms: f32,
    /// Frame time of one display refresh.
    pub vsync_ms: f32,
    pub scale: ScalePercent,
}

impl FrameStats {
    pub fn new(times: &PhaseTimes, session: &DynamicResolutionSession) -> Self {
        Self {
            inner_frame_ms: times.millis(Phase::InnerFrame),
            clear_ms: times.millis(Phase::Clear),
            scene_ms: times.millis(Phase::Scene),
            post_process_ms: times.millis(Phase::PostProcess),
            scale_ms: times.millis(Phase::Scale),
            vsync_ms: 1000.0 / session.controller().config().refresh_rate,
            scale: session.resolution().scale_percent(),
        }
    }

    pub fn log(&self) {
        log::info!("{self}");
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gpu ms: frame {:.2} clear {:.2} scene {:.2} post {:.2} scale {:.2} | vsync {:.2} | resolution {}% x {}%",
            self.inner_frame_ms,
            self.clear_ms,
            self.scene_ms,
            self.post_process_ms,
            self.scale_ms,
            self.vsync_ms,
            self.scale.x,
            self.scale.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;

    #[test]
    fn display_reports_budget_and_scale() {
        let session = DynamicResolutionSession::new(SessionConfig::default(), 1280, 720);
        let stats = FrameStats::new(&PhaseTimes::default(), &session);
        let text = stats.to_string();
        assert!(text.contains("vsync 16.67"));
        assert!(text.contains("resolution 100% x 100%"));
        assert!(text.starts_with("gpu ms: frame 0.00"));
    }
}
