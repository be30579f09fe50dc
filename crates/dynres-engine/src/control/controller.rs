use crate::resolution::DynamicResolution;

/// Proportional gain: a frame that takes twice the budget shrinks the scale by 1%.
pub const RATE_OF_CHANGE: f32 = 0.01;

/// Frame times beyond this multiple of the GPU time are treated as CPU or
/// platform spikes (resizing, going fullscreen) and ignored by the controller.
pub const FALLBACK_FRAME_RATIO: f32 = 2.0;

/// How the resolution scale is driven.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ControlMode {
    /// Scale only changes through explicit requests.
    Manual,
    /// Target half the display refresh rate.
    HalfVSync,
    /// Target the display refresh rate.
    #[default]
    VSync,
}

impl ControlMode {
    pub fn label(self) -> &'static str {
        match self {
            ControlMode::Manual => "manual",
            ControlMode::HalfVSync => "half vsync",
            ControlMode::VSync => "vsync",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub mode: ControlMode,
    /// Display refresh rate in Hz.
    pub refresh_rate: f32,
    /// Lower bound of the controlled scale.
    pub scale_min: f32,
    /// Upper bound of the controlled scale and the supersampling cap: 1.0
    /// without supersampling, 2.0 with. Any other value panics in
    /// `ResolutionController::new`. `DynamicResolutionSession` overwrites it
    /// from `SessionConfig::supersampling`.
    pub scale_max: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            mode: ControlMode::VSync,
            refresh_rate: 60.0,
            scale_min: 0.3,
            scale_max: 1.0,
        }
    }
}

/// Proportional controller that steers the resolution scale towards a frame
/// time budget derived from the display refresh rate.
///
/// The controlled scale is kept separately from the model's derived scale so
/// sub-pixel adjustments accumulate across frames.
#[derive(Debug, Clone)]
pub struct ResolutionController {
    config: ControllerConfig,
    controlled_scale: f32,
}

impl Default for ResolutionController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl ResolutionController {
    pub fn new(config: ControllerConfig) -> Self {
        assert!(config.refresh_rate > 0.0, "refresh rate must be positive");
        assert!(
            (1.0..=2.0).contains(&config.scale_max) && config.scale_max.fract() == 0.0,
            "supersampling cap must be 1 or 2, got {}",
            config.scale_max
        );
        assert!(
            config.scale_min > 0.0 && config.scale_min <= config.scale_max,
            "scale bounds must satisfy 0 < min <= max"
        );
        Self {
            controlled_scale: 1.0_f32.min(config.scale_max),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn mode(&self) -> ControlMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        if self.config.mode != mode {
            log::info!("resolution control: {}", mode.label());
        }
        self.config.mode = mode;
    }

    pub fn set_refresh_rate(&mut self, hz: f32) {
        assert!(hz > 0.0, "refresh rate must be positive");
        self.config.refresh_rate = hz;
    }

    pub fn controlled_scale(&self) -> f32 {
        self.controlled_scale
    }

    /// Frame time the controller aims for, in seconds. `None` in manual mode.
    pub fn optimal_frame_time(&self) -> Option<f32> {
        match self.config.mode {
            ControlMode::Manual => None,
            ControlMode::HalfVSync => Some(2.0 / self.config.refresh_rate),
            ControlMode::VSync => Some(1.0 / self.config.refresh_rate),
        }
    }

    /// Toggles the supersampling cap between 1 and 2.
    ///
    /// The dynamic targets must be re-initialized with the new cap afterwards.
    pub fn set_supersampling(&mut self, enabled: bool) {
        self.config.scale_max = if enabled { 2.0 } else { 1.0 };
        self.controlled_scale = self.controlled_scale.min(self.config.scale_max);
    }

    /// Integer supersampling cap for `DynamicResolution::initialize`.
    pub fn max_scaling(&self) -> u32 {
        self.config.scale_max as u32
    }

    /// Runs one control step and applies the result to `resolution`.
    ///
    /// `gpu_time` is the GPU time of the resolution-dependent work and
    /// `frame_time` the measured wall-clock frame time, both in seconds.
    /// Does nothing in manual mode.
    pub fn step(&mut self, gpu_time: f32, frame_time: f32, resolution: &mut DynamicResolution) {
        let Some(optimal) = self.optimal_frame_time() else {
            return;
        };

        let control_time = if frame_time > FALLBACK_FRAME_RATIO * gpu_time {
            gpu_time
        } else {
            (gpu_time + frame_time) / 2.0
        };

        let time_ratio = control_time / optimal;
        let scale_ratio = RATE_OF_CHANGE * (1.0 - time_ratio) + 1.0;

        let next = self.controlled_scale * scale_ratio;
        // NaN from degenerate inputs keeps the previous scale.
        if !next.is_nan() {
            self.controlled_scale = next.clamp(self.config.scale_min, self.config.scale_max);
        }

        resolution.set_scale(self.controlled_scale, self.controlled_scale);
    }

    /// Sets the scale directly, bypassing the controller. Meant for manual mode.
    pub fn request_manual_scale(
        &mut self,
        scale_x: f32,
        scale_y: f32,
        resolution: &mut DynamicResolution,
    ) {
        resolution.set_scale(scale_x, scale_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HZ: f32 = 60.0;

    fn setup(mode: ControlMode) -> (ResolutionController, DynamicResolution) {
        let ctl = ResolutionController::new(ControllerConfig {
            mode,
            ..ControllerConfig::default()
        });
        let res = DynamicResolution::new(1280, 720, 8192, 8192, 1);
        (ctl, res)
    }

    // ── budget ────────────────────────────────────────────────────────────

    #[test]
    fn optimal_time_per_mode() {
        let (mut ctl, _) = setup(ControlMode::VSync);
        assert_eq!(ctl.optimal_frame_time(), Some(1.0 / HZ));
        ctl.set_mode(ControlMode::HalfVSync);
        assert_eq!(ctl.optimal_frame_time(), Some(2.0 / HZ));
        ctl.set_mode(ControlMode::Manual);
        assert_eq!(ctl.optimal_frame_time(), None);
    }

    // ── stepping ──────────────────────────────────────────────────────────

    #[test]
    fn on_budget_is_a_fixed_point() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.controlled_scale = 0.75;
        let t = 1.0 / HZ;
        for _ in 0..50 {
            ctl.step(t, t, &mut res);
        }
        assert_eq!(ctl.controlled_scale(), 0.75);
        assert_eq!(res.scale_x(), 0.75);
    }

    #[test]
    fn over_budget_declines_monotonically_to_min() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        let t = 2.0 / HZ;
        let mut prev = ctl.controlled_scale();
        for _ in 0..500 {
            ctl.step(t, t, &mut res);
            let s = ctl.controlled_scale();
            assert!(s <= prev);
            assert!(s >= 0.3);
            prev = s;
        }
        assert_eq!(ctl.controlled_scale(), 0.3);
        assert!(res.scale_x() <= 0.3 + 1.0 / 1280.0);
    }

    #[test]
    fn one_step_at_double_budget_shrinks_one_percent() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.step(2.0 / HZ, 2.0 / HZ, &mut res);
        assert!((ctl.controlled_scale() - 0.99).abs() < 1e-6);
    }

    #[test]
    fn under_budget_is_clamped_to_max() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        for _ in 0..100 {
            ctl.step(0.001, 0.001, &mut res);
        }
        assert_eq!(ctl.controlled_scale(), 1.0);
        assert_eq!(res.scale_x(), 1.0);
    }

    #[test]
    fn half_vsync_doubles_the_budget() {
        let (mut ctl, mut res) = setup(ControlMode::HalfVSync);
        ctl.controlled_scale = 0.5;
        let t = 2.0 / HZ;
        ctl.step(t, t, &mut res);
        assert_eq!(ctl.controlled_scale(), 0.5);
    }

    #[test]
    fn frame_spike_falls_back_to_gpu_time() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.controlled_scale = 0.5;
        // gpu on budget, frame far beyond: only the gpu time counts.
        ctl.step(1.0 / HZ, 1.0, &mut res);
        assert_eq!(ctl.controlled_scale(), 0.5);
    }

    #[test]
    fn control_time_averages_gpu_and_frame() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.controlled_scale = 0.5;
        // average of 0.8 and 1.2 budgets is exactly on budget.
        ctl.step(0.8 / HZ, 1.2 / HZ, &mut res);
        assert!((ctl.controlled_scale() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn frame_at_twice_gpu_still_averages() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.controlled_scale = 0.5;
        // averaged: ratio 0.75, scale * 1.0025. gpu only would give 1.005.
        ctl.step(0.5 / HZ, 1.0 / HZ, &mut res);
        assert!((ctl.controlled_scale() - 0.50125).abs() < 1e-6);
    }

    #[test]
    fn zero_timings_step_up_within_bounds() {
        let (mut ctl, mut res) = setup(ControlMode::VSync);
        ctl.controlled_scale = 0.5;
        ctl.step(0.0, 0.0, &mut res);
        assert!((ctl.controlled_scale() - 0.505).abs() < 1e-6);

        ctl.step(0.0, f32::INFINITY, &mut res);
        assert!(ctl.controlled_scale() <= 1.0);
        assert!(ctl.controlled_scale() > 0.505);
    }

    // ── manual ────────────────────────────────────────────────────────────

    #[test]
    fn manual_mode_is_inert() {
        let (mut ctl, mut res) = setup(ControlMode::Manual);
        ctl.request_manual_scale(0.5, 0.5, &mut res);
        ctl.step(1.0, 1.0, &mut res);
        assert_eq!(res.scale_x(), 0.5);
        assert_eq!(ctl.controlled_scale(), 1.0);
    }

    #[test]
    fn manual_request_allows_independent_axes() {
        let (mut ctl, mut res) = setup(ControlMode::Manual);
        ctl.request_manual_scale(0.5, 0.25, &mut res);
        assert_eq!(res.current_width(), 640);
        assert_eq!(res.current_height(), 180);
    }

    // ── supersampling ─────────────────────────────────────────────────────

    #[test]
    fn supersampling_toggles_cap() {
        let (mut ctl, _) = setup(ControlMode::VSync);
        ctl.set_supersampling(true);
        assert_eq!(ctl.config().scale_max, 2.0);
        assert_eq!(ctl.max_scaling(), 2);

        let mut res = DynamicResolution::new(1280, 720, 8192, 8192, ctl.max_scaling());
        for _ in 0..200 {
            ctl.step(0.001, 0.001, &mut res);
        }
        assert_eq!(ctl.controlled_scale(), 2.0);
        assert_eq!(res.current_width(), 2560);

        ctl.set_supersampling(false);
        assert_eq!(ctl.max_scaling(), 1);
        assert_eq!(ctl.controlled_scale(), 1.0);
    }

    #[test]
    fn accepts_both_supersampling_caps() {
        for cap in [1.0, 2.0] {
            let ctl = ResolutionController::new(ControllerConfig {
                scale_max: cap,
                ..ControllerConfig::default()
            });
            assert_eq!(ctl.max_scaling(), cap as u32);
        }
    }

    #[test]
    #[should_panic(expected = "supersampling cap must be 1 or 2")]
    fn rejects_cap_above_two() {
        ResolutionController::new(ControllerConfig {
            scale_max: 3.0,
            ..ControllerConfig::default()
        });
    }

    #[test]
    #[should_panic(expected = "supersampling cap must be 1 or 2")]
    fn rejects_cap_below_one() {
        ResolutionController::new(ControllerConfig {
            scale_max: 0.5,
            ..ControllerConfig::default()
        });
    }

    #[test]
    #[should_panic(expected = "supersampling cap must be 1 or 2")]
    fn rejects_fractional_cap() {
        ResolutionController::new(ControllerConfig {
            scale_max: 1.5,
            ..ControllerConfig::default()
        });
    }
}
