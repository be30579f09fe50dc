use crate::control::{ControlMode, ControllerConfig, ResolutionController};
use crate::coords::{Vec2, Viewport};
use crate::resolution::DynamicResolution;
use crate::temporal::{
    resolve_view, BicubicConstants, JitterPattern, MotionBlurConstants, NoiseConstants,
    PostProcessConstants, ResolveMode, TemporalPsConstants, TemporalState,
};
use crate::time::SmoothedClock;

use super::config::{SessionConfig, MAX_RT_SIZE};
use super::plan::{FramePlan, ResolveConstants};

/// Axis addressed by a manual scale request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScaleAxis {
    X,
    Y,
}

/// Everything one window needs to render at a dynamic resolution.
///
/// Per frame, in order:
/// 1. `control_step` with the latest GPU and frame times
/// 2. `take_targets_dirty`, reallocating the dynamic targets if set
/// 3. `frame_move`
/// 4. `prepare_frame`, then record scene, post-process and resolve passes
#[derive(Debug)]
pub struct DynamicResolutionSession {
    max_rt_width: u32,
    max_rt_height: u32,

    resolution: DynamicResolution,
    controller: ResolutionController,
    temporal: TemporalState,
    clock: SmoothedClock,

    resolve_mode: ResolveMode,
    jitter_pattern: JitterPattern,
    enabled: bool,
    paused: bool,
    motion_blur: bool,
    aspect_ratio_lock: bool,

    /// Dynamic target size changed; owners must reallocate before rendering.
    targets_dirty: bool,
    frame_count: u64,
}

impl DynamicResolutionSession {
    pub fn new(config: SessionConfig, backbuffer_width: u32, backbuffer_height: u32) -> Self {
        let controller = ResolutionController::new(ControllerConfig {
            scale_max: if config.supersampling { 2.0 } else { 1.0 },
            ..config.controller
        });

        let max_rt_width = config.max_rt_width.min(MAX_RT_SIZE);
        let max_rt_height = config.max_rt_height.min(MAX_RT_SIZE);
        let resolution = DynamicResolution::new(
            backbuffer_width,
            backbuffer_height,
            max_rt_width,
            max_rt_height,
            controller.max_scaling(),
        );

        let mut temporal = TemporalState::default();
        temporal.reset(resolution.rt_ratio());

        Self {
            max_rt_width,
            max_rt_height,
            resolution,
            controller,
            temporal,
            clock: SmoothedClock::new(config.clock_window),
            resolve_mode: config.resolve_mode,
            jitter_pattern: config.jitter_pattern,
            enabled: config.enabled,
            paused: false,
            motion_blur: config.motion_blur,
            aspect_ratio_lock: config.aspect_ratio_lock,
            targets_dirty: true,
            frame_count: 0,
        }
    }

    fn reinitialize(&mut self, backbuffer_width: u32, backbuffer_height: u32) {
        self.resolution.initialize(
            backbuffer_width,
            backbuffer_height,
            self.max_rt_width,
            self.max_rt_height,
            self.controller.max_scaling(),
        );
        self.temporal.reset(self.resolution.rt_ratio());
        self.targets_dirty = true;
    }

    /// Re-derives the dynamic targets for a new backbuffer size.
    ///
    /// Unpauses: the history buffers are reallocated, so a frozen frame would
    /// resolve to an empty image.
    pub fn on_backbuffer_resized(&mut self, width: u32, height: u32) {
        self.reinitialize(width, height);
        if self.paused {
            log::debug!("unpausing after resize");
        }
        self.paused = false;
    }

    /// Toggles the 2x supersampling cap. Takes effect immediately; the dynamic
    /// targets must be reallocated before the next frame.
    pub fn set_supersampling(&mut self, enabled: bool) {
        self.controller.set_supersampling(enabled);
        self.reinitialize(
            self.resolution.backbuffer_width(),
            self.resolution.backbuffer_height(),
        );
        log::info!(
            "supersampling {}: dynamic targets {}x{}",
            if enabled { "on" } else { "off" },
            self.resolution.dynamic_buffer_width(),
            self.resolution.dynamic_buffer_height(),
        );
    }

    pub fn supersampling(&self) -> bool {
        self.controller.max_scaling() > 1
    }

    /// Returns whether the dynamic targets need reallocating, clearing the flag.
    pub fn take_targets_dirty(&mut self) -> bool {
        std::mem::take(&mut self.targets_dirty)
    }

    /// Advances per-frame state that is frozen while paused: the ping-pong
    /// index and the smoothed scene clock.
    pub fn frame_move(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.temporal
            .advance_buffer(self.enabled && self.resolve_mode.uses_history());
        self.clock.update(dt);
        self.frame_count += 1;
    }

    /// Runs the controller. `gpu_time` is the averaged inner-frame GPU time in
    /// seconds, `measured_fps` the wall-clock frame rate.
    pub fn control_step(&mut self, gpu_time: f32, measured_fps: f32) {
        if !self.enabled {
            return;
        }
        let frame_time = if measured_fps > 0.0 {
            1.0 / measured_fps
        } else {
            f32::INFINITY
        };
        self.controller
            .step(gpu_time, frame_time, &mut self.resolution);
    }

    /// Derives this frame's viewport, jitter, buffer selection and shader
    /// constants.
    pub fn prepare_frame(&mut self) -> FramePlan {
        if !self.enabled {
            return self.backbuffer_plan();
        }

        let viewport = self.resolution.viewport();
        let rt_ratio = self.resolution.rt_ratio();
        let dyn_w = self.resolution.dynamic_buffer_width();
        let dyn_h = self.resolution.dynamic_buffer_height();

        let jitter = if self.resolve_mode.uses_history() {
            if self.paused {
                Some(self.temporal.current_jitter())
            } else {
                Some(
                    self.temporal
                        .update_jitter(self.jitter_pattern, viewport, rt_ratio),
                )
            }
        } else {
            None
        };

        let resolve = resolve_view(&self.temporal, self.paused);

        let resolve_constants = match self.resolve_mode {
            ResolveMode::None => ResolveConstants::Unscaled(PostProcessConstants::unscaled()),
            ResolveMode::PointMag | ResolveMode::Bilinear => {
                ResolveConstants::Sampled(PostProcessConstants::new(rt_ratio))
            }
            ResolveMode::Bicubic => ResolveConstants::Bicubic {
                post: PostProcessConstants::new(rt_ratio),
                cubic: BicubicConstants::new(dyn_w, dyn_h),
            },
            ResolveMode::Noise => ResolveConstants::Noise {
                post: PostProcessConstants::new(rt_ratio),
                noise: NoiseConstants::additive(rt_ratio, self.noise_offset()),
            },
            ResolveMode::NoiseOffset => ResolveConstants::Noise {
                post: PostProcessConstants::new(rt_ratio),
                noise: NoiseConstants::sample_offset(dyn_w, dyn_h),
            },
            ResolveMode::TemporalAa | ResolveMode::TemporalAaBasic => ResolveConstants::Temporal {
                vs: resolve.vs_constants(),
                ps: TemporalPsConstants::new(dyn_w, dyn_h),
                noise: None,
            },
            ResolveMode::TemporalAaNoiseOffset => ResolveConstants::Temporal {
                vs: resolve.vs_constants(),
                ps: TemporalPsConstants::new(dyn_w, dyn_h),
                noise: Some(NoiseConstants::sample_offset(dyn_w, dyn_h)),
            },
        };

        FramePlan {
            dynamic: true,
            viewport,
            jitter,
            write_index: self.temporal.buffer_index(),
            resolve_mode: self.resolve_mode,
            resolve,
            post_process: PostProcessConstants::new(rt_ratio),
            motion_blur: self
                .motion_blur
                .then(|| MotionBlurConstants::new(rt_ratio, dyn_w, dyn_h)),
            resolve_constants,
        }
    }

    fn backbuffer_plan(&self) -> FramePlan {
        let viewport = Viewport::new(
            self.resolution.backbuffer_width() as f32,
            self.resolution.backbuffer_height() as f32,
        );
        FramePlan {
            dynamic: false,
            viewport,
            jitter: None,
            write_index: 0,
            resolve_mode: self.resolve_mode,
            resolve: resolve_view(&TemporalState::default(), false),
            post_process: PostProcessConstants::unscaled(),
            motion_blur: self.motion_blur.then(|| {
                MotionBlurConstants::new(
                    Vec2::splat(1.0),
                    self.resolution.backbuffer_width(),
                    self.resolution.backbuffer_height(),
                )
            }),
            resolve_constants: ResolveConstants::Unscaled(PostProcessConstants::unscaled()),
        }
    }

    /// Per-frame noise offset in `[0, 1)`, from the R2 low-discrepancy sequence.
    fn noise_offset(&self) -> Vec2 {
        const A1: f64 = 0.754_877_666_246_692_7;
        const A2: f64 = 0.569_840_290_998_053_2;
        let n = self.frame_count as f64;
        // f64 -> f32 may round up to exactly 1.0
        Vec2::new(
            ((n * A1).fract() as f32) % 1.0,
            ((n * A2).fract() as f32) % 1.0,
        )
    }

    // ── settings ──────────────────────────────────────────────────────────

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "paused" } else { "running" });
    }

    pub fn set_resolve_mode(&mut self, mode: ResolveMode) {
        if self.resolve_mode != mode {
            log::info!("resolve mode: {}", mode.label());
        }
        self.resolve_mode = mode;
    }

    pub fn set_jitter_pattern(&mut self, pattern: JitterPattern) {
        self.jitter_pattern = pattern;
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.controller.set_mode(mode);
    }

    /// Sets the refresh rate the controller budgets against.
    pub fn set_refresh_rate(&mut self, hz: f32) {
        self.controller.set_refresh_rate(hz);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!(
                "dynamic resolution {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
    }

    pub fn set_motion_blur(&mut self, enabled: bool) {
        self.motion_blur = enabled;
    }

    pub fn set_aspect_ratio_lock(&mut self, locked: bool) {
        self.aspect_ratio_lock = locked;
    }

    /// Sets the scale on both axes directly.
    pub fn request_manual_scale(&mut self, scale_x: f32, scale_y: f32) {
        self.controller
            .request_manual_scale(scale_x, scale_y, &mut self.resolution);
    }

    /// Sets one axis in whole percent. With the aspect ratio lock on, the other
    /// axis follows.
    pub fn request_manual_percent(&mut self, axis: ScaleAxis, percent: u32) {
        let s = percent as f32 / 100.0;
        let (sx, sy) = match (axis, self.aspect_ratio_lock) {
            (_, true) => (s, s),
            (ScaleAxis::X, false) => (s, self.resolution.scale_y()),
            (ScaleAxis::Y, false) => (self.resolution.scale_x(), s),
        };
        self.request_manual_scale(sx, sy);
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn resolution(&self) -> &DynamicResolution {
        &self.resolution
    }

    pub fn controller(&self) -> &ResolutionController {
        &self.controller
    }

    pub fn temporal(&self) -> &TemporalState {
        &self.temporal
    }

    pub fn clock(&self) -> &SmoothedClock {
        &self.clock
    }

    pub fn resolve_mode(&self) -> ResolveMode {
        self.resolve_mode
    }

    pub fn jitter_pattern(&self) -> JitterPattern {
        self.jitter_pattern
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn motion_blur(&self) -> bool {
        self.motion_blur
    }

    pub fn aspect_ratio_lock(&self) -> bool {
        self.aspect_ratio_lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DynamicResolutionSession {
        DynamicResolutionSession::new(SessionConfig::default(), 1280, 720)
    }

    fn manual_session() -> DynamicResolutionSession {
        DynamicResolutionSession::new(
            SessionConfig {
                controller: ControllerConfig {
                    mode: ControlMode::Manual,
                    ..ControllerConfig::default()
                },
                ..SessionConfig::default()
            },
            1280,
            720,
        )
    }

    // ── setup ─────────────────────────────────────────────────────────────

    #[test]
    fn supersampling_config_sets_controller_cap() {
        let s = DynamicResolutionSession::new(
            SessionConfig {
                supersampling: true,
                ..SessionConfig::default()
            },
            1280,
            720,
        );
        assert!(s.supersampling());
        assert_eq!(s.controller().config().scale_max, 2.0);
        assert_eq!(s.resolution().dynamic_buffer_width(), 2560);

        // the controller's own cap is not consulted
        let s = DynamicResolutionSession::new(
            SessionConfig {
                controller: ControllerConfig {
                    scale_max: 2.0,
                    ..ControllerConfig::default()
                },
                ..SessionConfig::default()
            },
            1280,
            720,
        );
        assert!(!s.supersampling());
        assert_eq!(s.resolution().dynamic_buffer_width(), 1280);
    }

    #[test]
    fn new_session_needs_targets() {
        let mut s = session();
        assert!(s.take_targets_dirty());
        assert!(!s.take_targets_dirty());
        assert_eq!(s.resolution().dynamic_buffer_width(), 1280);
    }

    #[test]
    fn device_limit_caps_targets() {
        let config = SessionConfig {
            supersampling: true,
            ..SessionConfig::default()
        }
        .with_device_limit(2048);
        let s = DynamicResolutionSession::new(config, 1280, 720);
        assert_eq!(s.resolution().dynamic_buffer_width(), 1280);
        assert_eq!(s.resolution().dynamic_buffer_height(), 1440);
    }

    #[test]
    fn supersampling_reinitializes() {
        let mut s = session();
        s.take_targets_dirty();
        s.set_supersampling(true);
        assert!(s.supersampling());
        assert!(s.take_targets_dirty());
        assert_eq!(s.resolution().dynamic_buffer_width(), 2560);
        assert_eq!(s.resolution().max_scale_x(), 2.0);

        s.set_supersampling(false);
        assert_eq!(s.resolution().dynamic_buffer_width(), 1280);
    }

    #[test]
    fn resize_unpauses_and_resets_history() {
        let mut s = session();
        s.frame_move(0.016);
        s.prepare_frame();
        s.set_paused(true);

        s.on_backbuffer_resized(1920, 1080);
        assert!(!s.is_paused());
        assert_eq!(s.resolution().backbuffer_width(), 1920);
        assert_eq!(s.temporal().current_jitter(), Vec2::zero());
        assert_eq!(s.temporal().previous_rt_ratio(), s.resolution().rt_ratio());
        assert!(s.take_targets_dirty());
    }

    // ── frame_move ────────────────────────────────────────────────────────

    #[test]
    fn temporal_modes_ping_pong() {
        let mut s = session();
        s.frame_move(0.016);
        assert_eq!(s.prepare_frame().write_index, 1);
        s.frame_move(0.016);
        assert_eq!(s.prepare_frame().write_index, 0);
    }

    #[test]
    fn spatial_modes_pin_buffer_zero() {
        let mut s = session();
        s.set_resolve_mode(ResolveMode::Bilinear);
        for _ in 0..3 {
            s.frame_move(0.016);
            assert_eq!(s.prepare_frame().write_index, 0);
        }
    }

    #[test]
    fn disabled_pins_buffer_zero() {
        let mut s = session();
        s.set_enabled(false);
        s.frame_move(0.016);
        assert_eq!(s.temporal().buffer_index(), 0);
    }

    #[test]
    fn pause_freezes_index_clock_and_jitter() {
        let mut s = session();
        s.frame_move(0.016);
        let running = s.prepare_frame();
        let time = s.clock().time();

        s.set_paused(true);
        for _ in 0..3 {
            s.frame_move(0.016);
            let plan = s.prepare_frame();
            assert_eq!(plan.write_index, 1);
            assert_eq!(plan.jitter, running.jitter);
        }
        assert_eq!(s.clock().time(), time);
    }

    #[test]
    fn paused_on_buffer_one_resolves_buffer_zero() {
        let mut s = session();
        s.frame_move(0.016);
        s.prepare_frame();
        s.set_paused(true);
        let plan = s.prepare_frame();
        assert_eq!(plan.write_index, 1);
        assert_eq!(plan.resolve.current_index, 0);
        assert_eq!(plan.resolve.previous_index, 1);
        assert_eq!(plan.resolve.jitter_previous, s.temporal().current_jitter());
    }

    // ── prepare_frame ─────────────────────────────────────────────────────

    #[test]
    fn jitter_only_for_temporal_modes() {
        let mut s = session();
        s.frame_move(0.016);
        let plan = s.prepare_frame();
        assert_eq!(plan.jitter, Some(Vec2::new(0.5 / 1280.0, 0.5 / 720.0)));
        assert!(matches!(plan.resolve_constants, ResolveConstants::Temporal { noise: None, .. }));

        s.set_resolve_mode(ResolveMode::Bicubic);
        let plan = s.prepare_frame();
        assert_eq!(plan.jitter, None);
        assert!(matches!(plan.resolve_constants, ResolveConstants::Bicubic { .. }));
    }

    #[test]
    fn jitter_is_relative_to_active_viewport() {
        let mut s = manual_session();
        s.request_manual_scale(0.5, 0.5);
        s.frame_move(0.016);
        let plan = s.prepare_frame();
        assert_eq!(plan.viewport.width, 640.0);
        assert_eq!(plan.jitter, Some(Vec2::new(0.5 / 640.0, 0.5 / 360.0)));
        assert_eq!(plan.post_process.rt_ratio, Vec2::splat(0.5));
    }

    #[test]
    fn resolve_none_samples_unscaled() {
        let mut s = manual_session();
        s.request_manual_scale(0.5, 0.5);
        s.set_resolve_mode(ResolveMode::None);
        let plan = s.prepare_frame();
        assert_eq!(
            plan.resolve_constants,
            ResolveConstants::Unscaled(PostProcessConstants::unscaled())
        );
    }

    #[test]
    fn motion_blur_constants_follow_toggle() {
        let mut s = session();
        assert!(s.prepare_frame().motion_blur.is_some());
        s.set_motion_blur(false);
        assert!(s.prepare_frame().motion_blur.is_none());
    }

    #[test]
    fn disabled_renders_at_backbuffer_size() {
        let mut s = manual_session();
        s.request_manual_scale(0.5, 0.5);
        s.set_enabled(false);
        let plan = s.prepare_frame();
        assert!(!plan.dynamic);
        assert_eq!(plan.viewport, Viewport::new(1280.0, 720.0));
        assert_eq!(plan.jitter, None);
    }

    #[test]
    fn noise_offsets_stay_in_unit_square() {
        let mut s = session();
        s.set_resolve_mode(ResolveMode::Noise);
        for _ in 0..64 {
            s.frame_move(0.016);
            let ResolveConstants::Noise { noise, .. } = s.prepare_frame().resolve_constants else {
                panic!("expected noise constants");
            };
            assert!((0.0..1.0).contains(&noise.offset.x));
            assert!((0.0..1.0).contains(&noise.offset.y));
        }
    }

    // ── control ───────────────────────────────────────────────────────────

    #[test]
    fn control_step_lowers_scale_when_over_budget() {
        let mut s = session();
        for _ in 0..20 {
            s.control_step(2.0 / 60.0, 30.0);
        }
        assert!(s.resolution().scale_x() < 1.0);
    }

    #[test]
    fn control_step_is_inert_when_disabled() {
        let mut s = session();
        s.set_enabled(false);
        s.control_step(1.0, 1.0);
        assert_eq!(s.resolution().scale_x(), 1.0);
    }

    #[test]
    fn zero_fps_uses_gpu_time_only() {
        let mut s = session();
        s.request_manual_scale(0.5, 0.5);
        s.set_control_mode(ControlMode::VSync);
        s.control_step(0.0, 0.0);
        assert!(s.resolution().scale_x() <= 1.0);
        assert!(s.controller().controlled_scale() <= 1.0);
    }

    // ── manual ────────────────────────────────────────────────────────────

    #[test]
    fn locked_percent_sets_both_axes() {
        let mut s = manual_session();
        s.request_manual_percent(ScaleAxis::Y, 50);
        assert_eq!(s.resolution().current_width(), 640);
        assert_eq!(s.resolution().current_height(), 360);
    }

    #[test]
    fn unlocked_percent_sets_one_axis() {
        let mut s = manual_session();
        s.set_aspect_ratio_lock(false);
        s.request_manual_percent(ScaleAxis::X, 50);
        assert_eq!(s.resolution().current_width(), 640);
        assert_eq!(s.resolution().current_height(), 720);
    }
}
