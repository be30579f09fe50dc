use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use dynres_engine::control::ControlMode;
use dynres_engine::core::{App, AppControl, FrameCtx};
use dynres_engine::device::DynamicTargets;
use dynres_engine::gpu_timer::{PhaseTimers, WgpuTimestampQueries};
use dynres_engine::session::{DynamicResolutionSession, FrameStats, ScaleAxis, SessionConfig};

use crate::passes::{record_frame, SceneTimers};

/// Step of a manual scale request, in percent.
const MANUAL_STEP: u32 = 10;

/// Demo application: one dynamic resolution session rendering into one window.
///
/// GPU state is created lazily on the first frame since `on_window_event` has
/// no device access.
#[derive(Default)]
pub struct Studio {
    session: Option<DynamicResolutionSession>,
    targets: Option<DynamicTargets>,
    /// `None` when the device lacks timestamp queries.
    timers: Option<SceneTimers>,
    timers_probed: bool,
}

impl Studio {
    fn on_key(&mut self, key: KeyCode) -> AppControl {
        if key == KeyCode::Escape {
            return AppControl::Exit;
        }

        let Some(session) = self.session.as_mut() else {
            return AppControl::Continue;
        };

        match key {
            KeyCode::KeyP => session.toggle_paused(),
            KeyCode::KeyM => session.set_resolve_mode(session.resolve_mode().next()),
            KeyCode::KeyS => session.set_supersampling(!session.supersampling()),
            KeyCode::KeyC => {
                let mode = next_control_mode(session.controller().mode());
                log::info!("control mode: {}", mode.label());
                session.set_control_mode(mode);
            }
            KeyCode::KeyJ => {
                let pattern = session.jitter_pattern().toggled();
                log::info!("jitter pattern: {pattern:?}");
                session.set_jitter_pattern(pattern);
            }
            KeyCode::KeyD => session.set_enabled(!session.is_enabled()),
            KeyCode::KeyB => session.set_motion_blur(!session.motion_blur()),
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let current = session.resolution().scale_percent().x;
                let percent = if key == KeyCode::ArrowUp {
                    current.saturating_add(MANUAL_STEP)
                } else {
                    current.saturating_sub(MANUAL_STEP)
                };
                session.set_control_mode(ControlMode::Manual);
                session.request_manual_percent(ScaleAxis::X, percent);
            }
            _ => {}
        }
        AppControl::Continue
    }
}

fn next_control_mode(mode: ControlMode) -> ControlMode {
    match mode {
        ControlMode::VSync => ControlMode::HalfVSync,
        ControlMode::HalfVSync => ControlMode::Manual,
        ControlMode::Manual => ControlMode::VSync,
    }
}

impl App for Studio {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                if let Some(session) = self.session.as_mut() {
                    session.on_backbuffer_resized(size.width, size.height);
                }
                AppControl::Continue
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.on_key(*key),
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        if !self.timers_probed {
            self.timers_probed = true;
            let gpu = &*ctx.gpu;
            self.timers = gpu
                .supports_timestamps()
                .then(|| {
                    PhaseTimers::try_new(|phase| {
                        WgpuTimestampQueries::new(gpu.device(), gpu.queue(), phase.label())
                    })
                })
                .flatten();
            if self.timers.is_none() {
                log::warn!(
                    "{}: timestamp queries unavailable; steering on frame time",
                    gpu.adapter_name()
                );
            }
        }

        let max_texture = ctx.gpu.max_texture_dimension_2d();
        let session = self.session.get_or_insert_with(|| {
            let config = SessionConfig::default().with_device_limit(max_texture);
            DynamicResolutionSession::new(config, size.width, size.height)
        });
        session.set_refresh_rate(ctx.refresh_rate);

        // Without timestamps the whole frame stands in for the GPU time.
        let gpu_time = match self.timers.as_mut() {
            Some(timers) => {
                let times = timers.poll();
                if times.stats_updated {
                    let stats = FrameStats::new(&times, session);
                    stats.log();
                    ctx.runtime.set_title(format!(
                        "dynres studio | {} | {}% x {}%",
                        session.resolve_mode().label(),
                        stats.scale.x,
                        stats.scale.y
                    ));
                }
                times.inner_frame()
            }
            None => ctx.time.measured_frame_time(),
        };
        session.control_step(gpu_time, ctx.time.fps);

        let format = ctx.gpu.surface_format();
        let (width, height) = (
            session.resolution().dynamic_buffer_width(),
            session.resolution().dynamic_buffer_height(),
        );
        let device = ctx.gpu.device();
        let reallocate = session.take_targets_dirty();
        let targets = match self.targets.as_mut() {
            Some(targets) => {
                if reallocate {
                    targets.ensure(device, width, height, format);
                }
                targets
            }
            None => self
                .targets
                .insert(DynamicTargets::new(device, width, height, format)),
        };

        session.frame_move(ctx.time.dt);
        let plan = session.prepare_frame();
        let scene_time = session.clock().time();

        let timers = &mut self.timers;
        let control = ctx.render(|gpu, frame| {
            record_frame(gpu, frame, &plan, targets, timers.as_mut(), scene_time);
        });

        if let Some(timers) = self.timers.as_mut() {
            timers.submitted();
        }
        control
    }
}
