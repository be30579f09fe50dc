use winit::window::{Window, WindowId};

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Refresh rate assumed when the monitor does not report one.
pub const DEFAULT_REFRESH_RATE: f32 = 60.0;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the drawable size in physical pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }
}

/// Refresh rate of the window's current monitor, falling back to
/// `DEFAULT_REFRESH_RATE`.
pub fn monitor_refresh_rate(window: &Window) -> f32 {
    window
        .current_monitor()
        .and_then(|m| m.refresh_rate_millihertz())
        .filter(|mhz| *mhz > 0)
        .map(|mhz| mhz as f32 / 1000.0)
        .unwrap_or(DEFAULT_REFRESH_RATE)
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    /// Refresh rate of the window's monitor in Hz.
    pub refresh_rate: f32,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires the next surface frame, calls `record` with it, then submits
    /// and presents.
    ///
    /// Surface errors skip the frame; fatal ones return `AppControl::Exit`.
    /// `record` is not called for a skipped frame.
    pub fn render<F>(&mut self, record: F) -> AppControl
    where
        F: FnOnce(&Gpu<'w>, &mut GpuFrame),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface acquire failed: {err}");
                let action = self.gpu.handle_surface_error(err);
                if action == SurfaceErrorAction::Fatal {
                    log::error!("surface out of memory");
                    return AppControl::Exit;
                }
                return AppControl::Continue;
            }
        };

        record(self.gpu, &mut frame);

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
