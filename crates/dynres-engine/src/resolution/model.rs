use crate::coords::{Vec2, Viewport};

/// Integer resolution readout for UI display, in percent of the backbuffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScalePercent {
    pub x: u32,
    pub y: u32,
}

/// Dynamic render-target sizing and the current scale within it.
///
/// The dynamic targets are allocated once at `dynamic_buffer_width/height`, an
/// integer multiple of the backbuffer bounded by the device maximum and the
/// supersampling cap. Scaling never reallocates: it only changes the viewport.
///
/// The stored scale is always re-derived from the floored pixel count, so the
/// value reported by `scale_x()` describes what is actually rendered rather
/// than what was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicResolution {
    backbuffer_width: u32,
    backbuffer_height: u32,
    max_width: u32,
    max_height: u32,

    dynamic_rt_width: u32,
    dynamic_rt_height: u32,

    current_width: f32,
    current_height: f32,

    scale_x: f32,
    scale_y: f32,
    max_scale_x: f32,
    max_scale_y: f32,
}

impl Default for DynamicResolution {
    fn default() -> Self {
        Self {
            backbuffer_width: 1280,
            backbuffer_height: 720,
            max_width: 2048,
            max_height: 2048,
            dynamic_rt_width: 1280,
            dynamic_rt_height: 720,
            current_width: 1280.0,
            current_height: 720.0,
            scale_x: 1.0,
            scale_y: 1.0,
            max_scale_x: 1.0,
            max_scale_y: 1.0,
        }
    }
}

impl DynamicResolution {
    /// Creates a model already initialized for the given backbuffer.
    pub fn new(
        backbuffer_width: u32,
        backbuffer_height: u32,
        max_width: u32,
        max_height: u32,
        max_scaling: u32,
    ) -> Self {
        let mut res = Self::default();
        res.initialize(backbuffer_width, backbuffer_height, max_width, max_height, max_scaling);
        res
    }

    /// Recomputes the dynamic target size for a new backbuffer or supersampling cap.
    ///
    /// Must be called whenever the backbuffer is resized or the cap changes, and
    /// never in the middle of a frame. The previously requested scale is
    /// re-applied against the new limits.
    pub fn initialize(
        &mut self,
        backbuffer_width: u32,
        backbuffer_height: u32,
        max_width: u32,
        max_height: u32,
        max_scaling: u32,
    ) {
        assert!(
            backbuffer_width > 0 && backbuffer_height > 0,
            "backbuffer must be at least 1x1"
        );
        assert!(max_scaling >= 1, "supersampling cap must be at least 1");

        self.backbuffer_width = backbuffer_width;
        self.backbuffer_height = backbuffer_height;
        self.max_width = max_width;
        self.max_height = max_height;

        self.dynamic_rt_width = dynamic_extent(backbuffer_width, max_width, max_scaling);
        self.dynamic_rt_height = dynamic_extent(backbuffer_height, max_height, max_scaling);
        self.max_scale_x = self.dynamic_rt_width as f32 / backbuffer_width as f32;
        self.max_scale_y = self.dynamic_rt_height as f32 / backbuffer_height as f32;

        log::debug!(
            "dynamic resolution: backbuffer {}x{}, dynamic rt {}x{}, max scale {:.2}x{:.2}",
            backbuffer_width,
            backbuffer_height,
            self.dynamic_rt_width,
            self.dynamic_rt_height,
            self.max_scale_x,
            self.max_scale_y,
        );

        self.set_scale(self.scale_x, self.scale_y);
    }

    /// Sets the scale relative to the backbuffer, per axis.
    ///
    /// Values above the axis maximum are clamped down to it. There is no lower
    /// clamp beyond keeping at least one pixel; the controller owns the lower
    /// bound. Calling this twice with the same input yields the same state.
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) {
        let scale_x = scale_x.min(self.max_scale_x);
        let scale_y = scale_y.min(self.max_scale_y);

        self.current_width = discretize(self.dynamic_rt_width, scale_x, self.max_scale_x);
        self.current_height = discretize(self.dynamic_rt_height, scale_y, self.max_scale_y);

        self.scale_x = self.current_width * self.max_scale_x / self.dynamic_rt_width as f32;
        self.scale_y = self.current_height * self.max_scale_y / self.dynamic_rt_height as f32;
    }

    /// Viewport covering the currently active region of the dynamic targets.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.current_width, self.current_height)
    }

    pub fn scale_x(&self) -> f32 {
        self.scale_x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale_y
    }

    /// Fraction of the dynamic render target in use along X.
    pub fn rt_scale_x(&self) -> f32 {
        self.scale_x / self.max_scale_x
    }

    /// Fraction of the dynamic render target in use along Y.
    pub fn rt_scale_y(&self) -> f32 {
        self.scale_y / self.max_scale_y
    }

    /// Both RT ratios, as consumed by the resolve shader constants.
    pub fn rt_ratio(&self) -> Vec2 {
        Vec2::new(self.rt_scale_x(), self.rt_scale_y())
    }

    pub fn max_scale_x(&self) -> f32 {
        self.max_scale_x
    }

    pub fn max_scale_y(&self) -> f32 {
        self.max_scale_y
    }

    pub fn dynamic_buffer_width(&self) -> u32 {
        self.dynamic_rt_width
    }

    pub fn dynamic_buffer_height(&self) -> u32 {
        self.dynamic_rt_height
    }

    pub fn backbuffer_width(&self) -> u32 {
        self.backbuffer_width
    }

    pub fn backbuffer_height(&self) -> u32 {
        self.backbuffer_height
    }

    /// Active viewport width in whole pixels.
    pub fn current_width(&self) -> u32 {
        self.current_width as u32
    }

    /// Active viewport height in whole pixels.
    pub fn current_height(&self) -> u32 {
        self.current_height as u32
    }

    /// Truncated percentage readout of the effective scale.
    pub fn scale_percent(&self) -> ScalePercent {
        ScalePercent {
            x: (100.0 * self.scale_x) as u32,
            y: (100.0 * self.scale_y) as u32,
        }
    }
}

/// Largest integer multiple of `backbuffer` that fits `max` and the cap.
fn dynamic_extent(backbuffer: u32, max: u32, max_scaling: u32) -> u32 {
    let multiple = max / backbuffer;
    if multiple > 1 {
        multiple.min(max_scaling) * backbuffer
    } else {
        backbuffer
    }
}

fn discretize(dynamic_extent: u32, scale: f32, max_scale: f32) -> f32 {
    (dynamic_extent as f32 * scale / max_scale).floor().max(1.0)
}
