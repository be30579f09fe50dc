use crate::coords::Viewport;

/// One texture plus its default view.
#[derive(Debug)]
pub struct Target {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl Target {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Final color and velocity written by one frame and read back as history by
/// the next.
#[derive(Debug)]
pub struct HistorySet {
    pub final_color: Target,
    pub velocity: Target,
}

/// Off-screen targets the scene renders into at a dynamic resolution.
///
/// Allocated once at the dynamic buffer size and only recreated when the
/// backbuffer or supersampling cap changes; per-frame scaling only moves the
/// viewport.
#[derive(Debug)]
pub struct DynamicTargets {
    width: u32,
    height: u32,
    color_format: wgpu::TextureFormat,

    /// Scene color, input of the post-process pass.
    pub color: Target,
    pub depth: Target,
    /// Ping-pong pair indexed by the temporal buffer index.
    pub history: [HistorySet; 2],
}

impl DynamicTargets {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const VELOCITY_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg16Float;

    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::COPY_DST;

        let history = |i: usize| HistorySet {
            final_color: Target::new(
                device,
                &format!("dynamic final color {i}"),
                width,
                height,
                color_format,
                sampled,
            ),
            velocity: Target::new(
                device,
                &format!("dynamic velocity {i}"),
                width,
                height,
                Self::VELOCITY_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            ),
        };

        log::debug!("allocating dynamic targets {width}x{height} ({color_format:?})");

        Self {
            width,
            height,
            color_format,
            color: Target::new(device, "dynamic color", width, height, color_format, sampled),
            depth: Target::new(
                device,
                "dynamic depth",
                width,
                height,
                Self::DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            history: [history(0), history(1)],
        }
    }

    /// Recreates the targets if the requested size or format differs.
    ///
    /// Returns whether a reallocation happened.
    pub fn ensure(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
        color_format: wgpu::TextureFormat,
    ) -> bool {
        if self.matches(width, height, color_format) {
            return false;
        }
        *self = Self::new(device, width, height, color_format);
        true
    }

    fn matches(&self, width: u32, height: u32, color_format: wgpu::TextureFormat) -> bool {
        self.width == width && self.height == height && self.color_format == color_format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Pair written by the frame with `buffer_index`.
    pub fn history(&self, buffer_index: usize) -> &HistorySet {
        &self.history[buffer_index & 1]
    }

    /// Texel extent covered by `viewport`, clamped to the allocation.
    pub fn active_extent(&self, viewport: Viewport) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: (viewport.width as u32).clamp(1, self.width),
            height: (viewport.height as u32).clamp(1, self.height),
            depth_or_array_layers: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Returns None when no adapter is available (headless CI).
    fn create_test_device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;
        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some(device)
    }

    #[test]
    fn allocates_all_targets_at_dynamic_size() {
        let Some(device) = create_test_device() else {
            println!("Skipping target test: no adapter.");
            return;
        };

        let format = wgpu::TextureFormat::Rgba8Unorm;
        let mut targets = DynamicTargets::new(&device, 640, 360, format);
        assert_eq!(targets.size(), (640, 360));
        assert_eq!(targets.depth.texture.format(), DynamicTargets::DEPTH_FORMAT);
        for i in 0..2 {
            let set = targets.history(i);
            assert_eq!(set.final_color.texture.width(), 640);
            assert_eq!(set.velocity.texture.format(), DynamicTargets::VELOCITY_FORMAT);
        }

        assert!(!targets.ensure(&device, 640, 360, format));
        assert!(targets.ensure(&device, 1280, 720, format));
        assert_eq!(targets.color.texture.height(), 720);
    }

    #[test]
    fn active_extent_clamps_to_allocation() {
        let Some(device) = create_test_device() else {
            println!("Skipping target test: no adapter.");
            return;
        };

        let targets = DynamicTargets::new(&device, 100, 50, wgpu::TextureFormat::Rgba8Unorm);
        let e = targets.active_extent(Viewport::new(80.5, 400.0));
        assert_eq!((e.width, e.height), (80, 50));
    }
}
