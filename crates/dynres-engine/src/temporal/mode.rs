use crate::coords::{Vec2, Viewport};

/// Filter used to bring the dynamic target onto the backbuffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ResolveMode {
    /// No scaling: the active region is shown unscaled in the corner.
    None,
    PointMag,
    Bilinear,
    Bicubic,
    /// Bilinear plus animated noise scaled with the resolution loss.
    Noise,
    /// Sample positions perturbed by a noise texture.
    NoiseOffset,
    /// Temporal AA over the jittered history pair.
    #[default]
    TemporalAa,
    /// Temporal AA with noise offset sampling.
    TemporalAaNoiseOffset,
    /// Temporal AA without velocity weighting.
    TemporalAaBasic,
}

impl ResolveMode {
    pub const ALL: [ResolveMode; 9] = [
        ResolveMode::None,
        ResolveMode::PointMag,
        ResolveMode::Bilinear,
        ResolveMode::Bicubic,
        ResolveMode::Noise,
        ResolveMode::NoiseOffset,
        ResolveMode::TemporalAa,
        ResolveMode::TemporalAaNoiseOffset,
        ResolveMode::TemporalAaBasic,
    ];

    /// Reads both history buffers and needs per-frame jitter.
    pub fn uses_history(self) -> bool {
        matches!(
            self,
            ResolveMode::TemporalAa
                | ResolveMode::TemporalAaNoiseOffset
                | ResolveMode::TemporalAaBasic
        )
    }

    /// Samples the noise texture.
    pub fn uses_noise(self) -> bool {
        matches!(
            self,
            ResolveMode::Noise | ResolveMode::NoiseOffset | ResolveMode::TemporalAaNoiseOffset
        )
    }

    /// Next mode in `ALL`, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            ResolveMode::None => "none",
            ResolveMode::PointMag => "point",
            ResolveMode::Bilinear => "bilinear",
            ResolveMode::Bicubic => "bicubic",
            ResolveMode::Noise => "noise",
            ResolveMode::NoiseOffset => "noise offset",
            ResolveMode::TemporalAa => "temporal aa",
            ResolveMode::TemporalAaNoiseOffset => "temporal aa noise offset",
            ResolveMode::TemporalAaBasic => "temporal aa basic",
        }
    }
}

/// Sub-pixel offsets applied to alternate frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum JitterPattern {
    /// Buffer 0 unjittered, buffer 1 offset by half a pixel.
    #[default]
    Asymmetric,
    /// Quarter-pixel offsets on either side of the pixel center.
    Symmetric,
}

impl JitterPattern {
    /// Offset for `buffer_index` in pixels.
    pub fn pixel_offset(self, buffer_index: usize) -> Vec2 {
        let table = match self {
            JitterPattern::Asymmetric => [Vec2::splat(0.0), Vec2::splat(0.5)],
            JitterPattern::Symmetric => [Vec2::splat(-0.25), Vec2::splat(0.25)],
        };
        table[buffer_index & 1]
    }

    /// Offset for `buffer_index` as a fraction of the viewport.
    pub fn offset(self, buffer_index: usize, viewport: Viewport) -> Vec2 {
        let px = self.pixel_offset(buffer_index);
        Vec2::new(px.x / viewport.width, px.y / viewport.height)
    }

    pub fn toggled(self) -> Self {
        match self {
            JitterPattern::Asymmetric => JitterPattern::Symmetric,
            JitterPattern::Symmetric => JitterPattern::Asymmetric,
        }
    }
}
