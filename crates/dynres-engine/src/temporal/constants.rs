//! Uniform records shared with the post-process and resolve shaders.
//!
//! Every record is a multiple of 16 bytes so it can be bound as a uniform
//! buffer without padding.

use crate::coords::Vec2;

/// Divisor mapping velocity in pixels to the alpha channel of the motion blur
/// output.
pub const VELOCITY_TO_ALPHA_SCALE: f32 = 16.0;

/// Edge length of the tiling noise texture in texels.
pub const NOISE_TEXTURE_SIZE: f32 = 128.0;

/// Active region of the dynamic target in UV units, for passes reading it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PostProcessConstants {
    pub rt_ratio: Vec2,
    pub _pad: [f32; 2],
}

impl PostProcessConstants {
    pub fn new(rt_ratio: Vec2) -> Self {
        Self {
            rt_ratio,
            _pad: [0.0; 2],
        }
    }

    /// Full-target sampling, used when the resolve shows the region unscaled.
    pub fn unscaled() -> Self {
        Self::new(Vec2::splat(1.0))
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MotionBlurConstants {
    pub rt_ratio: Vec2,
    /// Dynamic target size divided by `VELOCITY_TO_ALPHA_SCALE`.
    pub velocity_to_alpha: Vec2,
}

impl MotionBlurConstants {
    pub fn new(rt_ratio: Vec2, dynamic_width: u32, dynamic_height: u32) -> Self {
        Self {
            rt_ratio,
            velocity_to_alpha: Vec2::new(
                dynamic_width as f32 / VELOCITY_TO_ALPHA_SCALE,
                dynamic_height as f32 / VELOCITY_TO_ALPHA_SCALE,
            ),
        }
    }
}

/// Vertex constants of the temporal resolve: index 0 is the frame sampled as
/// current, index 1 the history.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TemporalVsConstants {
    pub rt_ratio0: Vec2,
    pub offset0: Vec2,
    pub rt_ratio1: Vec2,
    pub offset1: Vec2,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TemporalPsConstants {
    /// Converts UV velocity into pixels of the dynamic target.
    pub velocity_scale: Vec2,
    /// `x` undoes the velocity-to-alpha packing; `y` unused.
    pub velocity_alpha_scale: Vec2,
}

impl TemporalPsConstants {
    pub fn new(dynamic_width: u32, dynamic_height: u32) -> Self {
        Self {
            velocity_scale: Vec2::new(dynamic_width as f32, dynamic_height as f32),
            velocity_alpha_scale: Vec2::new(
                VELOCITY_TO_ALPHA_SCALE * VELOCITY_TO_ALPHA_SCALE,
                0.0,
            ),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BicubicConstants {
    /// `(1 / width, 0)`
    pub texel_x: Vec2,
    /// `(0, 1 / height)`
    pub texel_y: Vec2,
    /// `(width, height, 0, 0)` of the source target.
    pub source_size: [f32; 4],
}

impl BicubicConstants {
    pub fn new(dynamic_width: u32, dynamic_height: u32) -> Self {
        let (w, h) = (dynamic_width as f32, dynamic_height as f32);
        Self {
            texel_x: Vec2::new(1.0 / w, 0.0),
            texel_y: Vec2::new(0.0, 1.0 / h),
            source_size: [w, h, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NoiseConstants {
    pub tex_scale: Vec2,
    pub offset: Vec2,
    pub scale: [f32; 4],
}

impl NoiseConstants {
    /// Additive noise: strength grows as the resolution drops.
    ///
    /// `offset` animates the noise; callers pass a fresh value in `[0, 1)` per
    /// frame.
    pub fn additive(rt_ratio: Vec2, offset: Vec2) -> Self {
        Self {
            tex_scale: Vec2::splat(NOISE_TEXTURE_SIZE),
            offset,
            scale: [2.0 - (rt_ratio.x + rt_ratio.y), 0.0, 0.0, 0.0],
        }
    }

    /// Sample offsets of up to half a dynamic-target texel.
    pub fn sample_offset(dynamic_width: u32, dynamic_height: u32) -> Self {
        Self {
            tex_scale: Vec2::splat(NOISE_TEXTURE_SIZE),
            offset: Vec2::zero(),
            scale: [
                0.5 / dynamic_width as f32,
                0.5 / dynamic_height as f32,
                0.0,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn records_are_uniform_sized() {
        use std::mem::size_of;
        assert_eq!(size_of::<PostProcessConstants>(), 16);
        assert_eq!(size_of::<MotionBlurConstants>(), 16);
        assert_eq!(size_of::<TemporalVsConstants>(), 32);
        assert_eq!(size_of::<TemporalPsConstants>(), 16);
        assert_eq!(size_of::<BicubicConstants>(), 32);
        assert_eq!(size_of::<NoiseConstants>(), 32);
    }

    #[test]
    fn vs_constants_byte_order() {
        let c = TemporalVsConstants {
            rt_ratio0: Vec2::new(1.0, 2.0),
            offset0: Vec2::new(3.0, 4.0),
            rt_ratio1: Vec2::new(5.0, 6.0),
            offset1: Vec2::new(7.0, 8.0),
        };
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&c));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn motion_blur_packs_dims_over_sixteen() {
        let c = MotionBlurConstants::new(Vec2::splat(0.5), 2560, 1440);
        assert_eq!(c.velocity_to_alpha, Vec2::new(160.0, 90.0));
    }

    #[test]
    fn temporal_ps_scales() {
        let c = TemporalPsConstants::new(1280, 720);
        assert_eq!(c.velocity_scale, Vec2::new(1280.0, 720.0));
        assert_eq!(c.velocity_alpha_scale.x, 256.0);
    }

    #[test]
    fn bicubic_texel_steps() {
        let c = BicubicConstants::new(1024, 512);
        assert_eq!(c.texel_x, Vec2::new(1.0 / 1024.0, 0.0));
        assert_eq!(c.texel_y, Vec2::new(0.0, 1.0 / 512.0));
        assert_eq!(c.source_size, [1024.0, 512.0, 0.0, 0.0]);
    }

    #[test]
    fn additive_noise_vanishes_at_full_resolution() {
        let c = NoiseConstants::additive(Vec2::splat(1.0), Vec2::new(0.3, 0.6));
        assert_eq!(c.scale[0], 0.0);
        assert_eq!(c.tex_scale, Vec2::splat(128.0));

        let c = NoiseConstants::additive(Vec2::splat(0.5), Vec2::zero());
        assert_eq!(c.scale[0], 1.0);
    }

    #[test]
    fn sample_offset_is_half_texel() {
        let c = NoiseConstants::sample_offset(1000, 500);
        assert_eq!(c.scale[0], 0.0005);
        assert_eq!(c.scale[1], 0.001);
    }
}
