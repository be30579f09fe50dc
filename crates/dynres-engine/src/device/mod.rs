//! GPU device, surface and render-target management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue, with timestamp queries when available
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and providing encoders/views for rendering
//! - allocating the fixed-size dynamic resolution targets

mod gpu;
mod targets;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
pub use targets::{DynamicTargets, HistorySet, Target};
