//! Dynamic resolution model.
//!
//! Computes the fixed allocation size of the dynamic render targets and the
//! per-frame viewport carved out of them. Everything here is pure arithmetic;
//! no GPU resources are touched.

mod model;

pub use model::{DynamicResolution, ScalePercent};
