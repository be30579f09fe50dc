//! dynres engine crate.
//!
//! Dynamic resolution control and the temporal resolve pipeline that sits
//! behind it, plus the platform and GPU runtime pieces the studio binary uses.
//!
//! The CPU-side state machines (`control`, `resolution`, `temporal`,
//! `session`) are independent of wgpu and testable without a device.

pub mod control;
pub mod coords;
pub mod core;
pub mod device;
pub mod gpu_timer;
pub mod logging;
pub mod resolution;
pub mod session;
pub mod temporal;
pub mod time;
pub mod window;
