//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window (or per render loop)
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - feed `FrameTime::dt` into a `SmoothedClock` to drive simulation time

mod frame_clock;
mod smoothed;

pub use frame_clock::{FrameClock, FrameTime};
pub use smoothed::SmoothedClock;
