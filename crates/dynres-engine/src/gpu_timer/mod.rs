//! GPU frame timing.
//!
//! Timestamp queries are pipelined several frames deep so reading results never
//! stalls the CPU on the GPU:
//! - `GpuTimer` owns a fixed ring of query slots and hands out raw intervals
//! - `AveragedGpuTimer` turns intervals into seconds averaged over a window
//! - `PhaseTimers` groups one averaged timer per labeled frame phase
//!
//! The graphics API is reached through the `TimestampQueries` seam; the wgpu
//! implementation lives in `WgpuTimestampQueries`.

mod averaged;
mod phases;
mod pipeline;
mod wgpu_queries;

#[cfg(test)]
pub(crate) mod testing;

pub use averaged::{AveragedGpuTimer, AveragedTime};
pub use phases::{Phase, PhaseTimers, PhaseTimes};
pub use pipeline::{
    GpuTimer, IntervalPoll, QueryReadback, RawTimestamps, TimerError, TimestampQueries,
    TimingSample, PIPELINE_DEPTH,
};
pub use wgpu_queries::WgpuTimestampQueries;
