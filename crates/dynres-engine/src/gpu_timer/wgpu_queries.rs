use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::pipeline::{PIPELINE_DEPTH, QueryReadback, RawTimestamps, TimestampQueries};

/// Bytes of one resolved start/stop pair.
const PAIR_SIZE: wgpu::BufferAddress = 2 * std::mem::size_of::<u64>() as wgpu::BufferAddress;

#[derive(Debug)]
enum SlotState {
    Idle,
    /// Resolve and copy recorded; waiting for submission.
    Recorded,
    /// `map_async` scheduled; the flag is set by the callback.
    Mapping { done: Arc<AtomicBool>, failed: Arc<AtomicBool> },
}

#[derive(Debug)]
struct QuerySlot {
    resolve: wgpu::Buffer,
    readback: wgpu::Buffer,
    state: SlotState,
}

/// `TimestampQueries` backed by a wgpu timestamp `QuerySet`.
///
/// Slot `i` owns timestamps `2i` (start) and `2i + 1` (stop). wgpu has no
/// disjoint query, so samples are never reported as disjoint; a failed buffer
/// map is reported that way instead so the slot is retired and discarded.
#[derive(Debug)]
pub struct WgpuTimestampQueries {
    device: wgpu::Device,
    query_set: wgpu::QuerySet,
    slots: Vec<QuerySlot>,
    frequency: u64,
}

impl WgpuTimestampQueries {
    /// Features needed to write timestamps between passes.
    pub const REQUIRED_FEATURES: wgpu::Features = wgpu::Features::TIMESTAMP_QUERY
        .union(wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS);

    pub fn feature_available(features: wgpu::Features) -> bool {
        features.contains(Self::REQUIRED_FEATURES)
    }

    /// Returns `None` when the device was created without timestamp support.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> Option<Self> {
        if !Self::feature_available(device.features()) {
            return None;
        }

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some(label),
            ty: wgpu::QueryType::Timestamp,
            count: (PIPELINE_DEPTH * 2) as u32,
        });

        let slots = (0..PIPELINE_DEPTH)
            .map(|i| QuerySlot {
                resolve: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} resolve {i}")),
                    size: PAIR_SIZE,
                    usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
                    mapped_at_creation: false,
                }),
                readback: device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} readback {i}")),
                    size: PAIR_SIZE,
                    usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                    mapped_at_creation: false,
                }),
                state: SlotState::Idle,
            })
            .collect();

        Some(Self {
            device: device.clone(),
            query_set,
            slots,
            frequency: frequency_from_period(queue.get_timestamp_period()),
        })
    }

    pub fn frequency(&self) -> u64 {
        self.frequency
    }

    fn finish(&mut self, slot: usize, failed: bool) -> QueryReadback {
        let frequency = self.frequency;
        let entry = &mut self.slots[slot];
        entry.state = SlotState::Idle;

        if failed {
            log::debug!("timestamp readback {slot} failed to map; discarding");
            return QueryReadback::Ready(RawTimestamps {
                start: 0,
                stop: 0,
                frequency,
                disjoint: true,
            });
        }

        let [start, stop] = {
            let data = entry.readback.slice(..).get_mapped_range();
            bytemuck::pod_read_unaligned::<[u64; 2]>(&data[..PAIR_SIZE as usize])
        };
        entry.readback.unmap();

        QueryReadback::Ready(RawTimestamps {
            start,
            stop,
            frequency,
            disjoint: false,
        })
    }
}

/// Converts wgpu's nanoseconds-per-tick into ticks per second.
fn frequency_from_period(period_ns: f32) -> u64 {
    if period_ns > 0.0 && period_ns.is_finite() {
        (1.0e9 / period_ns as f64).round() as u64
    } else {
        0
    }
}

impl TimestampQueries for WgpuTimestampQueries {
    type Encoder = wgpu::CommandEncoder;

    fn write_begin(&mut self, slot: usize, encoder: &mut wgpu::CommandEncoder) {
        encoder.write_timestamp(&self.query_set, (slot * 2) as u32);
    }

    fn write_end(&mut self, slot: usize, encoder: &mut wgpu::CommandEncoder) {
        let first = (slot * 2) as u32;
        encoder.write_timestamp(&self.query_set, first + 1);

        let entry = &mut self.slots[slot];
        encoder.resolve_query_set(&self.query_set, first..first + 2, &entry.resolve, 0);
        encoder.copy_buffer_to_buffer(&entry.resolve, 0, &entry.readback, 0, PAIR_SIZE);
        entry.state = SlotState::Recorded;
    }

    fn submitted(&mut self) {
        for entry in &mut self.slots {
            if !matches!(entry.state, SlotState::Recorded) {
                continue;
            }

            let done = Arc::new(AtomicBool::new(false));
            let failed = Arc::new(AtomicBool::new(false));
            let (done_cb, failed_cb) = (done.clone(), failed.clone());

            entry
                .readback
                .slice(..)
                .map_async(wgpu::MapMode::Read, move |res| {
                    if let Err(e) = res {
                        log::debug!("timestamp readback map_async failed: {e:?}");
                        failed_cb.store(true, Ordering::Release);
                    }
                    done_cb.store(true, Ordering::Release);
                });

            entry.state = SlotState::Mapping { done, failed };
        }
    }

    fn read(&mut self, slot: usize) -> QueryReadback {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::trace!("device poll failed: {e:?}");
        }

        let failed = match &self.slots[slot].state {
            SlotState::Mapping { done, failed } if done.load(Ordering::Acquire) => {
                failed.load(Ordering::Acquire)
            }
            _ => return QueryReadback::NotReady,
        };
        self.finish(slot, failed)
    }
}
