//! Scripted `TimestampQueries` backend for CPU-only tests.

use super::pipeline::{QueryReadback, RawTimestamps, TimestampQueries, PIPELINE_DEPTH};

#[derive(Debug, Default)]
pub(crate) struct ScriptedQueries {
    pub frequency: u64,
    pub results: [Option<RawTimestamps>; PIPELINE_DEPTH],
    /// `(begin slot, end slot)` per completed pair, in issue order.
    pub writes: Vec<(usize, usize)>,
    pending_begin: Option<usize>,
    pub submissions: usize,
}

impl ScriptedQueries {
    pub fn new(frequency: u64) -> Self {
        Self {
            frequency,
            ..Self::default()
        }
    }

    /// Makes the interval in `slot` readable.
    pub fn complete(&mut self, slot: usize, start: u64, stop: u64) {
        self.results[slot] = Some(RawTimestamps {
            start,
            stop,
            frequency: self.frequency,
            disjoint: false,
        });
    }

    pub fn complete_disjoint(&mut self, slot: usize) {
        self.results[slot] = Some(RawTimestamps {
            start: 0,
            stop: 1,
            frequency: self.frequency,
            disjoint: true,
        });
    }
}

impl TimestampQueries for ScriptedQueries {
    type Encoder = ();

    fn write_begin(&mut self, slot: usize, _encoder: &mut ()) {
        self.pending_begin = Some(slot);
        self.results[slot] = None;
    }

    fn write_end(&mut self, slot: usize, _encoder: &mut ()) {
        let begin = self.pending_begin.take().expect("end without begin");
        self.writes.push((begin, slot));
    }

    fn read(&mut self, slot: usize) -> QueryReadback {
        match self.results[slot].take() {
            Some(raw) => QueryReadback::Ready(raw),
            None => QueryReadback::NotReady,
        }
    }

    fn submitted(&mut self) {
        self.submissions += 1;
    }
}
