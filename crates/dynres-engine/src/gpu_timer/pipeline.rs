/// Number of begin/end intervals that may be outstanding at once.
///
/// Results typically arrive two or three frames after submission; four slots
/// keep one spare so `begin` does not start failing under normal latency.
pub const PIPELINE_DEPTH: usize = 4;

/// Raw values read back for one query slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawTimestamps {
    pub start: u64,
    pub stop: u64,
    /// Timestamp ticks per second.
    pub frequency: u64,
    /// The clock domain changed during the interval; the ticks are meaningless.
    pub disjoint: bool,
}

/// Non-blocking readback result for one query slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum QueryReadback {
    NotReady,
    Ready(RawTimestamps),
}

/// Graphics-API side of the timer: issues and reads back timestamp queries.
///
/// Slots are indices in `0..PIPELINE_DEPTH`. `GpuTimer` guarantees a slot is
/// only written again after it has been read back as `Ready`.
pub trait TimestampQueries {
    /// Command recording context the queries are written into.
    type Encoder;

    /// Opens the frequency/disjoint query, then writes the start timestamp.
    fn write_begin(&mut self, slot: usize, encoder: &mut Self::Encoder);

    /// Writes the stop timestamp, then closes the frequency/disjoint query.
    fn write_end(&mut self, slot: usize, encoder: &mut Self::Encoder);

    /// Polls a slot without blocking.
    fn read(&mut self, slot: usize) -> QueryReadback;

    /// Called after the commands recorded this frame have been submitted.
    fn submitted(&mut self) {}
}

/// One retired GPU interval.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TimingSample {
    pub interval_ticks: u64,
    pub frequency: u64,
    pub disjoint: bool,
}

impl TimingSample {
    /// Interval in seconds, or `None` when the sample must be discarded.
    pub fn seconds(&self) -> Option<f64> {
        if self.disjoint || self.frequency == 0 {
            return None;
        }
        Some(self.interval_ticks as f64 / self.frequency as f64)
    }
}

/// Result of polling the oldest outstanding interval.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IntervalPoll {
    /// Nothing has been issued, or an interval is still open.
    Idle,
    /// The oldest interval has not been retired by the GPU yet; retry next frame.
    Pending,
    /// The oldest interval was read and its slot freed.
    Ready(TimingSample),
}

/// Misuse of the begin/end protocol. Never fatal: the interval is simply skipped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum TimerError {
    #[error("a timing interval is already open")]
    IntervalOpen,
    #[error("all {depth} query slots are outstanding")]
    PipelineFull { depth: usize },
    #[error("no timing interval is open")]
    NoOpenInterval,
}

/// Pipelined begin/end interval timer.
///
/// Intervals must be issued in non-interleaved `begin`/`end` pairs; use one
/// timer per measured phase. Results are consumed oldest first.
#[derive(Debug)]
pub struct GpuTimer<Q> {
    queries: Q,
    /// Slot holding the oldest outstanding interval.
    oldest: usize,
    /// Intervals issued and not yet retired.
    issued: usize,
    open: bool,
}

impl<Q: TimestampQueries> GpuTimer<Q> {
    pub fn new(queries: Q) -> Self {
        Self {
            queries,
            oldest: 0,
            issued: 0,
            open: false,
        }
    }

    fn next_free(&self) -> usize {
        (self.oldest + self.issued) % PIPELINE_DEPTH
    }

    /// Starts an interval.
    pub fn begin(&mut self, encoder: &mut Q::Encoder) -> Result<(), TimerError> {
        if self.open {
            return Err(TimerError::IntervalOpen);
        }
        if self.issued >= PIPELINE_DEPTH {
            return Err(TimerError::PipelineFull {
                depth: PIPELINE_DEPTH,
            });
        }

        let slot = self.next_free();
        self.queries.write_begin(slot, encoder);
        self.open = true;
        Ok(())
    }

    /// Ends the open interval.
    pub fn end(&mut self, encoder: &mut Q::Encoder) -> Result<(), TimerError> {
        if !self.open {
            return Err(TimerError::NoOpenInterval);
        }

        let slot = self.next_free();
        self.queries.write_end(slot, encoder);
        self.issued += 1;
        self.open = false;
        Ok(())
    }

    /// Reads the oldest outstanding interval if the GPU has retired it.
    pub fn poll_interval(&mut self) -> IntervalPoll {
        if self.issued == 0 || self.open {
            return IntervalPoll::Idle;
        }

        let raw = match self.queries.read(self.oldest) {
            QueryReadback::NotReady => return IntervalPoll::Pending,
            QueryReadback::Ready(raw) => raw,
        };

        self.oldest = (self.oldest + 1) % PIPELINE_DEPTH;
        self.issued -= 1;

        IntervalPoll::Ready(TimingSample {
            // Out-of-order timestamps clamp to an empty interval.
            interval_ticks: raw.stop.saturating_sub(raw.start),
            frequency: raw.frequency,
            disjoint: raw.disjoint,
        })
    }

    /// Forwards the submission notification to the backend.
    pub fn submitted(&mut self) {
        self.queries.submitted();
    }

    /// Intervals issued and not yet read back.
    pub fn outstanding(&self) -> usize {
        self.issued
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn queries(&self) -> &Q {
        &self.queries
    }

    pub fn queries_mut(&mut self) -> &mut Q {
        &mut self.queries
    }
}
