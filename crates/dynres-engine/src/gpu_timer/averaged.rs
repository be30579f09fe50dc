use super::pipeline::{GpuTimer, IntervalPoll, TimerError, TimestampQueries};

/// Valid samples accumulated before a new average is published.
pub const DEFAULT_AVERAGE_WINDOW: usize = 10;

/// Averaged interval as seen by the caller this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AveragedTime {
    /// Latest published average in seconds; 0 until the first window fills.
    pub seconds: f32,
    /// A new average was published by this update.
    pub updated: bool,
}

/// `GpuTimer` whose samples are averaged over a fixed window.
///
/// Pending, idle and disjoint polls contribute nothing; the previously
/// published average keeps being reported until the window fills again.
#[derive(Debug)]
pub struct AveragedGpuTimer<Q> {
    timer: GpuTimer<Q>,
    window: usize,
    accumulated: f64,
    count: usize,
    average: f32,
}

impl<Q: TimestampQueries> AveragedGpuTimer<Q> {
    pub fn new(queries: Q) -> Self {
        Self::with_window(queries, DEFAULT_AVERAGE_WINDOW)
    }

    pub fn with_window(queries: Q, window: usize) -> Self {
        assert!(window > 0, "average window must be positive");
        Self {
            timer: GpuTimer::new(queries),
            window,
            accumulated: 0.0,
            count: 0,
            average: 0.0,
        }
    }

    #[inline]
    pub fn begin(&mut self, encoder: &mut Q::Encoder) -> Result<(), TimerError> {
        self.timer.begin(encoder)
    }

    #[inline]
    pub fn end(&mut self, encoder: &mut Q::Encoder) -> Result<(), TimerError> {
        self.timer.end(encoder)
    }

    #[inline]
    pub fn submitted(&mut self) {
        self.timer.submitted();
    }

    /// Polls the underlying timer once and folds a valid sample into the window.
    pub fn update(&mut self) -> AveragedTime {
        let mut updated = false;

        match self.timer.poll_interval() {
            IntervalPoll::Ready(sample) => match sample.seconds() {
                Some(seconds) => {
                    self.accumulated += seconds;
                    self.count += 1;
                    if self.count >= self.window {
                        self.average = (self.accumulated / self.count as f64) as f32;
                        self.accumulated = 0.0;
                        self.count = 0;
                        updated = true;
                    }
                }
                None => log::trace!("discarding disjoint gpu interval"),
            },
            IntervalPoll::Pending => log::trace!("gpu interval not ready"),
            IntervalPoll::Idle => {}
        }

        AveragedTime {
            seconds: self.average,
            updated,
        }
    }

    /// Latest published average in seconds.
    pub fn average(&self) -> f32 {
        self.average
    }

    pub fn timer(&self) -> &GpuTimer<Q> {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut GpuTimer<Q> {
        &mut self.timer
    }
}
