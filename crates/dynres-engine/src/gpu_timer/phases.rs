use super::averaged::{AveragedGpuTimer, AveragedTime};
use super::pipeline::{TimerError, TimestampQueries};

/// Labeled portions of a frame measured on the GPU.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// Everything rendered into the dynamic target; drives the controller.
    InnerFrame,
    Clear,
    Scene,
    PostProcess,
    /// Upscale or temporal resolve into the backbuffer.
    Scale,
}

impl Phase {
    pub const COUNT: usize = 5;

    pub const ALL: [Phase; Self::COUNT] = [
        Phase::InnerFrame,
        Phase::Clear,
        Phase::Scene,
        Phase::PostProcess,
        Phase::Scale,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::InnerFrame => "inner frame",
            Phase::Clear => "clear",
            Phase::Scene => "scene",
            Phase::PostProcess => "post-process",
            Phase::Scale => "scale",
        }
    }
}

/// Averaged per-phase seconds after one poll.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PhaseTimes {
    seconds: [f32; Phase::COUNT],
    /// The scene timer published a new average this frame.
    pub stats_updated: bool,
}

impl PhaseTimes {
    #[inline]
    pub fn seconds(&self, phase: Phase) -> f32 {
        self.seconds[phase.index()]
    }

    #[inline]
    pub fn millis(&self, phase: Phase) -> f32 {
        self.seconds(phase) * 1000.0
    }

    /// GPU time of the work that scales with the dynamic resolution.
    #[inline]
    pub fn inner_frame(&self) -> f32 {
        self.seconds(Phase::InnerFrame)
    }
}

/// One averaged timer per `Phase`.
#[derive(Debug)]
pub struct PhaseTimers<Q> {
    timers: [AveragedGpuTimer<Q>; Phase::COUNT],
}

impl<Q: TimestampQueries> PhaseTimers<Q> {
    /// Builds the timers, asking `make` for one backend per phase.
    pub fn new(mut make: impl FnMut(Phase) -> Q) -> Self {
        Self {
            timers: Phase::ALL.map(|phase| AveragedGpuTimer::new(make(phase))),
        }
    }

    /// Like `new`, but gives up as soon as `make` has no backend for a phase.
    pub fn try_new(mut make: impl FnMut(Phase) -> Option<Q>) -> Option<Self> {
        let mut timers = Vec::with_capacity(Phase::COUNT);
        for phase in Phase::ALL {
            timers.push(AveragedGpuTimer::new(make(phase)?));
        }
        Some(Self {
            timers: timers.try_into().ok()?,
        })
    }

    /// Starts timing `phase`. Misuse is logged and otherwise ignored.
    pub fn begin(&mut self, phase: Phase, encoder: &mut Q::Encoder) {
        log_misuse(phase, self.timers[phase.index()].begin(encoder));
    }

    pub fn end(&mut self, phase: Phase, encoder: &mut Q::Encoder) {
        log_misuse(phase, self.timers[phase.index()].end(encoder));
    }

    pub fn submitted(&mut self) {
        for timer in &mut self.timers {
            timer.submitted();
        }
    }

    /// Polls every phase once.
    pub fn poll(&mut self) -> PhaseTimes {
        let mut times = PhaseTimes::default();
        for phase in Phase::ALL {
            let AveragedTime { seconds, updated } = self.timers[phase.index()].update();
            times.seconds[phase.index()] = seconds;
            if phase == Phase::Scene {
                times.stats_updated = updated;
            }
        }
        times
    }

    pub fn timer(&self, phase: Phase) -> &AveragedGpuTimer<Q> {
        &self.timers[phase.index()]
    }
}

fn log_misuse(phase: Phase, result: Result<(), TimerError>) {
    if let Err(e) = result {
        log::debug!("{} timer skipped: {e}", phase.label());
    }
}
