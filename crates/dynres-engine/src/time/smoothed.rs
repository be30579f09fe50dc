/// Simulation clock that averages the last `N` frame deltas.
///
/// Scene animation is advanced by the averaged delta rather than the raw one so a
/// single hitch does not jolt motion. The average is recomputed from the whole
/// ring each update rather than maintained incrementally, so rounding error
/// cannot accumulate.
#[derive(Debug, Clone)]
pub struct SmoothedClock {
    deltas: Vec<f32>,
    cursor: usize,
    elapsed: f32,
    time: f64,
}

impl SmoothedClock {
    /// Delta every ring entry starts with (60 Hz).
    pub const INITIAL_DELTA: f32 = 1.0 / 60.0;

    pub fn new(window: usize) -> Self {
        assert!(window > 0, "smoothing window must hold at least one delta");
        Self {
            deltas: vec![Self::INITIAL_DELTA; window],
            cursor: 0,
            elapsed: 0.0,
            time: 0.0,
        }
    }

    /// Records a raw frame delta (seconds) and advances simulation time by the
    /// smoothed delta.
    pub fn update(&mut self, dt: f32) {
        self.deltas[self.cursor] = dt;
        self.cursor = (self.cursor + 1) % self.deltas.len();

        self.elapsed = self.deltas.iter().sum::<f32>() / self.deltas.len() as f32;
        self.time += self.elapsed as f64;
    }

    /// Accumulated simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Smoothed delta from the most recent update.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

impl Default for SmoothedClock {
    fn default() -> Self {
        Self::new(10)
    }
}
