/// Interval between two clock ticks
pub const CLOCK_INTERVAL_MS: u64 = 100;

/// Units added to `elapsed` on every tick (hundredths of a second)
pub const CLOCK_STEP: u64 = 10;

/// Elapsed-time accumulator for a running session.
///
/// The clock never reads wall time; it only advances when a scheduled
/// tick reaches it, which keeps sessions reproducible on a virtual
/// timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    elapsed: u64,
    frozen: bool,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one step unless frozen. Returns whether the clock moved.
    pub fn tick(&mut self) -> bool {
        if self.frozen {
            return false;
        }
        self.elapsed += CLOCK_STEP;
        true
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    /// Elapsed time in seconds, as shown to the player
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed as f64 / 100.0
    }
}
