use crate::session::SessionState;

/// Delay between two synthetic clicks
pub const AUTO_PLAY_INTERVAL_MS: u64 = 1000;

/// What the driver wants to do when its interval comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoPlayStep {
    Click(u32),
    Stop,
}

/// Issues clicks on the player's behalf, always on the current cursor.
///
/// Each time auto-play is switched on the driver starts a new run; a
/// pending step from an earlier run stops instead of clicking, so
/// toggling quickly never leaves two loops alive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPlayDriver {
    run: u64,
}

impl AutoPlayDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new run and returns its id
    pub fn arm(&mut self) -> u64 {
        self.run += 1;
        self.run
    }

    pub fn current_run(&self) -> u64 {
        self.run
    }

    pub fn step(&self, state: &SessionState, generation: u64, run: u64) -> AutoPlayStep {
        let live = run == self.run
            && state.is_current(generation)
            && state.is_running()
            && state.auto_play_enabled
            && !state.is_cleared();

        if live {
            AutoPlayStep::Click(state.next_expected)
        } else {
            AutoPlayStep::Stop
        }
    }
}
