use serde::Serialize;

use crate::clock::Clock;

/// Session status. Within one generation it only moves forward:
/// Ready -> Running -> Won | Lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Status {
    #[strum(serialize = "LET'S PLAY")]
    Ready,
    #[strum(serialize = "LET'S PLAY")]
    Running,
    #[strum(serialize = "ALL CLEARED")]
    Won,
    #[strum(serialize = "GAME OVER")]
    Lost,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Won | Status::Lost)
    }
}

/// Single source of truth for one play-through
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: Status,
    pub amount: u32,
    pub next_expected: u32,
    pub generation: u64,
    pub auto_play_enabled: bool,
    // Raised on a wrong click; in-flight decay steps check it and stop.
    pub game_over: bool,
    pub clock: Clock,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: Status::Ready,
            amount: 0,
            next_expected: 1,
            generation: 0,
            auto_play_enabled: false,
            game_over: false,
            clock: Clock::new(),
        }
    }
}

impl SessionState {
    /// Opens a new generation for `amount` points and returns it
    pub fn begin(&mut self, amount: u32) -> u64 {
        *self = Self {
            status: Status::Running,
            amount,
            generation: self.generation + 1,
            ..Self::default()
        };
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// All points have been accepted
    pub fn is_cleared(&self) -> bool {
        self.next_expected > self.amount
    }

    pub fn elapsed(&self) -> u64 {
        self.clock.elapsed()
    }

    /// Running -> Won. No effect from any other status.
    pub fn win(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = Status::Won;
        self.clock.freeze();
        true
    }

    /// Running -> Lost, raising the game-over flag
    pub fn lose(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.status = Status::Lost;
        self.game_over = true;
        self.clock.freeze();
        true
    }
}
