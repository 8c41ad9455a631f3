use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::auto_play::{AutoPlayDriver, AutoPlayStep, AUTO_PLAY_INTERVAL_MS};
use crate::clock::CLOCK_INTERVAL_MS;
use crate::error::SessionError;
use crate::point_field::{Bounds, DecayProgress, Location, Point, PointField, DECAY_INTERVAL_MS};
use crate::scheduler::{Scheduler, Task, Timeline};
use crate::session::{SessionState, Status};
use crate::validator::{ClickOutcome, ClickValidator};

/// Pause between the last accepted click and the win being committed
pub const WIN_GRACE_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointSnapshot {
    pub number: u32,
    pub location: Location,
    pub clicked: bool,
    pub remaining_decay: u32,
    pub opacity: u8,
}

impl From<&Point> for PointSnapshot {
    fn from(p: &Point) -> Self {
        Self {
            number: p.number,
            location: p.location,
            clicked: p.clicked,
            remaining_decay: p.remaining_decay,
            opacity: p.opacity,
        }
    }
}

/// Read-only view of a session handed to front-ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: Status,
    pub amount: u32,
    pub generation: u64,
    pub elapsed: u64,
    pub next_expected: u32,
    pub auto_play_enabled: bool,
    /// Ordered by number
    pub points: Vec<PointSnapshot>,
}

impl SessionSnapshot {
    pub fn point(&self, number: u32) -> Option<&PointSnapshot> {
        self.points.iter().find(|p| p.number == number)
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed as f64 / 100.0
    }
}

/// Composition root of a game session.
///
/// All timed work (clock, decay, win grace, auto-play) goes through the
/// scheduler as generation-tagged tasks. Restarting never cancels
/// anything explicitly: tasks from an older generation still come due
/// and are dropped when they see the generation has moved on.
#[derive(Debug)]
pub struct SessionController<S: Scheduler = Timeline> {
    state: SessionState,
    field: PointField,
    driver: AutoPlayDriver,
    scheduler: S,
    bounds: Bounds,
    rng: StdRng,
    last_amount: Option<u32>,
}

impl SessionController<Timeline> {
    pub fn new(bounds: Bounds, seed: Option<u64>) -> Self {
        Self::with_scheduler(Timeline::new(), bounds, seed)
    }
}

impl<S: Scheduler> SessionController<S> {
    pub fn with_scheduler(scheduler: S, bounds: Bounds, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: SessionState::default(),
            field: PointField::new(),
            driver: AutoPlayDriver::new(),
            scheduler,
            bounds,
            rng,
            last_amount: None,
        }
    }

    /// Starts (or restarts) a session with `amount` points and returns the
    /// new generation.
    pub fn start(&mut self, amount: u32) -> Result<u64, SessionError> {
        if amount == 0 {
            return Err(SessionError::InvalidAmount(amount));
        }

        let generation = self.state.begin(amount);
        let points = PointField::spawn(amount, self.bounds, &mut self.rng);
        self.field.populate(generation, points);
        self.last_amount = Some(amount);
        self.scheduler
            .schedule(CLOCK_INTERVAL_MS, Task::ClockTick { generation });

        info!(generation, amount, "session started");
        Ok(generation)
    }

    /// Restarts with the amount of the last `start`
    pub fn reset(&mut self) -> Result<u64, SessionError> {
        let amount = self.last_amount.ok_or(SessionError::NoActiveSession)?;
        self.start(amount)
    }

    pub fn click(&mut self, number: u32) -> ClickOutcome {
        self.click_at(number, self.state.generation)
    }

    /// Clicks on behalf of an input captured while `generation` was live
    pub fn click_at(&mut self, number: u32, generation: u64) -> ClickOutcome {
        let outcome = ClickValidator::apply(&mut self.state, number, generation);

        match outcome {
            ClickOutcome::Accepted { number, cleared } => {
                if self.field.begin_decay(number, generation) {
                    self.scheduler
                        .schedule(DECAY_INTERVAL_MS, Task::DecayStep { generation, number });
                }
                debug!(generation, number, "click accepted");
                if cleared {
                    self.scheduler
                        .schedule(WIN_GRACE_MS, Task::WinGrace { generation });
                }
            }
            ClickOutcome::Missed { number, expected } => {
                info!(
                    generation,
                    number,
                    expected,
                    elapsed = self.state.elapsed(),
                    "session lost"
                );
            }
            ClickOutcome::Ignored(reason) => {
                trace!(generation, number, ?reason, "click ignored");
            }
        }

        outcome
    }

    /// Flips auto-play while running and returns the resulting flag
    pub fn toggle_auto_play(&mut self) -> bool {
        if !self.state.is_running() {
            return self.state.auto_play_enabled;
        }

        self.state.auto_play_enabled = !self.state.auto_play_enabled;
        if self.state.auto_play_enabled {
            let generation = self.state.generation;
            let run = self.driver.arm();
            self.scheduler
                .schedule(AUTO_PLAY_INTERVAL_MS, Task::AutoPlay { generation, run });
        }
        debug!(enabled = self.state.auto_play_enabled, "auto-play toggled");
        self.state.auto_play_enabled
    }

    /// Advances the clock by one step. Returns false unless running.
    pub fn tick(&mut self) -> bool {
        self.state.is_running() && self.state.clock.tick()
    }

    /// Moves time forward by `ms`, running every continuation that comes
    /// due on the way in order.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now() + ms;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task);
        }
        self.scheduler.settle(until);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ClockTick { generation } => {
                if self.state.is_current(generation) && self.tick() {
                    self.scheduler
                        .schedule(CLOCK_INTERVAL_MS, Task::ClockTick { generation });
                } else {
                    trace!(generation, "clock chain stopped");
                }
            }
            Task::DecayStep { generation, number } => {
                match self
                    .field
                    .decay_step(number, generation, self.state.game_over)
                {
                    DecayProgress::Continue => {
                        self.scheduler
                            .schedule(DECAY_INTERVAL_MS, Task::DecayStep { generation, number });
                    }
                    DecayProgress::Removed => debug!(generation, number, "point removed"),
                    DecayProgress::Aborted => debug!(generation, number, "decay aborted"),
                    DecayProgress::Stale => {
                        trace!(generation, number, "discarding stale decay step")
                    }
                }
            }
            Task::WinGrace { generation } => {
                if self.state.is_current(generation) && self.state.win() {
                    info!(generation, elapsed = self.state.elapsed(), "all points cleared");
                }
            }
            Task::AutoPlay { generation, run } => {
                let AutoPlayStep::Click(number) = self.driver.step(&self.state, generation, run)
                else {
                    debug!(generation, run, "auto-play stopped");
                    return;
                };
                self.click_at(number, generation);
                if let AutoPlayStep::Click(_) = self.driver.step(&self.state, generation, run) {
                    self.scheduler
                        .schedule(AUTO_PLAY_INTERVAL_MS, Task::AutoPlay { generation, run });
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.state.status,
            amount: self.state.amount,
            generation: self.state.generation,
            elapsed: self.state.elapsed(),
            next_expected: self.state.next_expected,
            auto_play_enabled: self.state.auto_play_enabled,
            points: self
                .field
                .points()
                .iter()
                .map(PointSnapshot::from)
                .sorted_by_key(|p| p.number)
                .collect(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn field(&self) -> &PointField {
        &self.field
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn last_amount(&self) -> Option<u32> {
        self.last_amount
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }
}
