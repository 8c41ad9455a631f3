use rand::Rng;
use serde::{Deserialize, Serialize};

/// Diameter of a point on the playfield, in playfield units
pub const POINT_DIAMETER: u32 = 52;

/// Decay budget a point starts with
pub const DECAY_BUDGET: u32 = 200;
/// Decay removed by one step
pub const DECAY_STEP: u32 = 10;
/// Opacity removed by one step
pub const OPACITY_STEP: u8 = 5;
/// Delay between two decay steps
pub const DECAY_INTERVAL_MS: u64 = 100;
/// Number of steps from click to removal
pub const DECAY_STEPS: u32 = DECAY_BUDGET / DECAY_STEP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: u32,
    pub y: u32,
}

/// Playfield dimensions points are placed within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: u32,
    pub height: u32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 702,
            height: 452,
        }
    }
}

impl Bounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Largest x a point can be placed at (inclusive, never below 1)
    pub fn max_x(&self) -> u32 {
        self.width.saturating_sub(POINT_DIAMETER).max(1)
    }

    /// Largest y a point can be placed at (inclusive, never below 1)
    pub fn max_y(&self) -> u32 {
        self.height.saturating_sub(POINT_DIAMETER).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub number: u32,
    pub location: Location,
    pub clicked: bool,
    pub remaining_decay: u32,
    pub opacity: u8,
}

impl Point {
    pub fn new(number: u32, location: Location) -> Self {
        Self {
            number,
            location,
            clicked: false,
            remaining_decay: DECAY_BUDGET,
            opacity: 100,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.remaining_decay == 0
    }

    /// Remaining decay in seconds, as shown on a clicked point
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_decay as f64 / 100.0
    }
}

/// Result of running one decay step for a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayProgress {
    /// Step applied, more steps follow
    Continue,
    /// Final step applied and the point left the field
    Removed,
    /// Game-over was raised; the decay stops where it is
    Aborted,
    /// The step belongs to an older generation or to a point that is gone
    Stale,
}

/// The set of points alive in the current generation.
///
/// Points are kept in spawn order, which is also the draw order used by
/// front-ends: later points are drawn on top.
#[derive(Debug, Clone, Default)]
pub struct PointField {
    points: Vec<Point>,
    generation: u64,
}

impl PointField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces `amount` points numbered from `amount` down to 1, each at
    /// an independently drawn position inside `bounds`.
    pub fn spawn<R: Rng + ?Sized>(amount: u32, bounds: Bounds, rng: &mut R) -> Vec<Point> {
        (1..=amount)
            .rev()
            .map(|number| {
                let location = Location {
                    x: rng.gen_range(1..=bounds.max_x()),
                    y: rng.gen_range(1..=bounds.max_y()),
                };
                Point::new(number, location)
            })
            .collect()
    }

    /// Drops every point and binds the field to `generation`
    pub fn clear(&mut self, generation: u64) {
        self.points.clear();
        self.generation = generation;
    }

    /// Replaces the field content with a fresh batch for `generation`
    pub fn populate(&mut self, generation: u64, points: Vec<Point>) {
        self.clear(generation);
        self.points = points;
    }

    pub fn remove(&mut self, number: u32) -> Option<Point> {
        let idx = self.points.iter().position(|p| p.number == number)?;
        Some(self.points.remove(idx))
    }

    pub fn get(&self, number: u32) -> Option<&Point> {
        self.points.iter().find(|p| p.number == number)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the point clicked. Returns false when the generation is stale
    /// or the point does not exist, in which case nothing must be scheduled.
    pub fn begin_decay(&mut self, number: u32, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.points.iter_mut().find(|p| p.number == number) {
            Some(point) if !point.clicked => {
                point.clicked = true;
                true
            }
            _ => false,
        }
    }

    /// Applies one decay step to `number` on behalf of a task started in
    /// `generation`.
    pub fn decay_step(&mut self, number: u32, generation: u64, game_over: bool) -> DecayProgress {
        if generation != self.generation {
            return DecayProgress::Stale;
        }
        if game_over {
            return DecayProgress::Aborted;
        }

        let Some(point) = self.points.iter_mut().find(|p| p.number == number) else {
            return DecayProgress::Stale;
        };
        point.remaining_decay = point.remaining_decay.saturating_sub(DECAY_STEP);
        point.opacity = point.opacity.saturating_sub(OPACITY_STEP);

        if point.is_spent() {
            self.remove(number);
            DecayProgress::Removed
        } else {
            DecayProgress::Continue
        }
    }
}
