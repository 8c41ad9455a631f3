use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A continuation the session controller asked to run later.
///
/// Every task carries the generation that was live when it was
/// scheduled; the controller checks it again before committing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ClockTick { generation: u64 },
    DecayStep { generation: u64, number: u32 },
    WinGrace { generation: u64 },
    AutoPlay { generation: u64, run: u64 },
}

impl Task {
    pub fn generation(&self) -> u64 {
        match *self {
            Task::ClockTick { generation }
            | Task::DecayStep { generation, .. }
            | Task::WinGrace { generation }
            | Task::AutoPlay { generation, .. } => generation,
        }
    }
}

/// Delayed-callback primitive the controller runs on.
///
/// There is no cancel operation: abandoned tasks still come due and are
/// expected to turn into no-ops.
pub trait Scheduler {
    /// Current time in milliseconds
    fn now(&self) -> u64;

    fn schedule(&mut self, delay_ms: u64, task: Task);

    /// Removes the earliest task due at or before `until`, moving `now`
    /// to its due time.
    fn pop_due(&mut self, until: u64) -> Option<Task>;

    /// Moves `now` forward to `until` once no task is due before it
    fn settle(&mut self, until: u64);

    fn pending(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    due: u64,
    seq: u64,
    task: Task,
}

// BinaryHeap is a max-heap: invert so the earliest (due, seq) pops first.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Virtual timeline. Time only moves when the host advances it, so the
/// same inputs always produce the same session.
#[derive(Debug, Default)]
pub struct Timeline {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Timeline {
    fn now(&self) -> u64 {
        self.now
    }

    fn schedule(&mut self, delay_ms: u64, task: Task) {
        self.seq += 1;
        self.queue.push(Entry {
            due: self.now + delay_ms,
            seq: self.seq,
            task,
        });
    }

    fn pop_due(&mut self, until: u64) -> Option<Task> {
        if self.queue.peek()?.due > until {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
