use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent, MouseEventKind};

/// What the game loop reacts to. `Tick` is synthesized when the terminal
/// stays quiet for one frame, so the timeline keeps moving.
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    /// A button press over the terminal; the app hit-tests it against points
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Where input comes from. Points are cleared by clicking, so a source
/// must deliver mouse presses alongside keys.
pub trait EventSource: Send + 'static {
    /// Waits up to `timeout` for the next input.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Keeps the terminal events the game acts on. Mouse capture reports
/// every move, drag and release, but only a press can click a point.
pub fn translate(event: CtEvent) -> Option<GameEvent> {
    match event {
        CtEvent::Key(key) => Some(GameEvent::Key(key)),
        CtEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(GameEvent::Mouse(mouse)),
            _ => None,
        },
        CtEvent::Resize(..) => Some(GameEvent::Resize),
        _ => None,
    }
}

/// Reads the terminal on a background thread, since `event::read` blocks
/// and the loop must still advance the timeline between clicks.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            while let Ok(raw) = event::read() {
                let Some(evt) = translate(raw) else {
                    continue;
                };
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Frame length of the game loop
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Channel-fed source for driving the loop from tests and headless runs
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Next input, or `Tick` once a frame passes without one. A closed
    /// source also ticks so pending decays and the win grace still land.
    pub fn step(&self) -> GameEvent {
        self.event_source
            .recv_timeout(self.ticker.interval())
            .unwrap_or(GameEvent::Tick)
    }
}
