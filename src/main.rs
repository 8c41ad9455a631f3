pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};
use tapthru::{
    app_dirs::{init_logging, AppDirs},
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    ClickOutcome, SessionController, SessionError, SessionSnapshot, Status, TICK_RATE_MS,
};

use crate::ui::playfield::Projection;

/// Virtual-time step used when playing without a terminal
const HEADLESS_STEP_MS: u64 = 100;

/// clear the numbered points in order before they fade
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reaction game: numbered points appear at random spots and \
                  must be clicked in ascending order. A wrong click ends the game."
)]
pub struct Cli {
    /// number of points to clear (defaults to the config file, then 5)
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    points: Option<u32>,

    /// playfield width in playfield units
    #[clap(long)]
    width: Option<u32>,

    /// playfield height in playfield units
    #[clap(long)]
    height: Option<u32>,

    /// seed for point placement, for reproducible layouts
    #[clap(long)]
    seed: Option<u64>,

    /// play one auto-played session without a terminal and print the final state as JSON
    #[clap(long)]
    headless: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// file to append logs to (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layers command line overrides on top of the stored config
    fn apply(&self, base: Config) -> Config {
        Config {
            points: self.points.unwrap_or(base.points),
            playfield_width: self.width.unwrap_or(base.playfield_width),
            playfield_height: self.height.unwrap_or(base.playfield_height),
            seed: self.seed.or(base.seed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub controller: SessionController,
    origin: Instant,
}

impl App {
    pub fn new(config: Config) -> Self {
        let controller = SessionController::new(config.bounds(), config.seed);
        Self {
            config,
            controller,
            origin: Instant::now(),
        }
    }

    /// Catches the session timeline up with wall time
    pub fn sync_clock(&mut self) {
        let elapsed = self.origin.elapsed().as_millis() as u64;
        self.advance_to(elapsed);
    }

    pub fn advance_to(&mut self, elapsed_ms: u64) {
        let delta = elapsed_ms.saturating_sub(self.controller.now());
        self.controller.advance(delta);
    }

    pub fn start(&mut self) -> Result<u64, SessionError> {
        self.controller.start(self.config.points)
    }

    /// Restarts with the last amount, or with the edited one if it changed
    pub fn restart(&mut self) -> Result<u64, SessionError> {
        if self.controller.last_amount() != Some(self.config.points) {
            return self.start();
        }
        self.controller.reset()
    }

    /// Edits the amount for the next round; locked while a round runs
    pub fn adjust_points(&mut self, delta: i32) {
        if self.controller.status() == Status::Running {
            return;
        }
        self.config.points = self.config.points.saturating_add_signed(delta).max(1);
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Flow {
        let result = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Flow::Quit
            }
            KeyCode::Char('s') if self.controller.generation() == 0 => self.start().map(|_| ()),
            KeyCode::Char('r') => self.restart().map(|_| ()),
            KeyCode::Char('a') => {
                self.controller.toggle_auto_play();
                Ok(())
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => {
                self.adjust_points(1);
                Ok(())
            }
            KeyCode::Char('-') | KeyCode::Down => {
                self.adjust_points(-1);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            tracing::warn!(%err, "could not start session");
        }
        Flow::Continue
    }

    /// Resolves a left click on the screen of size `area` to a point
    pub fn on_mouse(&mut self, mouse: MouseEvent, area: Rect) -> Option<ClickOutcome> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let snapshot = self.controller.snapshot();
        let projection = Projection::new(ui::playfield_inner(area), self.controller.bounds());
        let number = projection.hit_test(&snapshot, mouse.column, mouse.row)?;
        Some(self.controller.click_at(number, snapshot.generation))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        // a missing log file must not keep the game from starting
        if let Err(err) = init_logging(&path) {
            eprintln!("warning: logging disabled, cannot open {}: {err}", path.display());
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save_config {
        store.save(&config)?;
    }

    if cli.headless {
        let snapshot = run_headless(&config)?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Plays one session on auto-play, on virtual time, and returns the final state
fn run_headless(config: &Config) -> Result<SessionSnapshot, SessionError> {
    let mut controller = SessionController::new(config.bounds(), config.seed);
    controller.start(config.points)?;
    controller.toggle_auto_play();

    while !controller.status().is_terminal() && controller.pending_tasks() > 0 {
        controller.advance(HEADLESS_STEP_MS);
    }
    Ok(controller.snapshot())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        app.sync_clock();
        terminal.draw(|f| render(app, f))?;

        let event = runner.step();
        app.sync_clock();

        match event {
            GameEvent::Tick | GameEvent::Resize => {}
            GameEvent::Key(key) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
            GameEvent::Mouse(mouse) => {
                let size = terminal.size()?;
                app.on_mouse(mouse, Rect::new(0, 0, size.width, size.height));
            }
        }
    }

    Ok(())
}

fn render(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn config(points: u32) -> Config {
        Config {
            points,
            seed: Some(5),
            ..Config::default()
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn screen_content(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["tapthru"]);
        assert_eq!(cli.points, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.headless);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_points() {
        let cli = Cli::parse_from(["tapthru", "-n", "12"]);
        assert_eq!(cli.points, Some(12));

        let cli = Cli::parse_from(["tapthru", "--points", "3"]);
        assert_eq!(cli.points, Some(3));
    }

    #[test]
    fn test_cli_rejects_zero_points() {
        assert!(Cli::try_parse_from(["tapthru", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["tapthru", "-n", "five"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["tapthru", "-n", "8", "--width", "300", "--seed", "4"]);
        let merged = cli.apply(Config {
            points: 2,
            playfield_width: 900,
            playfield_height: 500,
            seed: None,
        });

        assert_eq!(merged.points, 8);
        assert_eq!(merged.playfield_width, 300);
        assert_eq!(merged.playfield_height, 500);
        assert_eq!(merged.seed, Some(4));
    }

    #[test]
    fn test_keys_drive_session() {
        let mut app = App::new(config(3));
        assert_eq!(app.controller.status(), Status::Ready);

        assert_eq!(app.on_key(key('s')), Flow::Continue);
        assert_eq!(app.controller.status(), Status::Running);
        assert_eq!(app.controller.generation(), 1);

        // start only applies to a fresh app; restart opens a new generation
        app.on_key(key('s'));
        assert_eq!(app.controller.generation(), 1);
        app.on_key(key('r'));
        assert_eq!(app.controller.generation(), 2);

        app.on_key(key('a'));
        assert!(app.controller.snapshot().auto_play_enabled);

        assert_eq!(app.on_key(key('q')), Flow::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Flow::Quit
        );
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Flow::Quit
        );
    }

    #[test]
    fn test_plus_then_restart_uses_new_amount() {
        let mut app = App::new(config(3));
        app.on_key(key('s'));
        app.controller.click(2);
        assert_eq!(app.controller.status(), Status::Lost);

        app.on_key(key('+'));
        app.on_key(key('r'));

        let snapshot = app.controller.snapshot();
        assert_eq!(snapshot.status, Status::Running);
        assert_eq!(snapshot.amount, 4);
        assert_eq!(snapshot.points.len(), 4);
    }

    #[test]
    fn test_amount_edit_before_first_start() {
        let mut app = App::new(config(2));
        app.on_key(key('-'));
        app.on_key(key('-'));
        assert_eq!(app.config.points, 1);

        app.on_key(key('+'));
        app.on_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        app.on_key(key('s'));
        assert_eq!(app.controller.snapshot().amount, 3);
    }

    #[test]
    fn test_amount_locked_while_running() {
        let mut app = App::new(config(3));
        app.on_key(key('s'));
        app.on_key(key('+'));
        assert_eq!(app.config.points, 3);

        // unchanged amount restarts through reset with the same count
        app.on_key(key('r'));
        assert_eq!(app.controller.generation(), 2);
        assert_eq!(app.controller.snapshot().amount, 3);
    }

    #[test]
    fn test_render_shows_pending_amount_after_loss() {
        let mut app = App::new(config(3));
        app.start().unwrap();
        app.controller.click(2);
        app.on_key(key('+'));
        app.on_key(key('+'));

        let content = screen_content(&app, 80, 24);
        assert!(content.contains("Points: 5"));
        assert!(content.contains("(+/-) points"));
    }

    #[test]
    fn test_restart_before_start_starts() {
        let mut app = App::new(config(2));
        app.on_key(key('r'));
        assert_eq!(app.controller.status(), Status::Running);
    }

    #[test]
    fn test_mouse_click_hits_point() {
        let mut app = App::new(config(3));
        app.start().unwrap();
        let area = Rect::new(0, 0, 80, 24);
        let projection = Projection::new(ui::playfield_inner(area), app.controller.bounds());

        let snapshot = app.controller.snapshot();
        let first = snapshot.point(1).unwrap();
        let (col, row) = projection.to_cell(first.location);

        assert_matches!(
            app.on_mouse(left_click(col, row), area),
            Some(ClickOutcome::Accepted { number: 1, .. })
        );
    }

    #[test]
    fn test_mouse_click_outside_points_is_ignored() {
        let mut app = App::new(config(2));
        app.start().unwrap();
        assert_eq!(app.on_mouse(left_click(0, 0), Rect::new(0, 0, 80, 24)), None);
        assert_eq!(app.controller.status(), Status::Running);
    }

    #[test]
    fn test_advance_to_follows_wall_time() {
        let mut app = App::new(config(2));
        app.start().unwrap();
        app.advance_to(1000);
        assert_eq!(app.controller.snapshot().elapsed, 100);

        // going backwards is a no-op
        app.advance_to(500);
        assert_eq!(app.controller.now(), 1000);
    }

    #[test]
    fn test_render_ready_screen() {
        let app = App::new(config(4));
        let content = screen_content(&app, 80, 24);
        assert!(content.contains("LET'S PLAY"));
        assert!(content.contains("Points: 4"));
        assert!(content.contains("(s)tart"));
    }

    #[test]
    fn test_render_running_screen_shows_points() {
        let mut app = App::new(config(3));
        app.start().unwrap();
        let content = screen_content(&app, 80, 24);
        assert!(content.contains("(1)"));
        assert!(content.contains("Auto Play: OFF"));
    }

    #[test]
    fn test_render_game_over() {
        let mut app = App::new(config(3));
        app.start().unwrap();
        app.controller.click(3);
        let content = screen_content(&app, 80, 24);
        assert!(content.contains("GAME OVER"));
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let mut app = App::new(config(5));
        app.start().unwrap();
        let _ = screen_content(&app, 10, 4);
    }

    #[test]
    fn test_run_headless_wins() {
        let snapshot = run_headless(&config(3)).unwrap();
        assert_eq!(snapshot.status, Status::Won);
        assert_eq!(snapshot.next_expected, 4);
        assert!(snapshot.points.is_empty());
    }

    #[test]
    fn test_run_headless_rejects_zero() {
        assert_eq!(
            run_headless(&config(0)).unwrap_err(),
            SessionError::InvalidAmount(0)
        );
    }
}
