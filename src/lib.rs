// Library surface for the session core, headless runs and integration tests.
// Terminal rendering lives with the binary in main.rs and ui.rs.
pub mod app_dirs;
pub mod auto_play;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod point_field;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod validator;

pub use controller::{PointSnapshot, SessionController, SessionSnapshot};
pub use error::SessionError;
pub use point_field::Bounds;
pub use session::Status;
pub use validator::ClickOutcome;

/// Host tick interval driving the interactive front-end
pub const TICK_RATE_MS: u64 = 50;
