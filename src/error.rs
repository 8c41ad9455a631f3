use thiserror::Error;

/// Contract violations signaled by the session controller.
///
/// Mistakes made by the player are not errors: a wrong click is a
/// regular transition to `Status::Lost` and shows up in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid amount {0}: a session needs at least one point")]
    InvalidAmount(u32),
    #[error("no active session: call start before reset")]
    NoActiveSession,
}
