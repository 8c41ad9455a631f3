use crate::session::SessionState;

/// Why a click was ignored without affecting the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotRunning,
    StaleGeneration,
}

/// Observable result of a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The cursor advanced past `number`. `cleared` is set on the last point.
    Accepted { number: u32, cleared: bool },
    /// The click did not match the cursor and ended the session
    Missed { number: u32, expected: u32 },
    Ignored(IgnoreReason),
}

impl ClickOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ClickOutcome::Accepted { .. })
    }
}

/// Decides whether a clicked number is acceptable and applies the
/// resulting transition to the session state.
pub struct ClickValidator;

impl ClickValidator {
    pub fn apply(state: &mut SessionState, number: u32, generation: u64) -> ClickOutcome {
        if !state.is_current(generation) {
            return ClickOutcome::Ignored(IgnoreReason::StaleGeneration);
        }
        if !state.is_running() {
            return ClickOutcome::Ignored(IgnoreReason::NotRunning);
        }

        let expected = state.next_expected;
        if number == expected && number <= state.amount {
            state.next_expected += 1;
            ClickOutcome::Accepted {
                number,
                cleared: state.is_cleared(),
            }
        } else {
            state.lose();
            ClickOutcome::Missed { number, expected }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Status;
    use assert_matches::assert_matches;

    fn running(amount: u32) -> SessionState {
        let mut state = SessionState::default();
        state.begin(amount);
        state
    }

    #[test]
    fn test_accepts_in_order() {
        let mut state = running(3);
        let generation = state.generation;

        assert_eq!(
            ClickValidator::apply(&mut state, 1, generation),
            ClickOutcome::Accepted {
                number: 1,
                cleared: false
            }
        );
        ClickValidator::apply(&mut state, 2, generation);
        assert_eq!(
            ClickValidator::apply(&mut state, 3, generation),
            ClickOutcome::Accepted {
                number: 3,
                cleared: true
            }
        );
        assert_eq!(state.next_expected, 4);
        assert_eq!(state.status, Status::Running);
    }

    #[test]
    fn test_wrong_number_loses() {
        let mut state = running(3);
        let generation = state.generation;

        assert_matches!(
            ClickValidator::apply(&mut state, 2, generation),
            ClickOutcome::Missed {
                number: 2,
                expected: 1
            }
        );
        assert_eq!(state.status, Status::Lost);
        assert!(state.game_over);
        assert_eq!(state.next_expected, 1);
    }

    #[test]
    fn test_repeated_click_loses() {
        let mut state = running(3);
        let generation = state.generation;
        ClickValidator::apply(&mut state, 1, generation);

        assert_matches!(
            ClickValidator::apply(&mut state, 1, generation),
            ClickOutcome::Missed { .. }
        );
        assert_eq!(state.status, Status::Lost);
    }

    #[test]
    fn test_out_of_range_loses_even_when_cursor_matches() {
        let mut state = running(1);
        let generation = state.generation;
        ClickValidator::apply(&mut state, 1, generation);

        assert_matches!(
            ClickValidator::apply(&mut state, 2, generation),
            ClickOutcome::Missed { .. }
        );
        assert_eq!(state.next_expected, 2);
    }

    #[test]
    fn test_ignored_when_not_running() {
        let mut state = SessionState::default();
        assert_eq!(
            ClickValidator::apply(&mut state, 1, 0),
            ClickOutcome::Ignored(IgnoreReason::NotRunning)
        );
        assert_eq!(state.status, Status::Ready);

        let mut state = running(2);
        let generation = state.generation;
        ClickValidator::apply(&mut state, 2, generation);
        assert_eq!(
            ClickValidator::apply(&mut state, 1, generation),
            ClickOutcome::Ignored(IgnoreReason::NotRunning)
        );
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut state = running(2);
        let old = state.generation;
        state.begin(2);

        assert_eq!(
            ClickValidator::apply(&mut state, 2, old),
            ClickOutcome::Ignored(IgnoreReason::StaleGeneration)
        );
        assert_eq!(state.status, Status::Running);
    }
}
