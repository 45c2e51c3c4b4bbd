//! Session and drafted-game state machines.

use crate::entities::drafted_games::GameStatus;
use crate::entities::sessions::SessionStatus;
use crate::errors::domain::{DomainError, ValidationKind};

/// Whether `from -> to` is an edge of the session state machine.
///
/// `Active -> Drafting` is the only edge that revisits a status; it is taken
/// when a game completes and more games remain to be drafted.
pub fn session_transition_allowed(from: SessionStatus, to: SessionStatus) -> bool {
    use SessionStatus::*;
    matches!(
        (from, to),
        (Forming, Drafting)
            | (Drafting, Active)
            | (Active, Drafting)
            | (Active, Scoring)
            | (Scoring, Finished)
    )
}

pub fn ensure_session_transition(
    from: SessionStatus,
    to: SessionStatus,
) -> Result<(), DomainError> {
    if session_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidTransition,
            format!("Session cannot move from {from:?} to {to:?}"),
        ))
    }
}

/// Reject writes to finished sessions.
pub fn ensure_mutable(status: SessionStatus) -> Result<(), DomainError> {
    if status == SessionStatus::Finished {
        return Err(DomainError::validation(
            ValidationKind::SessionFinished,
            "Session is finished",
        ));
    }
    Ok(())
}

/// Require the session to be in `expected` for the operation `what`.
pub fn require_session_status(
    actual: SessionStatus,
    expected: SessionStatus,
    what: &str,
) -> Result<(), DomainError> {
    ensure_mutable(actual)?;
    if actual != expected {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("{what} requires session status {expected:?}, found {actual:?}"),
        ));
    }
    Ok(())
}

pub fn game_ordinal(status: GameStatus) -> u8 {
    match status {
        GameStatus::Pending => 0,
        GameStatus::Active => 1,
        GameStatus::Scoring => 2,
        GameStatus::Titles => 3,
        GameStatus::Completed => 4,
    }
}

pub fn next_game_status(status: GameStatus) -> Option<GameStatus> {
    match status {
        GameStatus::Pending => Some(GameStatus::Active),
        GameStatus::Active => Some(GameStatus::Scoring),
        GameStatus::Scoring => Some(GameStatus::Titles),
        GameStatus::Titles => Some(GameStatus::Completed),
        GameStatus::Completed => None,
    }
}

/// Only single forward steps are allowed.
pub fn ensure_game_step(from: GameStatus, to: GameStatus) -> Result<(), DomainError> {
    if next_game_status(from) == Some(to) {
        return Ok(());
    }
    Err(DomainError::validation(
        ValidationKind::InvalidTransition,
        format!("Game cannot move from {from:?} to {to:?}"),
    ))
}

/// Statistics are accepted while the game is played or scored.
pub fn accepts_statistics(status: GameStatus) -> bool {
    matches!(status, GameStatus::Active | GameStatus::Scoring)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SESSION: [SessionStatus; 5] = [
        SessionStatus::Forming,
        SessionStatus::Drafting,
        SessionStatus::Active,
        SessionStatus::Scoring,
        SessionStatus::Finished,
    ];

    #[test]
    fn finished_sessions_have_no_outgoing_edges() {
        for to in ALL_SESSION {
            assert!(!session_transition_allowed(SessionStatus::Finished, to));
        }
        assert!(ensure_mutable(SessionStatus::Finished).is_err());
    }

    #[test]
    fn session_edges_match_the_table() {
        let allowed: Vec<_> = ALL_SESSION
            .iter()
            .flat_map(|from| ALL_SESSION.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| session_transition_allowed(*from, *to))
            .collect();
        assert_eq!(
            allowed,
            vec![
                (SessionStatus::Forming, SessionStatus::Drafting),
                (SessionStatus::Drafting, SessionStatus::Active),
                (SessionStatus::Active, SessionStatus::Drafting),
                (SessionStatus::Active, SessionStatus::Scoring),
                (SessionStatus::Scoring, SessionStatus::Finished),
            ]
        );
    }

    #[test]
    fn game_steps_are_single_and_forward() {
        assert!(ensure_game_step(GameStatus::Active, GameStatus::Scoring).is_ok());
        assert!(ensure_game_step(GameStatus::Active, GameStatus::Titles).is_err());
        assert!(ensure_game_step(GameStatus::Scoring, GameStatus::Active).is_err());
        assert!(ensure_game_step(GameStatus::Completed, GameStatus::Completed).is_err());
    }

    #[test]
    fn phase_mismatch_names_the_operation() {
        let err = require_session_status(
            SessionStatus::Forming,
            SessionStatus::Drafting,
            "pickGame",
        )
        .unwrap_err();
        match err {
            DomainError::Validation(ValidationKind::PhaseMismatch, detail) => {
                assert!(detail.contains("pickGame"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
