//! Error codes exposed by the tournament API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes. Every code
//! is SCREAMING_SNAKE_CASE and maps 1:1 to the string that appears in the
//! `code` field of problem details.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Actor lacks the role or leadership for this operation
    Forbidden,
    /// Only the session referee may do this
    RefereeOnly,
    /// Only the team leader may do this
    LeaderOnly,
    /// Actor does not belong to the session
    NotInSession,
    /// Actor is not a member of the team
    NotTeamMember,
    /// Device token is not bound to a participant of the session
    UnknownDevice,

    // Request validation
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,
    /// Invalid or missing HTTP header
    InvalidHeader,
    InvalidName,
    InvalidRoomCode,
    InvalidRoundTarget,
    InvalidRole,
    InvalidDiceValue,
    InvalidStatistic,
    InvalidTransition,
    InvalidStatSchema,
    /// Operation not allowed in the current session or game status
    PhaseMismatch,
    /// Session is finished and immutable
    SessionFinished,
    /// A team lacks members or a leader
    TeamNotReady,
    /// Game result must be recorded first
    ResultMissing,

    // Resource not found
    SessionNotFound,
    ParticipantNotFound,
    TeamNotFound,
    CatalogEntryNotFound,
    GameNotFound,
    DiceRollNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    RoomCodeTaken,
    DeviceAlreadyJoined,
    DicePickTaken,
    NotYourTurn,
    AlreadyDrafted,
    /// Lost a conditional update; re-read and retry
    StaleState,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System errors
    DbError,
    DbUnavailable,
    DbTimeout,
    UniqueViolation,
    FkViolation,
    CheckViolation,
    RecordNotFound,
    Internal,
    ConfigError,
    DataCorruption,
}

impl ErrorCode {
    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::RefereeOnly => "REFEREE_ONLY",
            Self::LeaderOnly => "LEADER_ONLY",
            Self::NotInSession => "NOT_IN_SESSION",
            Self::NotTeamMember => "NOT_TEAM_MEMBER",
            Self::UnknownDevice => "UNKNOWN_DEVICE",

            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidRoomCode => "INVALID_ROOM_CODE",
            Self::InvalidRoundTarget => "INVALID_ROUND_TARGET",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidDiceValue => "INVALID_DICE_VALUE",
            Self::InvalidStatistic => "INVALID_STATISTIC",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::InvalidStatSchema => "INVALID_STAT_SCHEMA",
            Self::PhaseMismatch => "PHASE_MISMATCH",
            Self::SessionFinished => "SESSION_FINISHED",
            Self::TeamNotReady => "TEAM_NOT_READY",
            Self::ResultMissing => "RESULT_MISSING",

            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::TeamNotFound => "TEAM_NOT_FOUND",
            Self::CatalogEntryNotFound => "CATALOG_ENTRY_NOT_FOUND",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::DiceRollNotFound => "DICE_ROLL_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::RoomCodeTaken => "ROOM_CODE_TAKEN",
            Self::DeviceAlreadyJoined => "DEVICE_ALREADY_JOINED",
            Self::DicePickTaken => "DICE_PICK_TAKEN",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::AlreadyDrafted => "ALREADY_DRAFTED",
            Self::StaleState => "STALE_STATE",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::FkViolation => "FK_VIOLATION",
            Self::CheckViolation => "CHECK_VIOLATION",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::RefereeOnly.as_str(), "REFEREE_ONLY");
        assert_eq!(ErrorCode::InvalidRoomCode.as_str(), "INVALID_ROOM_CODE");
        assert_eq!(ErrorCode::DicePickTaken.as_str(), "DICE_PICK_TAKEN");
        assert_eq!(ErrorCode::NotYourTurn.as_str(), "NOT_YOUR_TURN");
        assert_eq!(ErrorCode::SessionFinished.as_str(), "SESSION_FINISHED");
        assert_eq!(ErrorCode::GameNotFound.as_str(), "GAME_NOT_FOUND");
        assert_eq!(ErrorCode::StaleState.as_str(), "STALE_STATE");
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::TeamNotReady), "TEAM_NOT_READY");
        assert_eq!(format!("{}", ErrorCode::UniqueViolation), "UNIQUE_VIOLATION");
    }
}
