//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos convert it into
//! `crate::errors::domain::DomainError` here, and higher layers map
//! `DomainError` to `AppError` via `From`.

use sea_orm::{DbErr, RuntimeErr};
use sqlx::error::ErrorKind;
use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::trace_ctx;

/// Constraint fragments (Postgres index names and SQLite `table.column`
/// lists both contain the table name) mapped to conflict kinds.
const UNIQUE_CONFLICTS: &[(&str, ConflictKind, &str)] = &[
    (
        "dice_picks",
        ConflictKind::DicePickTaken,
        "Team already picked this round",
    ),
    (
        "uq_team_single_leader",
        ConflictKind::StaleState,
        "Team leadership changed concurrently; re-read and retry",
    ),
    (
        "participants.team_id",
        ConflictKind::StaleState,
        "Team leadership changed concurrently; re-read and retry",
    ),
    (
        "participants",
        ConflictKind::DeviceAlreadyJoined,
        "Device already joined this session",
    ),
    (
        "drafted_games.catalog_id",
        ConflictKind::AlreadyDrafted,
        "Game already drafted in this session",
    ),
    (
        "drafted_games_session_catalog",
        ConflictKind::AlreadyDrafted,
        "Game already drafted in this session",
    ),
    (
        "drafted_games",
        ConflictKind::StaleState,
        "Draft order changed concurrently; re-read and retry",
    ),
    (
        "leader_votes",
        ConflictKind::StaleState,
        "Ballot changed concurrently; re-read and retry",
    ),
];

fn unique_conflict(haystack: &str) -> (ConflictKind, &'static str) {
    UNIQUE_CONFLICTS
        .iter()
        .find(|(needle, _, _)| haystack.contains(needle))
        .map(|(_, kind, detail)| (kind.clone(), *detail))
        .unwrap_or((
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        ))
}

fn database_error(e: &DbErr) -> Option<&(dyn sqlx::error::DatabaseError + 'static)> {
    match e {
        DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db))) => Some(db.as_ref()),
        _ => None,
    }
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: DbErr) -> DomainError {
    let trace_id = trace_ctx::trace_id();
    let error_msg = e.to_string();

    match &e {
        DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if let Some(db) = database_error(&e) {
        let haystack = format!("{} {}", db.constraint().unwrap_or_default(), db.message());
        match db.kind() {
            ErrorKind::UniqueViolation => {
                warn!(trace_id = %trace_id, raw_error = %error_msg, "Unique constraint violation");
                let (kind, detail) = unique_conflict(&haystack);
                return DomainError::conflict(kind, detail);
            }
            ErrorKind::ForeignKeyViolation => {
                warn!(trace_id = %trace_id, raw_error = %error_msg, "Foreign key constraint violation");
                return DomainError::validation_other("Referenced entity does not exist");
            }
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                warn!(trace_id = %trace_id, raw_error = %error_msg, "Check constraint violation");
                return DomainError::validation_other("Check constraint violation");
            }
            _ => {}
        }
    }

    // Fallbacks for drivers that only surface a message.
    if error_msg.contains("23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Unique constraint violation");
        let (kind, detail) = unique_conflict(&error_msg);
        return DomainError::conflict(kind, detail);
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<DbErr> for DomainError {
    fn from(e: DbErr) -> Self {
        map_db_err(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_unique_messages_map_to_domain_conflicts() {
        let e = DbErr::Custom(
            "UNIQUE constraint failed: dice_picks.session_id, dice_picks.round, dice_picks.team_id"
                .into(),
        );
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::DicePickTaken, _)
        ));

        let e = DbErr::Custom(
            "UNIQUE constraint failed: drafted_games.session_id, drafted_games.catalog_id".into(),
        );
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::AlreadyDrafted, _)
        ));

        let e = DbErr::Custom(
            "UNIQUE constraint failed: drafted_games.session_id, drafted_games.draft_order".into(),
        );
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::StaleState, _)
        ));
    }

    #[test]
    fn second_team_leader_is_a_stale_state_conflict() {
        let e = DbErr::Custom("UNIQUE constraint failed: participants.team_id".into());
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::StaleState, _)
        ));

        let e = DbErr::Custom(
            "duplicate key value violates unique constraint \"uq_team_single_leader\"".into(),
        );
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::StaleState, _)
        ));

        let e = DbErr::Custom(
            "UNIQUE constraint failed: participants.session_id, participants.device_token".into(),
        );
        assert!(matches!(
            map_db_err(e),
            DomainError::Conflict(ConflictKind::DeviceAlreadyJoined, _)
        ));
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let e = DbErr::RecordNotFound("Session not found".into());
        assert!(matches!(map_db_err(e), DomainError::NotFound(..)));
    }

    #[test]
    fn unknown_errors_are_infra() {
        let e = DbErr::Custom("something odd".into());
        assert!(matches!(map_db_err(e), DomainError::Infra(..)));
    }
}
