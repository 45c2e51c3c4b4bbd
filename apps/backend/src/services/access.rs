//! Session and actor guards shared by the services.
//!
//! Services are trust boundaries: they load the acting participant and the
//! session themselves instead of trusting caller-provided views.

use sea_orm::DatabaseTransaction;

use crate::domain::lifecycle::ensure_mutable;
use crate::errors::domain::{DomainError, ForbiddenKind};
use crate::repos::participants::{self, Participant};
use crate::repos::sessions::{self, Session};

/// Load a session that still accepts mutations.
pub(crate) async fn mutable_session(
    txn: &DatabaseTransaction,
    session_id: &str,
) -> Result<Session, DomainError> {
    let session = sessions::require_session(txn, session_id).await?;
    ensure_mutable(session.status)?;
    Ok(session)
}

/// Load the acting participant and check it belongs to `session_id`.
pub(crate) async fn actor_in_session(
    txn: &DatabaseTransaction,
    session_id: &str,
    actor_id: &str,
) -> Result<Participant, DomainError> {
    let actor = participants::require_participant(txn, actor_id).await?;
    if actor.session_id != session_id {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotInSession,
            format!("Participant {actor_id} is not part of session {session_id}"),
        ));
    }
    Ok(actor)
}

pub(crate) fn require_referee(actor: &Participant, action: &str) -> Result<(), DomainError> {
    if actor.is_referee() {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::RefereeOnly,
            format!("Only the referee may {action}"),
        ))
    }
}

pub(crate) fn require_leader(
    actor: &Participant,
    team_id: &str,
    action: &str,
) -> Result<(), DomainError> {
    if actor.leads(team_id) {
        Ok(())
    } else {
        Err(DomainError::forbidden(
            ForbiddenKind::LeaderOnly,
            format!("Only the team leader may {action}"),
        ))
    }
}

/// The referee, or the leader of `team_id`.
pub(crate) fn require_leader_or_referee(
    actor: &Participant,
    team_id: &str,
    action: &str,
) -> Result<(), DomainError> {
    if actor.is_referee() {
        return Ok(());
    }
    require_leader(actor, team_id, action)
}
