//! Participant repository functions for domain layer.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::participants_sea as participants_adapter;
use crate::entities::participants::{self, ParticipantRole};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use participants_adapter::ParticipantCreate;

/// Participant as exposed to clients. The device token never leaves the
/// server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub role: ParticipantRole,
    pub team_id: Option<String>,
    pub is_leader: bool,
}

impl Participant {
    pub fn is_referee(&self) -> bool {
        self.role == ParticipantRole::Referee
    }

    /// Leader of `team_id` right now.
    pub fn leads(&self, team_id: &str) -> bool {
        self.role == ParticipantRole::Player
            && self.is_leader
            && self.team_id.as_deref() == Some(team_id)
    }
}

impl From<participants::Model> for Participant {
    fn from(m: participants::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            role: m.role,
            team_id: m.team_id,
            is_leader: m.is_leader,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    participant_id: &str,
) -> Result<Option<Participant>, DomainError> {
    let row = participants_adapter::find_by_id(conn, participant_id).await?;
    Ok(row.map(Participant::from))
}

pub async fn require_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    participant_id: &str,
) -> Result<Participant, DomainError> {
    find_by_id(conn, participant_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Participant,
            format!("Participant {participant_id} not found"),
        )
    })
}

pub async fn find_by_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    device_token: &str,
) -> Result<Option<Participant>, DomainError> {
    let row = participants_adapter::find_by_device(conn, session_id, device_token).await?;
    Ok(row.map(Participant::from))
}

pub async fn find_active_by_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
) -> Result<Option<Participant>, DomainError> {
    let row = participants_adapter::find_active_by_device(conn, device_token).await?;
    Ok(row.map(Participant::from))
}

pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<Participant>, DomainError> {
    let rows = participants_adapter::list_by_session(conn, session_id).await?;
    Ok(rows.into_iter().map(Participant::from).collect())
}

/// Players of `team_id` in creation order.
pub async fn list_players<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Vec<Participant>, DomainError> {
    let rows = participants_adapter::list_by_team(conn, team_id).await?;
    Ok(rows
        .into_iter()
        .map(Participant::from)
        .filter(|p| p.role == ParticipantRole::Player)
        .collect())
}

pub async fn create_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ParticipantCreate,
) -> Result<Participant, DomainError> {
    let row = participants_adapter::create_participant(conn, dto).await?;
    Ok(Participant::from(row))
}

pub async fn set_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    participant_id: &str,
    team_id: Option<String>,
) -> Result<Participant, DomainError> {
    participants_adapter::set_team(conn, participant_id, team_id).await?;
    require_participant(conn, participant_id).await
}

/// Make `winner` the only leader of `team_id` (or clear leadership when
/// `None`). Returns every participant whose flag changed.
pub async fn apply_leader<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    winner: Option<&str>,
) -> Result<Vec<Participant>, DomainError> {
    let before = participants_adapter::list_by_team(conn, team_id).await?;

    participants_adapter::clear_leaders(conn, team_id, winner).await?;
    if let Some(winner) = winner {
        participants_adapter::set_leader(conn, team_id, winner).await?;
    }

    let after = participants_adapter::list_by_team(conn, team_id).await?;
    Ok(after
        .into_iter()
        .filter(|p| {
            before
                .iter()
                .find(|b| b.id == p.id)
                .map_or(true, |b| b.is_leader != p.is_leader)
        })
        .map(Participant::from)
        .collect())
}
