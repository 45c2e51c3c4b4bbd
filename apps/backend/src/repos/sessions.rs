//! Session repository functions for domain layer.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::sessions_sea as sessions_adapter;
use crate::entities::sessions::{self, SessionStatus};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use sessions_adapter::{SessionCas, SessionCreate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub room_code: String,
    pub status: SessionStatus,
    pub round_target: i32,
    pub active_draft_team_id: Option<String>,
    pub on_deck_team_id: Option<String>,
    pub owner_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub global_titles_at: Option<OffsetDateTime>,
    pub version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<sessions::Model> for Session {
    fn from(m: sessions::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            room_code: m.room_code,
            status: m.status,
            round_target: m.round_target,
            active_draft_team_id: m.active_draft_team_id,
            on_deck_team_id: m.on_deck_team_id,
            owner_id: m.owner_id,
            global_titles_at: m.global_titles_at,
            version: m.version,
            created_at: m.created_at,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<Session>, DomainError> {
    let session = sessions_adapter::find_by_id(conn, session_id).await?;
    Ok(session.map(Session::from))
}

pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Session, DomainError> {
    find_by_id(conn, session_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Session,
            format!("Session {session_id} not found"),
        )
    })
}

pub async fn find_open_by_room_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_code: &str,
) -> Result<Option<Session>, DomainError> {
    let session = sessions_adapter::find_open_by_room_code(conn, room_code).await?;
    Ok(session.map(Session::from))
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionCreate,
) -> Result<Session, DomainError> {
    let session = sessions_adapter::create_session(conn, dto).await?;
    Ok(Session::from(session))
}

pub async fn set_owner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    owner_id: &str,
) -> Result<Session, DomainError> {
    sessions_adapter::set_owner(conn, session_id, owner_id).await?;
    require_session(conn, session_id).await
}

/// Apply a guarded update and return the fresh row, or `None` when the
/// guard no longer matched.
pub async fn apply_cas<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cas: SessionCas,
) -> Result<Option<Session>, DomainError> {
    let id = cas.id.clone();
    if !sessions_adapter::apply_cas(conn, cas).await? {
        return Ok(None);
    }
    Ok(Some(require_session(conn, &id).await?))
}

pub async fn claim_global_titles<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<bool, DomainError> {
    Ok(sessions_adapter::claim_global_titles(conn, session_id).await?)
}
