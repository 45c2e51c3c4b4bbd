//! Team repository functions for domain layer.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::teams_sea as teams_adapter;
use crate::entities::teams;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Team {
    pub id: String,
    pub session_id: String,
    pub name: String,
    pub score: f64,
}

impl From<teams::Model> for Team {
    fn from(m: teams::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            score: m.score,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Option<Team>, DomainError> {
    Ok(teams_adapter::find_by_id(conn, team_id).await?.map(Team::from))
}

pub async fn require_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Team, DomainError> {
    find_by_id(conn, team_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Team, format!("Team {team_id} not found"))
    })
}

/// Creation order; also the draft rotation order.
pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<Team>, DomainError> {
    let rows = teams_adapter::list_by_session(conn, session_id).await?;
    Ok(rows.into_iter().map(Team::from).collect())
}

pub async fn create_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    name: &str,
) -> Result<Team, DomainError> {
    let dto = teams_adapter::TeamCreate::new(session_id, name);
    Ok(Team::from(teams_adapter::create_team(conn, dto).await?))
}

/// Serialize leader elections on `team_id` for the rest of the transaction.
pub async fn lock_for_election<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<(), DomainError> {
    match teams_adapter::bump_version(conn, team_id).await? {
        1 => Ok(()),
        _ => Err(DomainError::not_found(
            NotFoundKind::Team,
            format!("Team {team_id} not found"),
        )),
    }
}

pub async fn rename_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    name: &str,
) -> Result<Team, DomainError> {
    teams_adapter::rename_team(conn, team_id, name).await?;
    require_team(conn, team_id).await
}

/// Overwrite the score; returns the team only when the value changed.
pub async fn store_score<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team: &Team,
    score: f64,
) -> Result<Option<Team>, DomainError> {
    if team.score == score {
        return Ok(None);
    }
    teams_adapter::set_score(conn, &team.id, score).await?;
    Ok(Some(Team {
        score,
        ..team.clone()
    }))
}
