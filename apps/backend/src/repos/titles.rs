//! Title repository functions. Titles are append-only.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::titles_sea as titles_adapter;
use crate::domain::titles::TitleGrant;
use crate::entities::titles;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub id: String,
    pub session_id: String,
    pub drafted_game_id: Option<String>,
    pub participant_id: String,
    pub name: String,
    pub description: String,
    pub is_humorous: bool,
    pub points: f64,
}

impl Title {
    pub fn is_global(&self) -> bool {
        self.drafted_game_id.is_none()
    }
}

impl From<titles::Model> for Title {
    fn from(m: titles::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            drafted_game_id: m.drafted_game_id,
            participant_id: m.participant_id,
            name: m.name,
            description: m.description,
            is_humorous: m.is_humorous,
            points: m.points,
        }
    }
}

pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<Title>, DomainError> {
    let rows = titles_adapter::list_by_session(conn, session_id).await?;
    Ok(rows.into_iter().map(Title::from).collect())
}

pub async fn list_global<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<Title>, DomainError> {
    let rows = titles_adapter::list_global(conn, session_id).await?;
    Ok(rows.into_iter().map(Title::from).collect())
}

pub async fn count_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, DomainError> {
    Ok(titles_adapter::count_by_game(conn, game_id).await?)
}

/// Persist grants for a game (`Some`) or as global titles (`None`).
pub async fn insert_grants<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    drafted_game_id: Option<&str>,
    grants: Vec<TitleGrant>,
) -> Result<Vec<Title>, DomainError> {
    let rows = grants
        .into_iter()
        .map(|g| titles_adapter::TitleCreate {
            session_id: session_id.to_string(),
            drafted_game_id: drafted_game_id.map(str::to_string),
            participant_id: g.participant_id,
            name: g.name,
            description: g.description,
            is_humorous: g.is_humorous,
            points: g.points,
        })
        .collect();
    let stored = titles_adapter::insert_all(conn, rows).await?;
    Ok(stored.into_iter().map(Title::from).collect())
}
