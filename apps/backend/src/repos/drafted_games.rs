//! Drafted game repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::drafted_games_sea as games_adapter;
use crate::entities::drafted_games::{self, GameStatus, ResultKind};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use games_adapter::{DraftedGameCreate, GameResultUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftedGame {
    pub id: String,
    pub session_id: String,
    pub catalog_id: String,
    pub draft_order: i32,
    pub picking_team_id: String,
    pub status: GameStatus,
    pub result_kind: Option<ResultKind>,
    pub winning_team_id: Option<String>,
    pub version: i32,
}

impl DraftedGame {
    pub fn has_result(&self) -> bool {
        self.result_kind.is_some()
    }
}

impl From<drafted_games::Model> for DraftedGame {
    fn from(m: drafted_games::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            catalog_id: m.catalog_id,
            draft_order: m.draft_order,
            picking_team_id: m.picking_team_id,
            status: m.status,
            result_kind: m.result_kind,
            winning_team_id: m.winning_team_id,
            version: m.version,
        }
    }
}

pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<DraftedGame, DomainError> {
    games_adapter::find_by_id(conn, game_id)
        .await?
        .map(DraftedGame::from)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::DraftedGame, format!("Game {game_id} not found"))
        })
}

/// Draft order.
pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<DraftedGame>, DomainError> {
    let rows = games_adapter::list_by_session(conn, session_id).await?;
    Ok(rows.into_iter().map(DraftedGame::from).collect())
}

pub async fn count_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, DomainError> {
    Ok(games_adapter::count_by_session(conn, session_id).await?)
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: DraftedGameCreate,
) -> Result<DraftedGame, DomainError> {
    Ok(DraftedGame::from(games_adapter::create_game(conn, dto).await?))
}

/// Guarded status step; `None` when the game already moved on.
pub async fn advance_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    from: GameStatus,
    to: GameStatus,
) -> Result<Option<DraftedGame>, DomainError> {
    if !games_adapter::cas_status(conn, game_id, from, to).await? {
        return Ok(None);
    }
    Ok(Some(require_game(conn, game_id).await?))
}

pub async fn set_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameResultUpdate,
) -> Result<Option<DraftedGame>, DomainError> {
    let game_id = dto.game_id.clone();
    if !games_adapter::set_result(conn, dto).await? {
        return Ok(None);
    }
    Ok(Some(require_game(conn, &game_id).await?))
}
