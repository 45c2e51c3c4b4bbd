//! DTOs for drafted_games_sea adapter.

use crate::entities::drafted_games::{GameStatus, ResultKind};

#[derive(Debug, Clone)]
pub struct DraftedGameCreate {
    pub session_id: String,
    pub catalog_id: String,
    pub draft_order: i32,
    pub picking_team_id: String,
    pub status: GameStatus,
}

/// Outcome written when the referee records a result.
#[derive(Debug, Clone)]
pub struct GameResultUpdate {
    pub game_id: String,
    pub kind: ResultKind,
    pub winning_team_id: Option<String>,
}

impl GameResultUpdate {
    pub fn team(game_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            kind: ResultKind::Team,
            winning_team_id: Some(team_id.into()),
        }
    }

    pub fn tie(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            kind: ResultKind::Tie,
            winning_team_id: None,
        }
    }
}
