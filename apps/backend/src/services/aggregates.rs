//! Read-only views for the scoreboard, the ceremony and reconnecting
//! clients.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::domain::standings::{self, LeaderboardRow, Standings};
use crate::entities::participants::ParticipantRole;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::catalog::{self, CatalogEntry};
use crate::repos::dice::{self, DicePick, DiceRoll};
use crate::repos::drafted_games::{self, DraftedGame};
use crate::repos::leader_votes::{self, LeaderVote};
use crate::repos::participants::{self, Participant};
use crate::repos::sessions::{self, Session};
use crate::repos::statistics::{self, Statistic};
use crate::repos::teams::{self, Team};
use crate::repos::titles::{self, Title};

/// Every entity of one session as currently stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Gateway sequence the snapshot is at least as new as.
    pub seq: u64,
    pub session: Session,
    pub teams: Vec<Team>,
    pub participants: Vec<Participant>,
    pub leader_votes: Vec<LeaderVote>,
    pub catalog: Vec<CatalogEntry>,
    pub drafted_games: Vec<DraftedGame>,
    pub dice_roll: Option<DiceRoll>,
    pub dice_picks: Vec<DicePick>,
    pub statistics: Vec<Statistic>,
    pub titles: Vec<Title>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameHistory {
    pub game: DraftedGame,
    pub game_name: String,
    pub titles: Vec<Title>,
    pub statistics: Vec<Statistic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantHistory {
    pub participant: Participant,
    /// Games in draft order.
    pub games: Vec<GameHistory>,
    pub global_titles: Vec<Title>,
    pub points: f64,
}

#[derive(Default)]
pub struct AggregateService;

impl AggregateService {
    pub async fn team_standings<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
    ) -> Result<Standings, AppError> {
        sessions::require_session(conn, session_id).await?;
        let teams = teams::list_by_session(conn, session_id).await?;
        Ok(standings::rank_teams(
            teams.into_iter().map(|t| (t.id, t.name, t.score)).collect(),
        ))
    }

    pub async fn title_leaderboard<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
    ) -> Result<Vec<LeaderboardRow>, AppError> {
        sessions::require_session(conn, session_id).await?;
        let all_titles = titles::list_by_session(conn, session_id).await?;
        let mut rows: Vec<LeaderboardRow> = participants::list_by_session(conn, session_id)
            .await?
            .into_iter()
            .filter(|p| p.role == ParticipantRole::Player)
            .map(|p| {
                let held: Vec<&Title> = all_titles
                    .iter()
                    .filter(|t| t.participant_id == p.id)
                    .collect();
                LeaderboardRow {
                    titles: held.len(),
                    humorous: held.iter().filter(|t| t.is_humorous).count(),
                    points: held.iter().map(|t| t.points).sum(),
                    participant_id: p.id,
                    name: p.name,
                    team_id: p.team_id,
                }
            })
            .collect();
        standings::sort_leaderboard(&mut rows);
        Ok(rows)
    }

    pub async fn participant_history<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
        participant_id: &str,
    ) -> Result<ParticipantHistory, AppError> {
        let participant = participants::require_participant(conn, participant_id).await?;
        if participant.session_id != session_id {
            return Err(DomainError::not_found(
                NotFoundKind::Participant,
                format!("Participant {participant_id} not found in session {session_id}"),
            )
            .into());
        }

        let games = drafted_games::list_by_session(conn, session_id).await?;
        let names = catalog::find_many(conn, games.iter().map(|g| g.catalog_id.clone()).collect())
            .await?;
        let held: Vec<Title> = titles::list_by_session(conn, session_id)
            .await?
            .into_iter()
            .filter(|t| t.participant_id == participant.id)
            .collect();
        let stats: Vec<Statistic> =
            statistics::list_by_games(conn, games.iter().map(|g| g.id.clone()).collect())
                .await?
                .into_iter()
                .filter(|s| s.participant_id == participant.id)
                .collect();

        let points = held.iter().map(|t| t.points).sum();
        let (global_titles, game_titles): (Vec<Title>, Vec<Title>) =
            held.into_iter().partition(Title::is_global);

        let games = games
            .into_iter()
            .map(|game| GameHistory {
                game_name: names
                    .iter()
                    .find(|e| e.id == game.catalog_id)
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                titles: game_titles
                    .iter()
                    .filter(|t| t.drafted_game_id.as_deref() == Some(game.id.as_str()))
                    .cloned()
                    .collect(),
                statistics: stats
                    .iter()
                    .filter(|s| s.drafted_game_id == game.id)
                    .cloned()
                    .collect(),
                game,
            })
            .collect();

        Ok(ParticipantHistory {
            participant,
            games,
            global_titles,
            points,
        })
    }

    /// Full session state; `seq` must be read from the gateway before this
    /// call so no event between the two reads is lost.
    pub async fn session_snapshot<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
        seq: u64,
    ) -> Result<SessionSnapshot, AppError> {
        let session = sessions::require_session(conn, session_id).await?;
        let teams = teams::list_by_session(conn, session_id).await?;
        let participants = participants::list_by_session(conn, session_id).await?;
        let leader_votes =
            leader_votes::list_by_teams(conn, teams.iter().map(|t| t.id.clone()).collect()).await?;
        let catalog = catalog::list_visible(conn, session_id).await?;
        let drafted_games = drafted_games::list_by_session(conn, session_id).await?;
        let dice_roll = dice::find_roll(conn, session_id).await?;
        let dice_picks = match &dice_roll {
            Some(roll) => dice::list_picks(conn, session_id, roll.round).await?,
            None => Vec::new(),
        };
        let statistics =
            statistics::list_by_games(conn, drafted_games.iter().map(|g| g.id.clone()).collect())
                .await?;
        let titles = titles::list_by_session(conn, session_id).await?;

        Ok(SessionSnapshot {
            seq,
            session,
            teams,
            participants,
            leader_votes,
            catalog,
            drafted_games,
            dice_roll,
            dice_picks,
            statistics,
            titles,
        })
    }
}
