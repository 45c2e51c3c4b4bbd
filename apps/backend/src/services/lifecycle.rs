//! Drafted-game lifecycle: statistics, results and status advances.

use sea_orm::DatabaseTransaction;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::access::{actor_in_session, mutable_session, require_referee};
use super::titles::TitleService;
use crate::config::engine::EngineConfig;
use crate::domain::lifecycle::{
    accepts_statistics, ensure_game_step, ensure_session_transition, require_session_status,
};
use crate::domain::titles::TitleRuleRegistry;
use crate::entities::drafted_games::GameStatus;
use crate::entities::participants::ParticipantRole;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use crate::realtime::EventBatch;
use crate::repos::drafted_games::{self, DraftedGame, GameResultUpdate};
use crate::repos::sessions::{self, Session, SessionCas};
use crate::repos::statistics::{self, Statistic};
use crate::repos::teams;

const MAX_STAT_KEY_LEN: usize = 64;

/// Result the referee records for a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameOutcome {
    Team { team_id: String },
    Tie,
}

/// A game after an advance, plus the session when the session moved too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameAdvance {
    pub game: DraftedGame,
    pub session: Option<Session>,
}

#[derive(Default)]
pub struct LifecycleService;

impl LifecycleService {
    /// Record one statistic. Players report their own; the referee may
    /// report anyone's.
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_statistic(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        participant_id: &str,
        key: &str,
        value: f64,
    ) -> Result<Statistic, AppError> {
        debug!(session_id, game_id, participant_id, key, "Submitting statistic");
        mutable_session(txn, session_id).await?;
        let game = game_in_session(txn, session_id, game_id).await?;
        if !accepts_statistics(game.status) {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Game is {:?} and no longer accepts statistics", game.status),
            )
            .into());
        }

        let actor = actor_in_session(txn, session_id, actor_id).await?;
        if !actor.is_referee() && actor.id != participant_id {
            return Err(DomainError::forbidden(
                ForbiddenKind::RefereeOnly,
                "Only the referee may submit statistics for someone else",
            )
            .into());
        }
        let subject = actor_in_session(txn, session_id, participant_id).await?;
        if subject.role != ParticipantRole::Player {
            return Err(DomainError::validation(
                ValidationKind::InvalidRole,
                "Statistics are recorded for players only",
            )
            .into());
        }

        let key = key.trim();
        if key.is_empty() || key.len() > MAX_STAT_KEY_LEN {
            return Err(DomainError::validation(
                ValidationKind::InvalidStatistic,
                format!("statistic key must be 1-{MAX_STAT_KEY_LEN} bytes"),
            )
            .into());
        }
        if !value.is_finite() {
            return Err(DomainError::validation(
                ValidationKind::InvalidStatistic,
                format!("statistic '{key}' must be a finite number"),
            )
            .into());
        }

        let stat = statistics::upsert(txn, &game.id, &subject.id, key, value).await?;
        events.upsert(session_id, &stat);
        Ok(stat)
    }

    pub async fn record_result(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        outcome: GameOutcome,
    ) -> Result<DraftedGame, AppError> {
        debug!(session_id, game_id, ?outcome, "Recording game result");
        mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "record game results")?;
        let game = game_in_session(txn, session_id, game_id).await?;
        if game.status != GameStatus::Scoring {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Results are recorded while the game is scoring",
            )
            .into());
        }

        let update = match &outcome {
            GameOutcome::Team { team_id } => {
                let team = teams::require_team(txn, team_id).await?;
                if team.session_id != session_id {
                    return Err(DomainError::validation_other(format!(
                        "team {team_id} does not belong to session {session_id}"
                    ))
                    .into());
                }
                GameResultUpdate::team(&game.id, team.id)
            }
            GameOutcome::Tie => GameResultUpdate::tie(&game.id),
        };
        let game = drafted_games::set_result(txn, update)
            .await?
            .ok_or_else(|| stale("Game moved on before the result was recorded"))?;
        events.upsert(session_id, &game);
        info!(session_id, game_id, ?outcome, "Game result recorded");
        Ok(game)
    }

    /// Move a game one step forward. Reaching `titles` awards the game's
    /// titles; reaching `completed` recomputes team scores and hands the
    /// session back to the draft or on to scoring.
    #[allow(clippy::too_many_arguments)]
    pub async fn advance_status(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        rules: &TitleRuleRegistry,
        config: &EngineConfig,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        to: GameStatus,
    ) -> Result<GameAdvance, AppError> {
        debug!(session_id, game_id, ?to, "Advancing game");
        let session = mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "advance games")?;
        require_session_status(session.status, SessionStatus::Active, "Advancing a game")?;

        let game = game_in_session(txn, session_id, game_id).await?;
        ensure_game_step(game.status, to)?;
        if to == GameStatus::Titles && !game.has_result() {
            return Err(DomainError::validation(
                ValidationKind::ResultMissing,
                "Record the game result before awarding titles",
            )
            .into());
        }

        let game = drafted_games::advance_status(txn, &game.id, game.status, to)
            .await?
            .ok_or_else(|| stale("Game status changed concurrently"))?;
        events.upsert(session_id, &game);
        info!(session_id, game_id, status = ?game.status, "Game advanced");

        let titles = TitleService;
        match to {
            GameStatus::Titles => {
                titles
                    .award_game_titles(txn, events, rules, config, &game)
                    .await?;
                Ok(GameAdvance {
                    game,
                    session: None,
                })
            }
            GameStatus::Completed => {
                titles.recompute_team_scores(txn, events, session_id).await?;
                let session = self.after_game_completed(txn, events, &session).await?;
                Ok(GameAdvance {
                    game,
                    session: Some(session),
                })
            }
            _ => Ok(GameAdvance {
                game,
                session: None,
            }),
        }
    }

    /// Back to drafting while rounds remain, otherwise on to scoring.
    async fn after_game_completed(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session: &Session,
    ) -> Result<Session, AppError> {
        let games = drafted_games::list_by_session(txn, &session.id).await?;
        let all_done = games.iter().all(|g| g.status == GameStatus::Completed);
        let rounds_left = (games.len() as i32) < session.round_target;

        let cas = SessionCas::new(&session.id, SessionStatus::Active);
        let cas = if all_done && !rounds_left {
            ensure_session_transition(session.status, SessionStatus::Scoring)?;
            cas.to_status(SessionStatus::Scoring)
                .with_active_team(None)
                .with_on_deck(None)
        } else {
            ensure_session_transition(session.status, SessionStatus::Drafting)?;
            cas.to_status(SessionStatus::Drafting)
                .with_active_team(session.on_deck_team_id.clone())
                .with_on_deck(None)
        };
        let updated = sessions::apply_cas(txn, cas)
            .await?
            .ok_or_else(|| stale("Session moved on concurrently"))?;
        events.upsert(&session.id, &updated);
        info!(
            session_id = %session.id,
            status = ?updated.status,
            active_team = ?updated.active_draft_team_id,
            "Session advanced after game"
        );
        Ok(updated)
    }
}

async fn game_in_session(
    txn: &DatabaseTransaction,
    session_id: &str,
    game_id: &str,
) -> Result<DraftedGame, DomainError> {
    let game = drafted_games::require_game(txn, game_id).await?;
    if game.session_id != session_id {
        return Err(DomainError::not_found(
            NotFoundKind::DraftedGame,
            format!("Game {game_id} not found"),
        ));
    }
    Ok(game)
}

fn stale(detail: &str) -> DomainError {
    DomainError::conflict(ConflictKind::StaleState, detail)
}
