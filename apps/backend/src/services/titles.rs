//! Title scoring: per-game titles, team scores and tournament-wide titles.

use sea_orm::DatabaseTransaction;
use tracing::{debug, info, warn};

use super::access::{actor_in_session, mutable_session, require_referee};
use crate::config::engine::EngineConfig;
use crate::domain::lifecycle::{ensure_session_transition, require_session_status};
use crate::domain::standings::team_score;
use crate::domain::titles::global::{PriorTitle, RosterEntry};
use crate::domain::titles::{
    compute_global_titles, GlobalTitleInput, GlobalTitlePoints, TitleRuleRegistry,
};
use crate::entities::drafted_games::GameStatus;
use crate::entities::participants::ParticipantRole;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::realtime::EventBatch;
use crate::repos::catalog;
use crate::repos::drafted_games::{self, DraftedGame};
use crate::repos::participants;
use crate::repos::sessions::{self, Session, SessionCas};
use crate::repos::statistics::{self, Statistic};
use crate::repos::teams::{self, Team};
use crate::repos::titles::{self, Title};

#[derive(Default)]
pub struct TitleService;

impl TitleService {
    /// Run the game's title rule once. Later calls for the same game are
    /// no-ops returning nothing.
    pub async fn award_game_titles(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        rules: &TitleRuleRegistry,
        config: &EngineConfig,
        game: &DraftedGame,
    ) -> Result<Vec<Title>, AppError> {
        if titles::count_by_game(txn, &game.id).await? > 0 {
            debug!(game_id = %game.id, "Game titles already awarded");
            return Ok(Vec::new());
        }
        let entry = catalog::require_entry(txn, &game.catalog_id).await?;
        let Some(rule) = rules.get(&entry.rule_key) else {
            warn!(
                game_id = %game.id,
                rule_key = %entry.rule_key,
                "no title rule registered; game awards no titles"
            );
            return Ok(Vec::new());
        };

        let lines: Vec<_> = statistics::list_by_game(txn, &game.id)
            .await?
            .iter()
            .map(Statistic::line)
            .collect();
        let grants = rule.compute(&entry.stat_schema, &lines, config.game_title_points);
        let awarded =
            titles::insert_grants(txn, &game.session_id, Some(&game.id), grants).await?;
        events.upsert_all(&game.session_id, &awarded);

        info!(
            session_id = %game.session_id,
            game_id = %game.id,
            rule_key = %entry.rule_key,
            titles = awarded.len(),
            "Game titles awarded"
        );
        Ok(awarded)
    }

    /// Full recompute of every team score from the titles of its current
    /// players. Returns the teams whose score changed.
    pub async fn recompute_team_scores(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
    ) -> Result<Vec<Team>, AppError> {
        let all_titles = titles::list_by_session(txn, session_id).await?;
        let roster = participants::list_by_session(txn, session_id).await?;

        let mut changed = Vec::new();
        for team in teams::list_by_session(txn, session_id).await? {
            let members: Vec<&str> = roster
                .iter()
                .filter(|p| {
                    p.role == ParticipantRole::Player
                        && p.team_id.as_deref() == Some(team.id.as_str())
                })
                .map(|p| p.id.as_str())
                .collect();
            let score = team_score(
                &members,
                all_titles
                    .iter()
                    .map(|t| (t.participant_id.as_str(), t.points)),
            );
            if let Some(updated) = teams::store_score(txn, &team, score).await? {
                debug!(session_id, team_id = %updated.id, score, "Team score updated");
                changed.push(updated);
            }
        }
        events.upsert_all(session_id, &changed);
        Ok(changed)
    }

    /// Compute the tournament-wide titles. Referee only, while scoring.
    pub async fn compute_global_titles(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        config: &EngineConfig,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Vec<Title>, AppError> {
        debug!(session_id, "Computing global titles");
        let session = mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "compute global titles")?;
        require_session_status(session.status, SessionStatus::Scoring, "Global titles")?;
        self.ensure_global_titles(txn, events, config, &session).await
    }

    /// Write global titles unless they exist. A repeated or losing call
    /// returns the rows already written.
    pub(crate) async fn ensure_global_titles(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        config: &EngineConfig,
        session: &Session,
    ) -> Result<Vec<Title>, AppError> {
        let session_id = session.id.as_str();
        if !sessions::claim_global_titles(txn, session_id).await? {
            debug!(session_id, "Global titles already computed");
            return Ok(titles::list_global(txn, session_id).await?);
        }

        let roster: Vec<RosterEntry> = participants::list_by_session(txn, session_id)
            .await?
            .into_iter()
            .filter(|p| p.role == ParticipantRole::Player)
            .filter_map(|p| {
                p.team_id.map(|team_id| RosterEntry {
                    participant_id: p.id,
                    team_id,
                })
            })
            .collect();
        let completed: Vec<String> = drafted_games::list_by_session(txn, session_id)
            .await?
            .into_iter()
            .filter(|g| g.status == GameStatus::Completed)
            .map(|g| g.id)
            .collect();
        let game_titles: Vec<PriorTitle> = titles::list_by_session(txn, session_id)
            .await?
            .into_iter()
            .filter_map(|t| {
                t.drafted_game_id.map(|drafted_game_id| PriorTitle {
                    participant_id: t.participant_id,
                    drafted_game_id,
                    is_humorous: t.is_humorous,
                })
            })
            .collect();
        let stat_submissions: Vec<(String, String)> =
            statistics::list_by_games(txn, completed.clone())
                .await?
                .into_iter()
                .map(|s| (s.drafted_game_id, s.participant_id))
                .collect();

        let grants = compute_global_titles(
            &GlobalTitleInput {
                roster: &roster,
                completed_games: &completed,
                game_titles: &game_titles,
                stat_submissions: &stat_submissions,
            },
            GlobalTitlePoints::from(config),
        );
        let awarded = titles::insert_grants(txn, session_id, None, grants).await?;
        events.upsert_all(session_id, &awarded);
        self.recompute_team_scores(txn, events, session_id).await?;

        let session = sessions::require_session(txn, session_id).await?;
        events.upsert(session_id, &session);
        info!(session_id, titles = awarded.len(), "Global titles awarded");
        Ok(awarded)
    }

    /// Close the tournament. Global titles are computed first if needed.
    pub async fn finish_session(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        config: &EngineConfig,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Session, AppError> {
        debug!(session_id, actor_id, "Finishing session");
        let session = mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "finish the session")?;
        ensure_session_transition(session.status, SessionStatus::Finished)?;

        if session.global_titles_at.is_none() {
            self.ensure_global_titles(txn, events, config, &session)
                .await?;
        }

        let cas = SessionCas::new(session_id, SessionStatus::Scoring)
            .to_status(SessionStatus::Finished)
            .with_active_team(None)
            .with_on_deck(None);
        let session = sessions::apply_cas(txn, cas).await?.ok_or_else(|| {
            DomainError::conflict(ConflictKind::StaleState, "Session was finished concurrently")
        })?;
        events.upsert(session_id, &session);
        info!(session_id, "Session finished");
        Ok(session)
    }
}
