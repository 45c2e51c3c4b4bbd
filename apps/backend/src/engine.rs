//! Tournament engine facade.
//!
//! Each mutating operation runs in one transaction, collects the entities it
//! touched into an [`EventBatch`] and publishes that batch to the session's
//! subscribers only after the transaction committed.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction};
use tracing::debug;

use crate::config::engine::EngineConfig;
use crate::db::txn::{with_txn, TxnFuture};
use crate::domain::dice::{DiceSource, OsDice, SeededDice};
use crate::domain::standings::{LeaderboardRow, Standings};
use crate::domain::titles::TitleRuleRegistry;
use crate::entities::drafted_games::GameStatus;
use crate::entities::participants::ParticipantRole;
use crate::error::AppError;
use crate::realtime::{EventBatch, Subscription, SyncGateway};
use crate::repos::catalog::CatalogEntry;
use crate::repos::drafted_games::DraftedGame;
use crate::repos::participants::Participant;
use crate::repos::sessions::Session;
use crate::repos::statistics::Statistic;
use crate::repos::teams::Team;
use crate::repos::titles::Title;
use crate::services::{
    AggregateService, CatalogService, DiceService, DiceState, DraftService, GameAdvance,
    GameOutcome, IdentityService, LifecycleService, NewCatalogEntry, NewSession,
    ParticipantHistory, SessionSeat, SessionSnapshot, TeamService, TitleService, VoteResult,
};

#[derive(Clone)]
pub struct TournamentEngine {
    db: DatabaseConnection,
    gateway: Arc<SyncGateway>,
    config: Arc<EngineConfig>,
    dice: Arc<dyn DiceSource>,
    rules: Arc<TitleRuleRegistry>,
}

impl TournamentEngine {
    pub fn new(db: DatabaseConnection, config: EngineConfig) -> Self {
        let gateway = Arc::new(SyncGateway::new(config.event_buffer));
        let dice: Arc<dyn DiceSource> = match config.dice_seed {
            Some(seed) => Arc::new(SeededDice::new(seed)),
            None => Arc::new(OsDice),
        };
        Self {
            db,
            gateway,
            config: Arc::new(config),
            dice,
            rules: Arc::new(TitleRuleRegistry::with_builtins()),
        }
    }

    /// Replace the die, e.g. with a scripted one in tests.
    pub fn with_dice(mut self, dice: Arc<dyn DiceSource>) -> Self {
        self.dice = dice;
        self
    }

    pub fn with_rules(mut self, rules: TitleRuleRegistry) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn gateway(&self) -> &Arc<SyncGateway> {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    async fn mutate<R, F>(&self, op: &'static str, f: F) -> Result<R, AppError>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction, &'c mut EventBatch) -> TxnFuture<'c, R>
            + Send
            + 'static,
        R: Send + 'static,
    {
        let (value, batch) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let mut batch = EventBatch::new();
                let value = f(txn, &mut batch).await?;
                Ok((value, batch))
            })
        })
        .await?;

        if !batch.is_empty() {
            let published = self.gateway.publish(batch);
            debug!(op, events = published.len(), "Published changes");
        }
        Ok(value)
    }

    // ---- identity ----

    pub async fn create_session(&self, req: NewSession) -> Result<SessionSeat, AppError> {
        let max_round_target = self.config.max_round_target;
        self.mutate("create_session", move |txn, events| {
            Box::pin(async move {
                IdentityService
                    .create_session(txn, events, req, max_round_target)
                    .await
            })
        })
        .await
    }

    pub async fn join_session(
        &self,
        room_code: &str,
        name: &str,
        device_token: &str,
        role: ParticipantRole,
    ) -> Result<SessionSeat, AppError> {
        let room_code = room_code.to_owned();
        let name = name.to_owned();
        let device_token = device_token.to_owned();
        self.mutate("join_session", move |txn, events| {
            Box::pin(async move {
                IdentityService
                    .join_session(txn, events, &room_code, &name, &device_token, role)
                    .await
            })
        })
        .await
    }

    /// The open-session seat a device token is bound to, if any.
    pub async fn resolve(&self, device_token: &str) -> Result<Option<SessionSeat>, AppError> {
        IdentityService.resolve(&self.db, device_token).await
    }

    pub async fn resolve_in_session(
        &self,
        session_id: &str,
        device_token: &str,
    ) -> Result<Participant, AppError> {
        IdentityService
            .resolve_in_session(&self.db, session_id, device_token)
            .await
    }

    // ---- teams ----

    pub async fn create_team(
        &self,
        session_id: &str,
        actor_id: &str,
        name: &str,
    ) -> Result<Team, AppError> {
        let (session_id, actor_id, name) = owned3(session_id, actor_id, name);
        self.mutate("create_team", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .create_team(txn, events, &session_id, &actor_id, &name)
                    .await
            })
        })
        .await
    }

    pub async fn rename_team(
        &self,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        name: &str,
    ) -> Result<Team, AppError> {
        let (session_id, actor_id, team_id) = owned3(session_id, actor_id, team_id);
        let name = name.to_owned();
        self.mutate("rename_team", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .rename_team(txn, events, &session_id, &actor_id, &team_id, &name)
                    .await
            })
        })
        .await
    }

    pub async fn join_team(
        &self,
        session_id: &str,
        actor_id: &str,
        participant_id: &str,
        team_id: &str,
    ) -> Result<Participant, AppError> {
        let (session_id, actor_id, participant_id) = owned3(session_id, actor_id, participant_id);
        let team_id = team_id.to_owned();
        self.mutate("join_team", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .join_team(txn, events, &session_id, &actor_id, &participant_id, &team_id)
                    .await
            })
        })
        .await
    }

    pub async fn leave_team(
        &self,
        session_id: &str,
        actor_id: &str,
        participant_id: &str,
    ) -> Result<Participant, AppError> {
        let (session_id, actor_id, participant_id) = owned3(session_id, actor_id, participant_id);
        self.mutate("leave_team", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .leave_team(txn, events, &session_id, &actor_id, &participant_id)
                    .await
            })
        })
        .await
    }

    pub async fn vote_for_leader(
        &self,
        session_id: &str,
        voter_id: &str,
        team_id: &str,
        candidate_id: &str,
    ) -> Result<VoteResult, AppError> {
        let (session_id, voter_id, team_id) = owned3(session_id, voter_id, team_id);
        let candidate_id = candidate_id.to_owned();
        self.mutate("vote_for_leader", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .vote_for_leader(txn, events, &session_id, &voter_id, &team_id, &candidate_id)
                    .await
            })
        })
        .await
    }

    /// Close team formation and open the first-pick dice roll.
    pub async fn start_session(&self, session_id: &str, actor_id: &str) -> Result<Session, AppError> {
        let (session_id, actor_id) = (session_id.to_owned(), actor_id.to_owned());
        self.mutate("start_session", move |txn, events| {
            Box::pin(async move {
                TeamService
                    .start_session(txn, events, &session_id, &actor_id)
                    .await
            })
        })
        .await
    }

    // ---- dice ----

    pub async fn dice_state(&self, session_id: &str) -> Result<DiceState, AppError> {
        DiceService.dice_state(&self.db, session_id).await
    }

    pub async fn submit_dice_pick(
        &self,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        value: i64,
    ) -> Result<DiceState, AppError> {
        let (session_id, actor_id, team_id) = owned3(session_id, actor_id, team_id);
        let dice = Arc::clone(&self.dice);
        self.mutate("submit_dice_pick", move |txn, events| {
            Box::pin(async move {
                DiceService
                    .submit_pick(
                        txn,
                        events,
                        dice.as_ref(),
                        &session_id,
                        &actor_id,
                        &team_id,
                        value,
                    )
                    .await
            })
        })
        .await
    }

    pub async fn reset_dice_roll(
        &self,
        session_id: &str,
        actor_id: &str,
    ) -> Result<DiceState, AppError> {
        let (session_id, actor_id) = (session_id.to_owned(), actor_id.to_owned());
        self.mutate("reset_dice_roll", move |txn, events| {
            Box::pin(async move {
                DiceService
                    .reset(txn, events, &session_id, &actor_id)
                    .await
            })
        })
        .await
    }

    pub async fn confirm_dice_winner(
        &self,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Session, AppError> {
        let (session_id, actor_id) = (session_id.to_owned(), actor_id.to_owned());
        self.mutate("confirm_dice_winner", move |txn, events| {
            Box::pin(async move {
                DiceService
                    .confirm_winner(txn, events, &session_id, &actor_id)
                    .await
            })
        })
        .await
    }

    // ---- draft and games ----

    pub async fn list_available_games(&self, session_id: &str) -> Result<Vec<CatalogEntry>, AppError> {
        DraftService.list_available_games(&self.db, session_id).await
    }

    pub async fn pick_game(
        &self,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        catalog_id: &str,
    ) -> Result<DraftedGame, AppError> {
        let (session_id, actor_id, team_id) = owned3(session_id, actor_id, team_id);
        let catalog_id = catalog_id.to_owned();
        self.mutate("pick_game", move |txn, events| {
            Box::pin(async move {
                DraftService
                    .pick_game(txn, events, &session_id, &actor_id, &team_id, &catalog_id)
                    .await
            })
        })
        .await
    }

    pub async fn submit_statistic(
        &self,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        participant_id: &str,
        key: &str,
        value: f64,
    ) -> Result<Statistic, AppError> {
        let (session_id, actor_id, game_id) = owned3(session_id, actor_id, game_id);
        let (participant_id, key) = (participant_id.to_owned(), key.to_owned());
        self.mutate("submit_statistic", move |txn, events| {
            Box::pin(async move {
                LifecycleService
                    .submit_statistic(
                        txn,
                        events,
                        &session_id,
                        &actor_id,
                        &game_id,
                        &participant_id,
                        &key,
                        value,
                    )
                    .await
            })
        })
        .await
    }

    pub async fn record_game_result(
        &self,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        outcome: GameOutcome,
    ) -> Result<DraftedGame, AppError> {
        let (session_id, actor_id, game_id) = owned3(session_id, actor_id, game_id);
        self.mutate("record_game_result", move |txn, events| {
            Box::pin(async move {
                LifecycleService
                    .record_result(txn, events, &session_id, &actor_id, &game_id, outcome)
                    .await
            })
        })
        .await
    }

    pub async fn advance_game_status(
        &self,
        session_id: &str,
        actor_id: &str,
        game_id: &str,
        to: GameStatus,
    ) -> Result<GameAdvance, AppError> {
        let (session_id, actor_id, game_id) = owned3(session_id, actor_id, game_id);
        let rules = Arc::clone(&self.rules);
        let config = Arc::clone(&self.config);
        self.mutate("advance_game_status", move |txn, events| {
            Box::pin(async move {
                LifecycleService
                    .advance_status(
                        txn,
                        events,
                        &rules,
                        &config,
                        &session_id,
                        &actor_id,
                        &game_id,
                        to,
                    )
                    .await
            })
        })
        .await
    }

    // ---- completion ----

    pub async fn compute_global_titles(
        &self,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Vec<Title>, AppError> {
        let (session_id, actor_id) = (session_id.to_owned(), actor_id.to_owned());
        let config = Arc::clone(&self.config);
        self.mutate("compute_global_titles", move |txn, events| {
            Box::pin(async move {
                TitleService
                    .compute_global_titles(txn, events, &config, &session_id, &actor_id)
                    .await
            })
        })
        .await
    }

    /// Finish the session. Its change channel is closed once the final
    /// events went out.
    pub async fn finish_session(&self, session_id: &str, actor_id: &str) -> Result<Session, AppError> {
        let owned = (session_id.to_owned(), actor_id.to_owned());
        let config = Arc::clone(&self.config);
        let session = self
            .mutate("finish_session", move |txn, events| {
                Box::pin(async move {
                    let (session_id, actor_id) = owned;
                    TitleService
                        .finish_session(txn, events, &config, &session_id, &actor_id)
                        .await
                })
            })
            .await?;
        self.gateway.close(session_id);
        Ok(session)
    }

    // ---- catalog ----

    pub async fn create_global_catalog_entry(
        &self,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        let rules = Arc::clone(&self.rules);
        // Global entries belong to no session and have no subscribers.
        self.mutate("create_global_catalog_entry", move |txn, _events| {
            Box::pin(async move { CatalogService.create_global_entry(txn, &rules, entry).await })
        })
        .await
    }

    pub async fn create_session_catalog_entry(
        &self,
        session_id: &str,
        actor_id: &str,
        entry: NewCatalogEntry,
    ) -> Result<CatalogEntry, AppError> {
        let (session_id, actor_id) = (session_id.to_owned(), actor_id.to_owned());
        let rules = Arc::clone(&self.rules);
        self.mutate("create_session_catalog_entry", move |txn, events| {
            Box::pin(async move {
                CatalogService
                    .create_session_entry(txn, events, &rules, &session_id, &actor_id, entry)
                    .await
            })
        })
        .await
    }

    // ---- aggregates ----

    pub async fn team_standings(&self, session_id: &str) -> Result<Standings, AppError> {
        AggregateService.team_standings(&self.db, session_id).await
    }

    pub async fn title_leaderboard(&self, session_id: &str) -> Result<Vec<LeaderboardRow>, AppError> {
        AggregateService.title_leaderboard(&self.db, session_id).await
    }

    pub async fn participant_history(
        &self,
        session_id: &str,
        participant_id: &str,
    ) -> Result<ParticipantHistory, AppError> {
        AggregateService
            .participant_history(&self.db, session_id, participant_id)
            .await
    }

    pub async fn session_snapshot(&self, session_id: &str) -> Result<SessionSnapshot, AppError> {
        // Sequence first: anything published after this read is replayed.
        let seq = self.gateway.current_seq(session_id);
        AggregateService
            .session_snapshot(&self.db, session_id, seq)
            .await
    }

    // ---- sync ----

    pub fn subscribe(&self, session_id: &str) -> Subscription {
        self.gateway.subscribe(session_id)
    }
}

fn owned3(a: &str, b: &str, c: &str) -> (String, String, String) {
    (a.to_owned(), b.to_owned(), c.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::db::DbKind;
    use crate::infra::db::bootstrap_db;

    #[tokio::test]
    async fn dice_seed_selects_a_reproducible_die() {
        let config = EngineConfig {
            dice_seed: Some(11),
            ..EngineConfig::default()
        };
        let engine = TournamentEngine::new(bootstrap_db(DbKind::SqliteMemory).await.unwrap(), config);
        let reference = SeededDice::new(11);
        for _ in 0..20 {
            assert_eq!(engine.dice.roll(), reference.roll());
        }
    }
}
