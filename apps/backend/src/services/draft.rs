//! Draft turns: the team holding the turn picks the next game.

use sea_orm::{ConnectionTrait, DatabaseTransaction};
use tracing::{debug, info};

use super::access::{actor_in_session, mutable_session, require_leader};
use crate::domain::draft::next_in_rotation;
use crate::domain::lifecycle::require_session_status;
use crate::entities::drafted_games::GameStatus;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::realtime::EventBatch;
use crate::repos::catalog::{self, CatalogEntry};
use crate::repos::dice;
use crate::repos::drafted_games::{self, DraftedGame, DraftedGameCreate};
use crate::repos::sessions::{self, SessionCas};
use crate::repos::teams;

#[derive(Default)]
pub struct DraftService;

impl DraftService {
    pub async fn pick_game(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        catalog_id: &str,
    ) -> Result<DraftedGame, AppError> {
        debug!(session_id, team_id, catalog_id, "Picking game");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Drafting, "Picking a game")?;

        let roll = dice::require_roll(txn, session_id).await?;
        if roll.confirmed_at.is_none() {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "The first pick has not been decided by the dice roll",
            )
            .into());
        }
        if session.active_draft_team_id.as_deref() != Some(team_id) {
            return Err(DomainError::conflict(
                ConflictKind::NotYourTurn,
                format!("Team {team_id} does not hold the draft turn"),
            )
            .into());
        }
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_leader(&actor, team_id, "pick a game")?;

        let entry = catalog::require_entry(txn, catalog_id).await?;
        if entry
            .session_id
            .as_deref()
            .is_some_and(|owner| owner != session_id)
        {
            return Err(DomainError::not_found(
                NotFoundKind::CatalogEntry,
                format!("Catalog entry {catalog_id} not found"),
            )
            .into());
        }

        let drafted = drafted_games::list_by_session(txn, session_id).await?;
        if drafted.iter().any(|g| g.catalog_id == entry.id) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyDrafted,
                format!("{} was already drafted", entry.name),
            )
            .into());
        }
        if drafted.len() >= session.round_target as usize {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Every round has already been drafted",
            )
            .into());
        }

        let order: Vec<String> = teams::list_by_session(txn, session_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();
        let on_deck = next_in_rotation(&order, team_id);

        // The conditional handoff is the mutual-exclusion point for
        // concurrent picks.
        let cas = SessionCas::new(session_id, SessionStatus::Drafting)
            .expect_active_team(team_id)
            .to_status(SessionStatus::Active)
            .with_active_team(None)
            .with_on_deck(on_deck);
        let session = sessions::apply_cas(txn, cas).await?.ok_or_else(|| {
            DomainError::conflict(ConflictKind::StaleState, "Another pick landed first")
        })?;

        let game = drafted_games::create_game(
            txn,
            DraftedGameCreate {
                session_id: session_id.to_string(),
                catalog_id: entry.id.clone(),
                draft_order: drafted.len() as i32 + 1,
                picking_team_id: team_id.to_string(),
                status: GameStatus::Active,
            },
        )
        .await?;

        events.upsert(session_id, &session);
        events.upsert(session_id, &game);
        info!(
            session_id,
            team_id,
            game_id = %game.id,
            draft_order = game.draft_order,
            on_deck = ?session.on_deck_team_id,
            "Game drafted"
        );
        Ok(game)
    }

    /// Global and session catalog entries not yet drafted in the session.
    pub async fn list_available_games<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
    ) -> Result<Vec<CatalogEntry>, AppError> {
        sessions::require_session(conn, session_id).await?;
        let drafted = drafted_games::list_by_session(conn, session_id).await?;
        let visible = catalog::list_visible(conn, session_id).await?;
        Ok(visible
            .into_iter()
            .filter(|e| !drafted.iter().any(|g| g.catalog_id == e.id))
            .collect())
    }
}
