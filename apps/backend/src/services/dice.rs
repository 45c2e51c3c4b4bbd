//! Dice-roll tiebreak for the first draft pick.
//!
//! Each team leader picks a face once per round. The target is rolled only
//! after every team has picked, inside the transaction that records the last
//! pick, so no client can see it early.

use sea_orm::{ConnectionTrait, DatabaseTransaction};
use serde::Serialize;
use tracing::{debug, info};

use super::access::{actor_in_session, mutable_session, require_leader, require_leader_or_referee};
use crate::domain::dice::{self, DiceOutcome, DiceSource};
use crate::domain::lifecycle::require_session_status;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, ValidationKind};
use crate::realtime::EventBatch;
use crate::repos::dice::{self as dice_repo, DicePick, DiceRoll};
use crate::repos::participants::Participant;
use crate::repos::sessions::{self, Session, SessionCas};
use crate::repos::teams;

/// Current round with its picks and, once rolled, the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiceState {
    pub roll: DiceRoll,
    pub picks: Vec<DicePick>,
    pub outcome: Option<DiceOutcome>,
}

#[derive(Default)]
pub struct DiceService;

impl DiceService {
    pub async fn dice_state<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
    ) -> Result<DiceState, AppError> {
        let roll = dice_repo::require_roll(conn, session_id).await?;
        let picks = dice_repo::list_picks(conn, session_id, roll.round).await?;
        let outcome = roll.target.map(|t| dice::resolve(t, &team_values(&picks)));
        Ok(DiceState {
            roll,
            picks,
            outcome,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn submit_pick(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        source: &dyn DiceSource,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        value: i64,
    ) -> Result<DiceState, AppError> {
        debug!(session_id, team_id, actor_id, value, "Submitting dice pick");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Drafting, "Rolling dice")?;
        let value = dice::validate_pick(value)?;

        let roll = open_roll(txn, session_id).await?;
        if roll.target.is_some() {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Dice round {} is already revealed; reset to re-roll", roll.round),
            )
            .into());
        }

        let team = teams::require_team(txn, team_id).await?;
        if team.session_id != session_id {
            return Err(DomainError::validation_other(format!(
                "team {team_id} does not belong to session {session_id}"
            ))
            .into());
        }
        // Leadership is read now, not when the round opened.
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_leader(&actor, &team.id, "pick for the dice roll")?;

        if !dice_repo::claim_round(txn, session_id, roll.round).await? {
            return Err(stale("Dice round moved on; re-read and retry").into());
        }
        let pick =
            dice_repo::insert_pick(txn, session_id, roll.round, &team.id, &actor.id, value).await?;
        events.upsert(session_id, &pick);

        let picks = dice_repo::list_picks(txn, session_id, roll.round).await?;
        let team_count = teams::list_by_session(txn, session_id).await?.len();
        if picks.len() < team_count {
            let roll = dice_repo::require_roll(txn, session_id).await?;
            events.upsert(session_id, &roll);
            return Ok(DiceState {
                roll,
                picks,
                outcome: None,
            });
        }

        let target = source.roll();
        let outcome = dice::resolve(target, &team_values(&picks));
        let winner = match &outcome {
            DiceOutcome::Winner { team_id } => Some(team_id.clone()),
            DiceOutcome::Tied { .. } => None,
        };
        let roll = dice_repo::set_outcome(txn, session_id, roll.round, target, winner)
            .await?
            .ok_or_else(|| stale("Dice round was rolled concurrently"))?;
        events.upsert(session_id, &roll);

        info!(session_id, round = roll.round, target, ?outcome, "Dice rolled");
        Ok(DiceState {
            roll,
            picks,
            outcome: Some(outcome),
        })
    }

    /// Start a fresh round: picks and target are cleared, round increments.
    pub async fn reset(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
    ) -> Result<DiceState, AppError> {
        debug!(session_id, actor_id, "Resetting dice roll");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Drafting, "Rolling dice")?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        if !actor.is_referee() && !leads_any_team(&actor) {
            return Err(DomainError::forbidden(
                ForbiddenKind::LeaderOnly,
                "Only a team leader or the referee may re-roll",
            )
            .into());
        }

        let roll = open_roll(txn, session_id).await?;
        let next = dice_repo::advance_round(txn, session_id, roll.round)
            .await?
            .ok_or_else(|| stale("Dice round changed concurrently"))?;
        let cleared = dice_repo::delete_picks(txn, session_id, roll.round).await?;
        for pick in &cleared {
            events.delete(session_id, pick);
        }
        events.upsert(session_id, &next);

        info!(session_id, round = next.round, "Dice re-roll");
        Ok(DiceState {
            roll: next,
            picks: Vec::new(),
            outcome: None,
        })
    }

    /// Lock in the winner, who then holds the first draft turn.
    pub async fn confirm_winner(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Session, AppError> {
        debug!(session_id, actor_id, "Confirming dice winner");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Drafting, "Rolling dice")?;
        let roll = open_roll(txn, session_id).await?;
        let winner = roll.winner_team_id.clone().ok_or_else(|| {
            DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("Dice round {} has no winner to confirm", roll.round),
            )
        })?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_leader_or_referee(&actor, &winner, "confirm the dice winner")?;

        let roll = dice_repo::confirm(txn, session_id, roll.round, &winner)
            .await?
            .ok_or_else(|| stale("Dice roll was confirmed or reset concurrently"))?;
        let cas = SessionCas::new(session_id, SessionStatus::Drafting)
            .with_active_team(Some(winner.clone()))
            .with_on_deck(None);
        let session = sessions::apply_cas(txn, cas)
            .await?
            .ok_or_else(|| stale("Session moved on before the dice were confirmed"))?;

        events.upsert(session_id, &roll);
        events.upsert(session_id, &session);
        info!(session_id, team_id = %winner, "Dice winner drafts first");
        Ok(session)
    }
}

/// The session's roll, which must not be confirmed yet.
async fn open_roll(txn: &DatabaseTransaction, session_id: &str) -> Result<DiceRoll, DomainError> {
    let roll = dice_repo::require_roll(txn, session_id).await?;
    if roll.confirmed_at.is_some() {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            "The dice roll is already decided",
        ));
    }
    Ok(roll)
}

fn leads_any_team(actor: &Participant) -> bool {
    actor
        .team_id
        .as_deref()
        .is_some_and(|team_id| actor.leads(team_id))
}

fn team_values(picks: &[DicePick]) -> Vec<(String, i16)> {
    picks
        .iter()
        .map(|p| (p.team_id.clone(), p.value))
        .collect()
}

fn stale(detail: &str) -> DomainError {
    DomainError::conflict(ConflictKind::StaleState, detail)
}
