//! Dice roll repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::dice_sea as dice_adapter;
use crate::domain::dice::{self, DicePhase};
use crate::entities::{dice_picks, dice_rolls};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceRoll {
    pub session_id: String,
    pub round: i32,
    pub target: Option<i16>,
    pub winner_team_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub confirmed_at: Option<OffsetDateTime>,
    pub phase: DicePhase,
    pub version: i32,
}

impl From<dice_rolls::Model> for DiceRoll {
    fn from(m: dice_rolls::Model) -> Self {
        let phase = dice::phase(
            m.target,
            m.winner_team_id.is_some(),
            m.confirmed_at.is_some(),
        );
        Self {
            session_id: m.session_id,
            round: m.round,
            target: m.target,
            winner_team_id: m.winner_team_id,
            confirmed_at: m.confirmed_at,
            phase,
            version: m.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DicePick {
    pub id: String,
    pub session_id: String,
    pub round: i32,
    pub team_id: String,
    pub participant_id: String,
    pub value: i16,
}

impl From<dice_picks::Model> for DicePick {
    fn from(m: dice_picks::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            round: m.round,
            team_id: m.team_id,
            participant_id: m.participant_id,
            value: m.value,
        }
    }
}

pub async fn find_roll<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<DiceRoll>, DomainError> {
    Ok(dice_adapter::find_roll(conn, session_id)
        .await?
        .map(DiceRoll::from))
}

pub async fn require_roll<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<DiceRoll, DomainError> {
    find_roll(conn, session_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::DiceRoll,
            format!("No dice roll for session {session_id}"),
        )
    })
}

pub async fn create_roll<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<DiceRoll, DomainError> {
    Ok(DiceRoll::from(
        dice_adapter::create_roll(conn, session_id).await?,
    ))
}

pub async fn claim_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<bool, DomainError> {
    Ok(dice_adapter::claim_round(conn, session_id, round).await?)
}

pub async fn set_outcome<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    target: i16,
    winner_team_id: Option<String>,
) -> Result<Option<DiceRoll>, DomainError> {
    if !dice_adapter::set_outcome(conn, session_id, round, target, winner_team_id).await? {
        return Ok(None);
    }
    Ok(Some(require_roll(conn, session_id).await?))
}

pub async fn advance_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<Option<DiceRoll>, DomainError> {
    if !dice_adapter::advance_round(conn, session_id, round).await? {
        return Ok(None);
    }
    Ok(Some(require_roll(conn, session_id).await?))
}

pub async fn confirm<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    winner_team_id: &str,
) -> Result<Option<DiceRoll>, DomainError> {
    if !dice_adapter::confirm(conn, session_id, round, winner_team_id).await? {
        return Ok(None);
    }
    Ok(Some(require_roll(conn, session_id).await?))
}

pub async fn list_picks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<Vec<DicePick>, DomainError> {
    let rows = dice_adapter::list_picks(conn, session_id, round).await?;
    Ok(rows.into_iter().map(DicePick::from).collect())
}

pub async fn insert_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    team_id: &str,
    participant_id: &str,
    value: i16,
) -> Result<DicePick, DomainError> {
    let row =
        dice_adapter::insert_pick(conn, session_id, round, team_id, participant_id, value).await?;
    Ok(DicePick::from(row))
}

pub async fn delete_picks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<Vec<DicePick>, DomainError> {
    let rows = dice_adapter::delete_picks(conn, session_id, round).await?;
    Ok(rows.into_iter().map(DicePick::from).collect())
}
