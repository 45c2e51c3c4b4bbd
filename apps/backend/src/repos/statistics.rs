//! Statistic repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::statistics_sea as stats_adapter;
use crate::domain::titles::StatLine;
use crate::entities::statistics;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistic {
    pub id: String,
    pub drafted_game_id: String,
    pub participant_id: String,
    pub key: String,
    pub value: f64,
}

impl Statistic {
    pub fn line(&self) -> StatLine {
        StatLine {
            participant_id: self.participant_id.clone(),
            key: self.key.clone(),
            value: self.value,
        }
    }
}

impl From<statistics::Model> for Statistic {
    fn from(m: statistics::Model) -> Self {
        Self {
            id: m.id,
            drafted_game_id: m.drafted_game_id,
            participant_id: m.participant_id,
            key: m.key,
            value: m.value,
        }
    }
}

pub async fn list_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Vec<Statistic>, DomainError> {
    let rows = stats_adapter::list_by_game(conn, game_id).await?;
    Ok(rows.into_iter().map(Statistic::from).collect())
}

pub async fn list_by_games<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_ids: Vec<String>,
) -> Result<Vec<Statistic>, DomainError> {
    let rows = stats_adapter::list_by_games(conn, game_ids).await?;
    Ok(rows.into_iter().map(Statistic::from).collect())
}

pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    participant_id: &str,
    key: &str,
    value: f64,
) -> Result<Statistic, DomainError> {
    let row = stats_adapter::upsert(conn, game_id, participant_id, key, value).await?;
    Ok(Statistic::from(row))
}
