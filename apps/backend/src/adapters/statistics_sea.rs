//! SeaORM adapter for per-game statistics.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::statistics;
use crate::utils::ids::new_id;

pub async fn list_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Vec<statistics::Model>, sea_orm::DbErr> {
    statistics::Entity::find()
        .filter(statistics::Column::DraftedGameId.eq(game_id))
        .order_by_asc(statistics::Column::CreatedAt)
        .order_by_asc(statistics::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_games<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_ids: Vec<String>,
) -> Result<Vec<statistics::Model>, sea_orm::DbErr> {
    if game_ids.is_empty() {
        return Ok(Vec::new());
    }
    statistics::Entity::find()
        .filter(statistics::Column::DraftedGameId.is_in(game_ids))
        .order_by_asc(statistics::Column::CreatedAt)
        .order_by_asc(statistics::Column::Id)
        .all(conn)
        .await
}

/// Insert or overwrite the value for `(game, participant, key)`.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    participant_id: &str,
    key: &str,
    value: f64,
) -> Result<statistics::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let existing = statistics::Entity::find()
        .filter(statistics::Column::DraftedGameId.eq(game_id))
        .filter(statistics::Column::ParticipantId.eq(participant_id))
        .filter(statistics::Column::Key.eq(key))
        .one(conn)
        .await?;

    match existing {
        Some(row) => {
            let mut active: statistics::ActiveModel = row.into();
            active.value = Set(value);
            active.updated_at = Set(now);
            active.update(conn).await
        }
        None => {
            statistics::ActiveModel {
                id: Set(new_id()),
                drafted_game_id: Set(game_id.to_string()),
                participant_id: Set(participant_id.to_string()),
                key: Set(key.to_string()),
                value: Set(value),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
        }
    }
}
