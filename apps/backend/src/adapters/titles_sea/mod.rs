//! SeaORM adapter for awarded titles. Rows are only ever inserted.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::titles;
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::TitleCreate;

pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<titles::Model>, sea_orm::DbErr> {
    titles::Entity::find()
        .filter(titles::Column::SessionId.eq(session_id))
        .order_by_asc(titles::Column::CreatedAt)
        .order_by_asc(titles::Column::Id)
        .all(conn)
        .await
}

pub async fn list_global<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<titles::Model>, sea_orm::DbErr> {
    titles::Entity::find()
        .filter(titles::Column::SessionId.eq(session_id))
        .filter(titles::Column::DraftedGameId.is_null())
        .order_by_asc(titles::Column::CreatedAt)
        .order_by_asc(titles::Column::Id)
        .all(conn)
        .await
}

pub async fn count_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    titles::Entity::find()
        .filter(titles::Column::DraftedGameId.eq(game_id))
        .count(conn)
        .await
}

/// Insert titles one by one and return the stored rows in input order.
pub async fn insert_all<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    rows: Vec<TitleCreate>,
) -> Result<Vec<titles::Model>, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let mut stored = Vec::with_capacity(rows.len());
    for dto in rows {
        let model = titles::ActiveModel {
            id: Set(new_id()),
            session_id: Set(dto.session_id),
            drafted_game_id: Set(dto.drafted_game_id),
            participant_id: Set(dto.participant_id),
            name: Set(dto.name),
            description: Set(dto.description),
            is_humorous: Set(dto.is_humorous),
            points: Set(dto.points),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;
        stored.push(model);
    }
    Ok(stored)
}
