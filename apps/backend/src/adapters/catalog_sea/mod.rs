//! SeaORM adapter for the mini-game catalog.

use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::game_catalog;
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::CatalogCreate;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    catalog_id: &str,
) -> Result<Option<game_catalog::Model>, sea_orm::DbErr> {
    game_catalog::Entity::find_by_id(catalog_id.to_string())
        .one(conn)
        .await
}

pub async fn find_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<String>,
) -> Result<Vec<game_catalog::Model>, sea_orm::DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    game_catalog::Entity::find()
        .filter(game_catalog::Column::Id.is_in(ids))
        .all(conn)
        .await
}

/// Global entries plus the ones scoped to `session_id`.
pub async fn list_visible<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<game_catalog::Model>, sea_orm::DbErr> {
    game_catalog::Entity::find()
        .filter(
            Condition::any()
                .add(game_catalog::Column::SessionId.is_null())
                .add(game_catalog::Column::SessionId.eq(session_id)),
        )
        .order_by_asc(game_catalog::Column::CreatedAt)
        .order_by_asc(game_catalog::Column::Id)
        .all(conn)
        .await
}

pub async fn create_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CatalogCreate,
) -> Result<game_catalog::Model, sea_orm::DbErr> {
    game_catalog::ActiveModel {
        id: Set(new_id()),
        session_id: Set(dto.session_id),
        name: Set(dto.name),
        description: Set(dto.description),
        rule_key: Set(dto.rule_key),
        stat_schema: Set(dto.stat_schema),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}
