//! SeaORM adapter for drafted games.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::drafted_games::{self, GameStatus};
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::{DraftedGameCreate, GameResultUpdate};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Option<drafted_games::Model>, sea_orm::DbErr> {
    drafted_games::Entity::find_by_id(game_id.to_string())
        .one(conn)
        .await
}

pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<drafted_games::Model, sea_orm::DbErr> {
    find_by_id(conn, game_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Game not found".to_string()))
}

/// Drafted games of a session in draft order.
pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<drafted_games::Model>, sea_orm::DbErr> {
    drafted_games::Entity::find()
        .filter(drafted_games::Column::SessionId.eq(session_id))
        .order_by_asc(drafted_games::Column::DraftOrder)
        .all(conn)
        .await
}

pub async fn count_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    drafted_games::Entity::find()
        .filter(drafted_games::Column::SessionId.eq(session_id))
        .count(conn)
        .await
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: DraftedGameCreate,
) -> Result<drafted_games::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    drafted_games::ActiveModel {
        id: Set(new_id()),
        session_id: Set(dto.session_id),
        catalog_id: Set(dto.catalog_id),
        draft_order: Set(dto.draft_order),
        picking_team_id: Set(dto.picking_team_id),
        status: Set(dto.status),
        result_kind: Set(None),
        winning_team_id: Set(None),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Move `game_id` from `from` to `to`. Returns whether the row was still in
/// `from`.
pub async fn cas_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    from: GameStatus,
    to: GameStatus,
) -> Result<bool, sea_orm::DbErr> {
    let result = drafted_games::Entity::update_many()
        .col_expr(drafted_games::Column::Status, Expr::value(to))
        .col_expr(
            drafted_games::Column::Version,
            Expr::col(drafted_games::Column::Version).add(1),
        )
        .col_expr(
            drafted_games::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(drafted_games::Column::Id.eq(game_id))
        .filter(drafted_games::Column::Status.eq(from))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Record the outcome; only lands while the game is being scored.
pub async fn set_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameResultUpdate,
) -> Result<bool, sea_orm::DbErr> {
    let result = drafted_games::Entity::update_many()
        .col_expr(drafted_games::Column::ResultKind, Expr::value(Some(dto.kind)))
        .col_expr(
            drafted_games::Column::WinningTeamId,
            Expr::value(dto.winning_team_id),
        )
        .col_expr(
            drafted_games::Column::Version,
            Expr::col(drafted_games::Column::Version).add(1),
        )
        .col_expr(
            drafted_games::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(drafted_games::Column::Id.eq(dto.game_id))
        .filter(drafted_games::Column::Status.eq(GameStatus::Scoring))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}
