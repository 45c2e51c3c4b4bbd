//! SeaORM adapter for teams.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::teams;
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::TeamCreate;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Option<teams::Model>, sea_orm::DbErr> {
    teams::Entity::find_by_id(team_id.to_string()).one(conn).await
}

/// Teams of a session in creation order (the draft rotation order).
pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<teams::Model>, sea_orm::DbErr> {
    teams::Entity::find()
        .filter(teams::Column::SessionId.eq(session_id))
        .order_by_asc(teams::Column::CreatedAt)
        .order_by_asc(teams::Column::Id)
        .all(conn)
        .await
}

pub async fn count_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    teams::Entity::find()
        .filter(teams::Column::SessionId.eq(session_id))
        .count(conn)
        .await
}

pub async fn create_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TeamCreate,
) -> Result<teams::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    teams::ActiveModel {
        id: Set(new_id()),
        session_id: Set(dto.session_id),
        name: Set(dto.name),
        score: Set(0.0),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn rename_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    name: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = teams::Entity::update_many()
        .col_expr(teams::Column::Name, Expr::value(name.to_string()))
        .col_expr(
            teams::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(teams::Column::Id.eq(team_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Last-write-wins score overwrite; callers always write a full recompute.
pub async fn set_score<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    score: f64,
) -> Result<u64, sea_orm::DbErr> {
    let result = teams::Entity::update_many()
        .col_expr(teams::Column::Score, Expr::value(score))
        .col_expr(
            teams::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(teams::Column::Id.eq(team_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Bump the team's version. The write holds the team row lock until the
/// transaction ends, so elections on one team run one at a time and each
/// tally reads the ballots and flags the previous one committed.
pub async fn bump_version<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = teams::Entity::update_many()
        .col_expr(
            teams::Column::Version,
            Expr::col(teams::Column::Version).add(1),
        )
        .filter(teams::Column::Id.eq(team_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
