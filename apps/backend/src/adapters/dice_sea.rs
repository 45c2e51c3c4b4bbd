//! SeaORM adapter for the first-pick dice roll and its picks.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::{dice_picks, dice_rolls};
use crate::utils::ids::new_id;

pub async fn find_roll<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<dice_rolls::Model>, sea_orm::DbErr> {
    dice_rolls::Entity::find_by_id(session_id.to_string())
        .one(conn)
        .await
}

pub async fn create_roll<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<dice_rolls::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    dice_rolls::ActiveModel {
        session_id: Set(session_id.to_string()),
        round: Set(1),
        target: Set(None),
        winner_team_id: Set(None),
        confirmed_at: Set(None),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

fn open_round(
    update: sea_orm::UpdateMany<dice_rolls::Entity>,
    session_id: &str,
    round: i32,
) -> sea_orm::UpdateMany<dice_rolls::Entity> {
    update
        .col_expr(
            dice_rolls::Column::Version,
            Expr::col(dice_rolls::Column::Version).add(1),
        )
        .col_expr(
            dice_rolls::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(dice_rolls::Column::SessionId.eq(session_id))
        .filter(dice_rolls::Column::Round.eq(round))
        .filter(dice_rolls::Column::ConfirmedAt.is_null())
}

/// Bump the roll's version while `round` is still collecting picks.
///
/// Concurrent pickers serialize on this row; the loser sees `false` or
/// waits for the winner's commit.
pub async fn claim_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<bool, sea_orm::DbErr> {
    let result = open_round(dice_rolls::Entity::update_many(), session_id, round)
        .filter(dice_rolls::Column::Target.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Persist the generated target and (when unique) the winner of `round`.
pub async fn set_outcome<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    target: i16,
    winner_team_id: Option<String>,
) -> Result<bool, sea_orm::DbErr> {
    let update = dice_rolls::Entity::update_many()
        .col_expr(dice_rolls::Column::Target, Expr::value(Some(target)))
        .col_expr(dice_rolls::Column::WinnerTeamId, Expr::value(winner_team_id));
    let result = open_round(update, session_id, round)
        .filter(dice_rolls::Column::Target.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Start round `round + 1` with no target and no winner.
pub async fn advance_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<bool, sea_orm::DbErr> {
    let update = dice_rolls::Entity::update_many()
        .col_expr(dice_rolls::Column::Round, Expr::value(round + 1))
        .col_expr(dice_rolls::Column::Target, Expr::value(Option::<i16>::None))
        .col_expr(
            dice_rolls::Column::WinnerTeamId,
            Expr::value(Option::<String>::None),
        );
    let result = open_round(update, session_id, round).exec(conn).await?;
    Ok(result.rows_affected == 1)
}

pub async fn confirm<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    winner_team_id: &str,
) -> Result<bool, sea_orm::DbErr> {
    let update = dice_rolls::Entity::update_many().col_expr(
        dice_rolls::Column::ConfirmedAt,
        Expr::value(Some(OffsetDateTime::now_utc())),
    );
    let result = open_round(update, session_id, round)
        .filter(dice_rolls::Column::WinnerTeamId.eq(winner_team_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn list_picks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<Vec<dice_picks::Model>, sea_orm::DbErr> {
    dice_picks::Entity::find()
        .filter(dice_picks::Column::SessionId.eq(session_id))
        .filter(dice_picks::Column::Round.eq(round))
        .order_by_asc(dice_picks::Column::CreatedAt)
        .order_by_asc(dice_picks::Column::Id)
        .all(conn)
        .await
}

pub async fn insert_pick<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
    team_id: &str,
    participant_id: &str,
    value: i16,
) -> Result<dice_picks::Model, sea_orm::DbErr> {
    dice_picks::ActiveModel {
        id: Set(new_id()),
        session_id: Set(session_id.to_string()),
        round: Set(round),
        team_id: Set(team_id.to_string()),
        participant_id: Set(participant_id.to_string()),
        value: Set(value),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// Remove the picks of `round`; returns the deleted rows.
pub async fn delete_picks<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    round: i32,
) -> Result<Vec<dice_picks::Model>, sea_orm::DbErr> {
    let doomed = list_picks(conn, session_id, round).await?;
    if !doomed.is_empty() {
        dice_picks::Entity::delete_many()
            .filter(dice_picks::Column::SessionId.eq(session_id))
            .filter(dice_picks::Column::Round.eq(round))
            .exec(conn)
            .await?;
    }
    Ok(doomed)
}
