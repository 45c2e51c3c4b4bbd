//! SeaORM adapter for sessions - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::sessions::{self, SessionStatus};
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::{SessionCas, SessionCreate};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<sessions::Model>, sea_orm::DbErr> {
    sessions::Entity::find_by_id(session_id.to_string())
        .one(conn)
        .await
}

/// Newest non-finished session using `room_code`.
pub async fn find_open_by_room_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_code: &str,
) -> Result<Option<sessions::Model>, sea_orm::DbErr> {
    sessions::Entity::find()
        .filter(sessions::Column::RoomCode.eq(room_code))
        .filter(sessions::Column::Status.ne(SessionStatus::Finished))
        .order_by_desc(sessions::Column::CreatedAt)
        .one(conn)
        .await
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: SessionCreate,
) -> Result<sessions::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    sessions::ActiveModel {
        id: Set(new_id()),
        name: Set(dto.name),
        room_code: Set(dto.room_code),
        status: Set(SessionStatus::Forming),
        round_target: Set(dto.round_target),
        active_draft_team_id: Set(None),
        on_deck_team_id: Set(None),
        owner_id: Set(None),
        global_titles_at: Set(None),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn set_owner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    owner_id: &str,
) -> Result<(), sea_orm::DbErr> {
    sessions::Entity::update_many()
        .col_expr(sessions::Column::OwnerId, Expr::value(owner_id.to_string()))
        .col_expr(
            sessions::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(sessions::Column::Id.eq(session_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Apply a guarded update. Returns whether the row matched the guards.
pub async fn apply_cas<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cas: SessionCas,
) -> Result<bool, sea_orm::DbErr> {
    let mut update = sessions::Entity::update_many()
        .col_expr(
            sessions::Column::Version,
            Expr::col(sessions::Column::Version).add(1),
        )
        .col_expr(
            sessions::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        );
    if let Some(status) = cas.status {
        update = update.col_expr(sessions::Column::Status, Expr::value(status));
    }
    if let Some(team) = cas.active_draft_team_id {
        update = update.col_expr(sessions::Column::ActiveDraftTeamId, Expr::value(team));
    }
    if let Some(team) = cas.on_deck_team_id {
        update = update.col_expr(sessions::Column::OnDeckTeamId, Expr::value(team));
    }

    let mut update = update
        .filter(sessions::Column::Id.eq(cas.id))
        .filter(sessions::Column::Status.eq(cas.expect_status));
    if let Some(team) = cas.expect_active_team {
        update = update.filter(sessions::Column::ActiveDraftTeamId.eq(team));
    }

    let result = update.exec(conn).await?;
    Ok(result.rows_affected == 1)
}

/// Claim the one-time global title computation for a scoring session.
pub async fn claim_global_titles<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<bool, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let result = sessions::Entity::update_many()
        .col_expr(sessions::Column::GlobalTitlesAt, Expr::value(Some(now)))
        .col_expr(
            sessions::Column::Version,
            Expr::col(sessions::Column::Version).add(1),
        )
        .col_expr(sessions::Column::UpdatedAt, Expr::value(now))
        .filter(sessions::Column::Id.eq(session_id))
        .filter(sessions::Column::Status.eq(SessionStatus::Scoring))
        .filter(sessions::Column::GlobalTitlesAt.is_null())
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}
