//! SeaORM adapter for participants.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use sea_orm::JoinType;
use time::OffsetDateTime;

use crate::entities::participants::{self, ParticipantRole};
use crate::entities::sessions::{self, SessionStatus};
use crate::utils::ids::new_id;

pub mod dto;

pub use dto::ParticipantCreate;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    participant_id: &str,
) -> Result<Option<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find_by_id(participant_id.to_string())
        .one(conn)
        .await
}

pub async fn find_by_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
    device_token: &str,
) -> Result<Option<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::SessionId.eq(session_id))
        .filter(participants::Column::DeviceToken.eq(device_token))
        .one(conn)
        .await
}

/// Participant bound to `device_token` in the newest non-finished session.
pub async fn find_active_by_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
) -> Result<Option<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .join(JoinType::InnerJoin, participants::Relation::Session.def())
        .filter(participants::Column::DeviceToken.eq(device_token))
        .filter(sessions::Column::Status.ne(SessionStatus::Finished))
        .order_by_desc(sessions::Column::CreatedAt)
        .order_by_desc(participants::Column::CreatedAt)
        .one(conn)
        .await
}

pub async fn list_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Vec<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::SessionId.eq(session_id))
        .order_by_asc(participants::Column::CreatedAt)
        .order_by_asc(participants::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Vec<participants::Model>, sea_orm::DbErr> {
    participants::Entity::find()
        .filter(participants::Column::TeamId.eq(team_id))
        .order_by_asc(participants::Column::CreatedAt)
        .order_by_asc(participants::Column::Id)
        .all(conn)
        .await
}

pub async fn create_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ParticipantCreate,
) -> Result<participants::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let is_leader = dto.is_leader();
    participants::ActiveModel {
        id: Set(new_id()),
        session_id: Set(dto.session_id),
        name: Set(dto.name),
        role: Set(dto.role),
        team_id: Set(None),
        is_leader: Set(is_leader),
        device_token: Set(dto.device_token),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Move a player to `team_id` (or out of any team). Always drops the leader
/// flag.
pub async fn set_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    participant_id: &str,
    team_id: Option<String>,
) -> Result<u64, sea_orm::DbErr> {
    let result = participants::Entity::update_many()
        .col_expr(participants::Column::TeamId, Expr::value(team_id))
        .col_expr(participants::Column::IsLeader, Expr::value(false))
        .col_expr(
            participants::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(participants::Column::Id.eq(participant_id))
        .filter(participants::Column::Role.ne(ParticipantRole::Referee))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Clear the leader flag of every member of `team_id` except `keep`.
pub async fn clear_leaders<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    keep: Option<&str>,
) -> Result<u64, sea_orm::DbErr> {
    let mut update = participants::Entity::update_many()
        .col_expr(participants::Column::IsLeader, Expr::value(false))
        .col_expr(
            participants::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(participants::Column::TeamId.eq(team_id))
        .filter(participants::Column::IsLeader.eq(true));
    if let Some(keep) = keep {
        update = update.filter(participants::Column::Id.ne(keep));
    }
    Ok(update.exec(conn).await?.rows_affected)
}

/// Set the leader flag, guarded on the participant still being a player of
/// `team_id`. Returns whether the flag was written.
pub async fn set_leader<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    participant_id: &str,
) -> Result<bool, sea_orm::DbErr> {
    let result = participants::Entity::update_many()
        .col_expr(participants::Column::IsLeader, Expr::value(true))
        .col_expr(
            participants::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(participants::Column::Id.eq(participant_id))
        .filter(participants::Column::TeamId.eq(team_id))
        .filter(participants::Column::Role.eq(ParticipantRole::Player))
        .exec(conn)
        .await?;
    Ok(result.rows_affected == 1)
}
