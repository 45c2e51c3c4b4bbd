//! SeaORM adapter for leader ballots.

use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use time::OffsetDateTime;

use crate::entities::leader_votes;
use crate::utils::ids::new_id;

pub async fn list_by_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Vec<leader_votes::Model>, sea_orm::DbErr> {
    leader_votes::Entity::find()
        .filter(leader_votes::Column::TeamId.eq(team_id))
        .order_by_asc(leader_votes::Column::CreatedAt)
        .order_by_asc(leader_votes::Column::Id)
        .all(conn)
        .await
}

pub async fn list_by_session_teams<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_ids: Vec<String>,
) -> Result<Vec<leader_votes::Model>, sea_orm::DbErr> {
    if team_ids.is_empty() {
        return Ok(Vec::new());
    }
    leader_votes::Entity::find()
        .filter(leader_votes::Column::TeamId.is_in(team_ids))
        .order_by_asc(leader_votes::Column::CreatedAt)
        .all(conn)
        .await
}

/// Insert or overwrite the voter's ballot for `team_id`.
pub async fn upsert_vote<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    voter_id: &str,
    candidate_id: &str,
) -> Result<leader_votes::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let existing = leader_votes::Entity::find()
        .filter(leader_votes::Column::TeamId.eq(team_id))
        .filter(leader_votes::Column::VoterId.eq(voter_id))
        .one(conn)
        .await?;

    match existing {
        Some(vote) => {
            let mut active: leader_votes::ActiveModel = vote.into();
            active.candidate_id = Set(candidate_id.to_string());
            active.updated_at = Set(now);
            active.update(conn).await
        }
        None => {
            leader_votes::ActiveModel {
                id: Set(new_id()),
                team_id: Set(team_id.to_string()),
                voter_id: Set(voter_id.to_string()),
                candidate_id: Set(candidate_id.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
        }
    }
}

/// Ballots in `team_id` cast by `participant_id` (and, with
/// `include_candidate`, those cast for them). Returns the deleted rows.
pub async fn delete_involving<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    participant_id: &str,
    include_candidate: bool,
) -> Result<Vec<leader_votes::Model>, sea_orm::DbErr> {
    let mut who = Condition::any().add(leader_votes::Column::VoterId.eq(participant_id));
    if include_candidate {
        who = who.add(leader_votes::Column::CandidateId.eq(participant_id));
    }
    let cond = Condition::all()
        .add(leader_votes::Column::TeamId.eq(team_id))
        .add(who);

    let doomed = leader_votes::Entity::find()
        .filter(cond.clone())
        .all(conn)
        .await?;
    if doomed.is_empty() {
        return Ok(doomed);
    }
    leader_votes::Entity::delete_many()
        .filter(cond)
        .exec(conn)
        .await?;
    Ok(doomed)
}
