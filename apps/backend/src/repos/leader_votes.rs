//! Leader ballot repository functions.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::leader_votes_sea as votes_adapter;
use crate::domain::election::Ballot;
use crate::entities::leader_votes;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderVote {
    pub id: String,
    pub team_id: String,
    pub voter_id: String,
    pub candidate_id: String,
}

impl LeaderVote {
    pub fn ballot(&self) -> Ballot {
        Ballot::new(&self.voter_id, &self.candidate_id)
    }
}

impl From<leader_votes::Model> for LeaderVote {
    fn from(m: leader_votes::Model) -> Self {
        Self {
            id: m.id,
            team_id: m.team_id,
            voter_id: m.voter_id,
            candidate_id: m.candidate_id,
        }
    }
}

pub async fn list_by_team<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
) -> Result<Vec<LeaderVote>, DomainError> {
    let rows = votes_adapter::list_by_team(conn, team_id).await?;
    Ok(rows.into_iter().map(LeaderVote::from).collect())
}

pub async fn list_by_teams<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_ids: Vec<String>,
) -> Result<Vec<LeaderVote>, DomainError> {
    let rows = votes_adapter::list_by_session_teams(conn, team_ids).await?;
    Ok(rows.into_iter().map(LeaderVote::from).collect())
}

pub async fn upsert_vote<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    voter_id: &str,
    candidate_id: &str,
) -> Result<LeaderVote, DomainError> {
    let row = votes_adapter::upsert_vote(conn, team_id, voter_id, candidate_id).await?;
    Ok(LeaderVote::from(row))
}

/// Delete ballots cast by `participant_id` in `team_id`, and with
/// `include_candidate` also the ballots naming them.
pub async fn purge_participant<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    team_id: &str,
    participant_id: &str,
    include_candidate: bool,
) -> Result<Vec<LeaderVote>, DomainError> {
    let rows =
        votes_adapter::delete_involving(conn, team_id, participant_id, include_candidate).await?;
    Ok(rows.into_iter().map(LeaderVote::from).collect())
}
