//! Teams, membership and leader elections.

use sea_orm::DatabaseTransaction;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::access::{actor_in_session, mutable_session, require_referee};
use crate::db::txn::best_effort;
use crate::domain::election::{self, ElectionOutcome};
use crate::domain::lifecycle::{ensure_session_transition, require_session_status};
use crate::entities::participants::ParticipantRole;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ForbiddenKind, ValidationKind};
use crate::realtime::EventBatch;
use crate::repos::dice;
use crate::repos::leader_votes::{self, LeaderVote};
use crate::repos::participants::{self, Participant};
use crate::repos::sessions::{self, Session, SessionCas};
use crate::repos::teams::{self, Team};
use crate::utils::names::normalize_name;

/// Ballots and result after a vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteResult {
    pub ballots: Vec<LeaderVote>,
    pub leader_id: Option<String>,
    pub election: ElectionOutcome,
}

#[derive(Default)]
pub struct TeamService;

impl TeamService {
    pub async fn create_team(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        name: &str,
    ) -> Result<Team, AppError> {
        debug!(session_id, actor_id, "Creating team");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Forming, "Creating a team")?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        if actor.role == ParticipantRole::Spectator {
            return Err(DomainError::forbidden(
                ForbiddenKind::NotTeamMember,
                "Spectators cannot create teams",
            )
            .into());
        }

        let name = normalize_name(name, "team name")?;
        let team = teams::create_team(txn, session_id, &name).await?;
        events.upsert(session_id, &team);
        info!(session_id, team_id = %team.id, "Team created");
        Ok(team)
    }

    /// Referee or any member of the team may rename it.
    pub async fn rename_team(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        team_id: &str,
        name: &str,
    ) -> Result<Team, AppError> {
        debug!(session_id, team_id, "Renaming team");
        mutable_session(txn, session_id).await?;
        let team = team_in_session(txn, session_id, team_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        if !actor.is_referee() && actor.team_id.as_deref() != Some(team.id.as_str()) {
            return Err(DomainError::forbidden(
                ForbiddenKind::NotTeamMember,
                "Only the referee or a team member may rename the team",
            )
            .into());
        }

        let name = normalize_name(name, "team name")?;
        let team = teams::rename_team(txn, &team.id, &name).await?;
        events.upsert(session_id, &team);
        Ok(team)
    }

    /// Move `participant_id` onto `team_id`. Players move themselves; the
    /// referee may move anyone.
    pub async fn join_team(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        participant_id: &str,
        team_id: &str,
    ) -> Result<Participant, AppError> {
        debug!(session_id, participant_id, team_id, "Joining team");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Forming, "Changing teams")?;
        let participant = member_change_target(txn, session_id, actor_id, participant_id).await?;
        let team = team_in_session(txn, session_id, team_id).await?;

        if participant.team_id.as_deref() == Some(team.id.as_str()) {
            return Ok(participant);
        }
        let previous = participant.team_id.clone();

        let moved = participants::set_team(txn, &participant.id, Some(team.id.clone())).await?;
        events.upsert(session_id, &moved);

        if let Some(old_team) = previous {
            purge_votes(txn, events, session_id, &old_team, &moved.id, false).await;
            self.elect(txn, events, session_id, &old_team).await?;
        }

        info!(session_id, participant_id = %moved.id, team_id = %team.id, "Participant joined team");
        Ok(moved)
    }

    pub async fn leave_team(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
        participant_id: &str,
    ) -> Result<Participant, AppError> {
        debug!(session_id, participant_id, "Leaving team");
        let session = mutable_session(txn, session_id).await?;
        require_session_status(session.status, SessionStatus::Forming, "Changing teams")?;
        let participant = member_change_target(txn, session_id, actor_id, participant_id).await?;

        let Some(old_team) = participant.team_id.clone() else {
            return Ok(participant);
        };

        let left = participants::set_team(txn, &participant.id, None).await?;
        events.upsert(session_id, &left);
        purge_votes(txn, events, session_id, &old_team, &left.id, true).await;
        self.elect(txn, events, session_id, &old_team).await?;

        info!(session_id, participant_id = %left.id, team_id = %old_team, "Participant left team");
        Ok(left)
    }

    pub async fn vote_for_leader(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        voter_id: &str,
        team_id: &str,
        candidate_id: &str,
    ) -> Result<VoteResult, AppError> {
        debug!(session_id, team_id, voter_id, candidate_id, "Voting for leader");
        mutable_session(txn, session_id).await?;
        let team = team_in_session(txn, session_id, team_id).await?;
        let voter = actor_in_session(txn, session_id, voter_id).await?;
        if !is_player_of(&voter, &team.id) {
            return Err(DomainError::forbidden(
                ForbiddenKind::NotTeamMember,
                "Only players of the team may vote for its leader",
            )
            .into());
        }
        let candidate = participants::require_participant(txn, candidate_id).await?;
        if !is_player_of(&candidate, &team.id) {
            return Err(DomainError::validation_other(format!(
                "candidate {candidate_id} is not a player of team {}",
                team.name
            ))
            .into());
        }

        teams::lock_for_election(txn, &team.id).await?;
        let vote = leader_votes::upsert_vote(txn, &team.id, &voter.id, &candidate.id).await?;
        events.upsert(session_id, &vote);

        let (election, ballots) = self.elect(txn, events, session_id, &team.id).await?;
        Ok(VoteResult {
            ballots,
            leader_id: election.leader_id.clone(),
            election,
        })
    }

    /// Re-tally the team's ballots and apply the result to the leader flags.
    pub(crate) async fn elect(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        team_id: &str,
    ) -> Result<(ElectionOutcome, Vec<LeaderVote>), AppError> {
        // Concurrent tallies would each clear flags from a stale read and
        // set different winners.
        teams::lock_for_election(txn, team_id).await?;
        let members: Vec<String> = participants::list_players(txn, team_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let ballots = leader_votes::list_by_team(txn, team_id).await?;
        let outcome = election::tally(
            &members,
            &ballots.iter().map(LeaderVote::ballot).collect::<Vec<_>>(),
        );

        let changed = participants::apply_leader(txn, team_id, outcome.leader_id.as_deref()).await?;
        if !changed.is_empty() {
            info!(session_id, team_id, leader_id = ?outcome.leader_id, "Team leadership changed");
        }
        events.upsert_all(session_id, &changed);
        Ok((outcome, ballots))
    }

    /// Close team formation and open the dice roll for the first pick.
    pub async fn start_session(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        session_id: &str,
        actor_id: &str,
    ) -> Result<Session, AppError> {
        debug!(session_id, actor_id, "Starting session");
        let session = mutable_session(txn, session_id).await?;
        let actor = actor_in_session(txn, session_id, actor_id).await?;
        require_referee(&actor, "start the session")?;
        ensure_session_transition(session.status, SessionStatus::Drafting)?;

        let teams = teams::list_by_session(txn, session_id).await?;
        if teams.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::TeamNotReady,
                "At least two teams are required",
            )
            .into());
        }
        for team in &teams {
            let players = participants::list_players(txn, &team.id).await?;
            if players.is_empty() {
                return Err(DomainError::validation(
                    ValidationKind::TeamNotReady,
                    format!("Team {} has no players", team.name),
                )
                .into());
            }
            if !players.iter().any(|p| p.is_leader) {
                return Err(DomainError::validation(
                    ValidationKind::TeamNotReady,
                    format!("Team {} has no leader", team.name),
                )
                .into());
            }
        }

        let first = teams[0].id.clone();
        let cas = SessionCas::new(session_id, SessionStatus::Forming)
            .to_status(SessionStatus::Drafting)
            .with_active_team(Some(first))
            .with_on_deck(None);
        let session = sessions::apply_cas(txn, cas).await?.ok_or_else(|| {
            DomainError::conflict(ConflictKind::StaleState, "Session was started concurrently")
        })?;
        let roll = dice::create_roll(txn, session_id).await?;

        events.upsert(session_id, &session);
        events.upsert(session_id, &roll);
        info!(session_id, teams = teams.len(), "Session started");
        Ok(session)
    }
}

fn is_player_of(p: &Participant, team_id: &str) -> bool {
    p.role == ParticipantRole::Player && p.team_id.as_deref() == Some(team_id)
}

async fn team_in_session(
    txn: &DatabaseTransaction,
    session_id: &str,
    team_id: &str,
) -> Result<Team, DomainError> {
    let team = teams::require_team(txn, team_id).await?;
    if team.session_id != session_id {
        return Err(DomainError::validation_other(format!(
            "team {team_id} does not belong to session {session_id}"
        )));
    }
    Ok(team)
}

/// The participant whose membership changes; only players have teams.
async fn member_change_target(
    txn: &DatabaseTransaction,
    session_id: &str,
    actor_id: &str,
    participant_id: &str,
) -> Result<Participant, DomainError> {
    let actor = actor_in_session(txn, session_id, actor_id).await?;
    let target = if actor.id == participant_id {
        actor
    } else {
        require_referee(&actor, "move other participants")?;
        actor_in_session(txn, session_id, participant_id).await?
    };
    if target.role != ParticipantRole::Player {
        return Err(DomainError::validation(
            ValidationKind::InvalidRole,
            "Only players can be on a team",
        ));
    }
    Ok(target)
}

/// Drop ballots involving `participant_id` on `team_id`. Failure leaves the
/// ballots in place and does not fail the caller.
async fn purge_votes(
    txn: &DatabaseTransaction,
    events: &mut EventBatch,
    session_id: &str,
    team_id: &str,
    participant_id: &str,
    include_candidate: bool,
) {
    let team = team_id.to_string();
    let pid = participant_id.to_string();
    let purged = best_effort(txn, "purge leader votes", move |sp| {
        Box::pin(async move {
            Ok(leader_votes::purge_participant(sp, &team, &pid, include_candidate).await?)
        })
    })
    .await;
    match purged {
        Some(votes) => {
            for vote in &votes {
                events.delete(session_id, vote);
            }
        }
        None => warn!(session_id, team_id, participant_id, "stale ballots kept"),
    }
}
