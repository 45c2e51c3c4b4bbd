//! Majority-vote leader election.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ballot {
    pub voter_id: String,
    pub candidate_id: String,
}

impl Ballot {
    pub fn new(voter_id: impl Into<String>, candidate_id: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            candidate_id: candidate_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTally {
    pub candidate_id: String,
    pub votes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElectionOutcome {
    pub votes_needed: usize,
    /// Candidates in order of their first counted ballot.
    pub tally: Vec<CandidateTally>,
    pub leader_id: Option<String>,
}

/// Strict majority of the team: `floor(n / 2) + 1`.
pub fn votes_needed(member_count: usize) -> usize {
    member_count / 2 + 1
}

/// Count ballots for a team and pick the first candidate reaching a strict
/// majority.
///
/// Ballots cast by, or for, anyone outside `members` are ignored. When a
/// voter appears more than once only the last ballot counts.
pub fn tally(members: &[String], ballots: &[Ballot]) -> ElectionOutcome {
    let needed = votes_needed(members.len());
    let is_member = |id: &str| members.iter().any(|m| m == id);

    let mut latest: Vec<&Ballot> = Vec::new();
    for ballot in ballots {
        if !is_member(&ballot.voter_id) || !is_member(&ballot.candidate_id) {
            continue;
        }
        latest.retain(|b| b.voter_id != ballot.voter_id);
        latest.push(ballot);
    }

    let mut counts: Vec<CandidateTally> = Vec::new();
    for ballot in latest {
        match counts
            .iter_mut()
            .find(|c| c.candidate_id == ballot.candidate_id)
        {
            Some(entry) => entry.votes += 1,
            None => counts.push(CandidateTally {
                candidate_id: ballot.candidate_id.clone(),
                votes: 1,
            }),
        }
    }

    let leader_id = counts
        .iter()
        .find(|c| c.votes >= needed)
        .map(|c| c.candidate_id.clone());

    ElectionOutcome {
        votes_needed: needed,
        tally: counts,
        leader_id,
    }
}
