use proptest::prelude::*;

use crate::domain::election::{tally, votes_needed};
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// A leader, when elected, holds a strict majority and is a member.
    #[test]
    fn prop_leader_has_strict_majority((members, ballots) in test_gens::members_and_ballots()) {
        let outcome = tally(&members, &ballots);
        prop_assert_eq!(outcome.votes_needed, votes_needed(members.len()));
        prop_assert!(outcome.votes_needed * 2 > members.len());
        if let Some(leader) = &outcome.leader_id {
            prop_assert!(members.contains(leader));
            let votes = outcome.tally.iter().find(|c| &c.candidate_id == leader).map(|c| c.votes);
            prop_assert!(votes.unwrap_or(0) >= outcome.votes_needed);
        }
        let counted: usize = outcome.tally.iter().map(|c| c.votes).sum();
        prop_assert!(counted <= members.len());
    }

    /// Submitting the last ballot again does not change the result.
    #[test]
    fn prop_repeat_vote_is_idempotent((members, ballots) in test_gens::members_and_ballots()) {
        prop_assume!(!ballots.is_empty());
        let once = tally(&members, &ballots);
        let mut twice = ballots.clone();
        twice.push(ballots[ballots.len() - 1].clone());
        let again = tally(&members, &twice);
        prop_assert_eq!(once.leader_id, again.leader_id);
        let mut a: Vec<_> = once.tally.iter().map(|c| (c.candidate_id.clone(), c.votes)).collect();
        let mut b: Vec<_> = again.tally.iter().map(|c| (c.candidate_id.clone(), c.votes)).collect();
        a.sort();
        b.sort();
        prop_assert_eq!(a, b);
    }

    /// Removing a member from the roster drops every ballot by or for them.
    #[test]
    fn prop_departed_member_has_no_influence((members, ballots) in test_gens::members_and_ballots()) {
        prop_assume!(members.len() > 1);
        let gone = members[0].clone();
        let remaining: Vec<String> = members[1..].to_vec();
        let outcome = tally(&remaining, &ballots);
        prop_assert!(outcome.tally.iter().all(|c| c.candidate_id != gone));
        prop_assert!(outcome.leader_id.as_deref() != Some(gone.as_str()));
    }
}
