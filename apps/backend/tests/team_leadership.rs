mod support;

use backend_test_support::unique_helpers::unique_device_token;
use uncolympics::entities::participants::ParticipantRole;
use uncolympics::errors::ErrorCode;
use uncolympics::repos::participants::Participant;
use uncolympics::TournamentEngine;

use support::party::{create_session, engine_with_dice, formed_party, join_player};

async fn leaders_of(engine: &TournamentEngine, session_id: &str, team_id: &str) -> Vec<String> {
    engine
        .session_snapshot(session_id)
        .await
        .expect("snapshot")
        .participants
        .into_iter()
        .filter(|p| p.is_leader && p.team_id.as_deref() == Some(team_id))
        .map(|p| p.id)
        .collect()
}

async fn team_of_three(engine: &TournamentEngine) -> (String, String, Vec<Participant>) {
    let seat = create_session(engine, 3).await;
    let sid = seat.session.id.clone();
    let mut members = Vec::new();
    for name in ["Ana", "Ben", "Cy"] {
        members.push(join_player(engine, &seat.session.room_code, name).await);
    }
    let team = engine
        .create_team(&sid, &members[0].id, "Red")
        .await
        .expect("create team");
    for m in &members {
        engine
            .join_team(&sid, &m.id, &m.id, &team.id)
            .await
            .expect("join");
    }
    (sid, team.id, members)
}

#[tokio::test]
async fn majority_of_three_elects_on_second_vote() {
    let engine = engine_with_dice(&[1]).await;
    let (sid, team_id, m) = team_of_three(&engine).await;

    let first = engine
        .vote_for_leader(&sid, &m[0].id, &team_id, &m[2].id)
        .await
        .unwrap();
    assert_eq!(first.election.votes_needed, 2);
    assert_eq!(first.leader_id, None);
    assert!(leaders_of(&engine, &sid, &team_id).await.is_empty());

    let second = engine
        .vote_for_leader(&sid, &m[1].id, &team_id, &m[2].id)
        .await
        .unwrap();
    assert_eq!(second.leader_id.as_deref(), Some(m[2].id.as_str()));
    assert_eq!(leaders_of(&engine, &sid, &team_id).await, vec![m[2].id.clone()]);
}

#[tokio::test]
async fn leader_flag_stays_exclusive_when_majority_moves() {
    let engine = engine_with_dice(&[1]).await;
    let (sid, team_id, m) = team_of_three(&engine).await;

    for voter in &m[..2] {
        engine
            .vote_for_leader(&sid, &voter.id, &team_id, &m[0].id)
            .await
            .unwrap();
    }
    assert_eq!(leaders_of(&engine, &sid, &team_id).await, vec![m[0].id.clone()]);

    // One defection leaves a 1-1 split: nobody holds a majority, so the
    // old leader loses the flag.
    let split = engine
        .vote_for_leader(&sid, &m[1].id, &team_id, &m[1].id)
        .await
        .unwrap();
    assert_eq!(split.leader_id, None);
    assert!(leaders_of(&engine, &sid, &team_id).await.is_empty());
    let snapshot = engine.session_snapshot(&sid).await.unwrap();
    assert!(snapshot
        .participants
        .iter()
        .filter(|p| p.team_id.as_deref() == Some(team_id.as_str()))
        .all(|p| !p.is_leader));

    engine
        .vote_for_leader(&sid, &m[2].id, &team_id, &m[1].id)
        .await
        .unwrap();
    assert_eq!(leaders_of(&engine, &sid, &team_id).await, vec![m[1].id.clone()]);
}

#[tokio::test]
async fn repeating_a_vote_does_not_change_the_tally() {
    let engine = engine_with_dice(&[1]).await;
    let (sid, team_id, m) = team_of_three(&engine).await;

    let once = engine
        .vote_for_leader(&sid, &m[0].id, &team_id, &m[1].id)
        .await
        .unwrap();
    let twice = engine
        .vote_for_leader(&sid, &m[0].id, &team_id, &m[1].id)
        .await
        .unwrap();

    assert_eq!(once.election, twice.election);
    assert_eq!(twice.ballots.len(), 1);
}

#[tokio::test]
async fn two_member_team_needs_both_votes() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.clone();
    let a = join_player(&engine, &seat.session.room_code, "A").await;
    let b = join_player(&engine, &seat.session.room_code, "B").await;
    let team = engine.create_team(&sid, &a.id, "Duo").await.unwrap();
    engine.join_team(&sid, &a.id, &a.id, &team.id).await.unwrap();
    engine.join_team(&sid, &b.id, &b.id, &team.id).await.unwrap();

    let r = engine
        .vote_for_leader(&sid, &a.id, &team.id, &a.id)
        .await
        .unwrap();
    assert_eq!(r.leader_id, None);

    let r = engine
        .vote_for_leader(&sid, &b.id, &team.id, &b.id)
        .await
        .unwrap();
    assert_eq!(r.leader_id, None, "a 1-1 split leaves leadership open");

    let r = engine
        .vote_for_leader(&sid, &b.id, &team.id, &a.id)
        .await
        .unwrap();
    assert_eq!(r.leader_id.as_deref(), Some(a.id.as_str()));
}

#[tokio::test]
async fn leaving_removes_ballots_in_both_directions() {
    let engine = engine_with_dice(&[1]).await;
    let (sid, team_id, m) = team_of_three(&engine).await;

    // Cy is voted for by Ana and votes for Ben.
    engine
        .vote_for_leader(&sid, &m[0].id, &team_id, &m[2].id)
        .await
        .unwrap();
    engine
        .vote_for_leader(&sid, &m[2].id, &team_id, &m[1].id)
        .await
        .unwrap();

    let left = engine.leave_team(&sid, &m[2].id, &m[2].id).await.unwrap();
    assert_eq!(left.team_id, None);
    assert!(!left.is_leader);

    let snapshot = engine.session_snapshot(&sid).await.unwrap();
    assert!(snapshot
        .leader_votes
        .iter()
        .all(|v| v.voter_id != m[2].id && v.candidate_id != m[2].id));

    // Rejoining starts from scratch.
    engine
        .join_team(&sid, &m[2].id, &m[2].id, &team_id)
        .await
        .unwrap();
    let snapshot = engine.session_snapshot(&sid).await.unwrap();
    assert!(snapshot.leader_votes.iter().all(|v| v.voter_id != m[2].id));
}

#[tokio::test]
async fn switching_teams_clears_leadership_and_old_ballot() {
    let engine = engine_with_dice(&[1]).await;
    let party = formed_party(engine, 1, 2).await;
    let engine = &party.engine;
    let leader = party.red_leader().clone();

    let moved = engine
        .join_team(&party.session_id, &leader.id, &leader.id, &party.blue.id)
        .await
        .unwrap();
    assert_eq!(moved.team_id.as_deref(), Some(party.blue.id.as_str()));
    assert!(!moved.is_leader);

    let snapshot = engine.session_snapshot(&party.session_id).await.unwrap();
    assert!(snapshot
        .leader_votes
        .iter()
        .all(|v| !(v.team_id == party.red.id && v.voter_id == leader.id)));
    // Red lost its majority along with its leader.
    assert!(leaders_of(engine, &party.session_id, &party.red.id)
        .await
        .is_empty());
}

#[tokio::test]
async fn start_requires_two_ready_teams_and_names_the_culprit() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.clone();
    let referee = seat.participant.id.clone();

    let err = engine.start_session(&sid, &referee).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TeamNotReady);

    let a = join_player(&engine, &seat.session.room_code, "A").await;
    let red = engine.create_team(&sid, &a.id, "Red").await.unwrap();
    engine.join_team(&sid, &a.id, &a.id, &red.id).await.unwrap();
    engine.vote_for_leader(&sid, &a.id, &red.id, &a.id).await.unwrap();
    engine.create_team(&sid, &a.id, "Blue").await.unwrap();

    let err = engine.start_session(&sid, &referee).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TeamNotReady);
    assert!(err.detail().contains("Blue"), "detail was {}", err.detail());

    let err = engine.start_session(&sid, &a.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::RefereeOnly);
}

#[tokio::test]
async fn start_gives_the_first_created_team_the_turn() {
    let engine = engine_with_dice(&[1]).await;
    let party = formed_party(engine, 2, 1).await;

    let session = party
        .engine
        .start_session(&party.session_id, &party.referee.id)
        .await
        .unwrap();
    assert_eq!(
        session.active_draft_team_id.as_deref(),
        Some(party.red.id.as_str())
    );

    let err = party
        .engine
        .create_team(&party.session_id, &party.red_leader().id, "Late")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);
}

#[tokio::test]
async fn joining_after_start_is_rejected_but_known_devices_get_their_seat_back() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let code = seat.session.room_code.clone();
    let device = unique_device_token();
    let first = engine
        .join_session(&code, "Dana", &device, ParticipantRole::Player)
        .await
        .unwrap();

    let a = join_player(&engine, &code, "A").await;
    let b = join_player(&engine, &code, "B").await;
    for (p, name) in [(&a, "Red"), (&b, "Blue")] {
        let team = engine.create_team(&seat.session.id, &p.id, name).await.unwrap();
        engine.join_team(&seat.session.id, &p.id, &p.id, &team.id).await.unwrap();
        engine.vote_for_leader(&seat.session.id, &p.id, &team.id, &p.id).await.unwrap();
    }
    engine
        .start_session(&seat.session.id, &seat.participant.id)
        .await
        .unwrap();

    let err = engine
        .join_session(&code, "Latecomer", &unique_device_token(), ParticipantRole::Player)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PhaseMismatch);

    let again = engine
        .join_session(&code, "Dana again", &device, ParticipantRole::Player)
        .await
        .unwrap();
    assert_eq!(again.participant.id, first.participant.id);
    assert_eq!(again.participant.name, "Dana");

    let resolved = engine.resolve(&device).await.unwrap().expect("seat");
    assert_eq!(resolved.participant.id, first.participant.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_defections_settle_on_the_final_ballots() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.clone();
    let mut m = Vec::new();
    for name in ["Ana", "Ben", "Cy", "Dee"] {
        m.push(join_player(&engine, &seat.session.room_code, name).await);
    }
    let team = engine.create_team(&sid, &m[0].id, "Red").await.unwrap();
    for p in &m {
        engine.join_team(&sid, &p.id, &p.id, &team.id).await.unwrap();
    }
    // 2-2 split between Ana and Cy; three votes are needed.
    for (voter, candidate) in [(0, 0), (1, 0), (2, 2), (3, 2)] {
        engine
            .vote_for_leader(&sid, &m[voter].id, &team.id, &m[candidate].id)
            .await
            .unwrap();
    }

    // Cy crosses to Ana while Ben crosses to Cy: whichever lands first
    // briefly elects someone, the other undoes it.
    let votes: Vec<_> = [(2, 0), (1, 2)]
        .into_iter()
        .map(|(voter, candidate)| {
            let engine = engine.clone();
            let (sid, team_id) = (sid.clone(), team.id.clone());
            let (voter, candidate) = (m[voter].id.clone(), m[candidate].id.clone());
            tokio::spawn(async move {
                engine
                    .vote_for_leader(&sid, &voter, &team_id, &candidate)
                    .await
            })
        })
        .collect();

    let mut winners = Vec::new();
    for vote in votes {
        winners.push(vote.await.expect("vote task").expect("vote").leader_id);
    }
    assert_eq!(
        winners.iter().filter(|w| w.is_some()).count(),
        1,
        "exactly one of the two tallies saw a majority: {winners:?}"
    );
    assert!(leaders_of(&engine, &sid, &team.id).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_votes_for_one_candidate_elect_a_single_leader() {
    let engine = engine_with_dice(&[1]).await;
    let (sid, team_id, m) = team_of_three(&engine).await;

    let votes: Vec<_> = m
        .iter()
        .map(|voter| {
            let engine = engine.clone();
            let (sid, team_id) = (sid.clone(), team_id.clone());
            let (voter, candidate) = (voter.id.clone(), m[1].id.clone());
            tokio::spawn(async move {
                engine
                    .vote_for_leader(&sid, &voter, &team_id, &candidate)
                    .await
            })
        })
        .collect();
    for vote in votes {
        vote.await.expect("vote task").expect("vote");
    }

    assert_eq!(leaders_of(&engine, &sid, &team_id).await, vec![m[1].id.clone()]);
}
