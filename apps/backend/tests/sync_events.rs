mod support;

use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use uncolympics::config::db::DbKind;
use uncolympics::config::engine::EngineConfig;
use uncolympics::errors::ErrorCode;
use uncolympics::infra::db::bootstrap_db;
use uncolympics::realtime::{
    ChangeEvent, ChangeOp, ConnectivityStatus, EntityKind, LocalProjection, Subscription,
    SyncSignal,
};
use uncolympics::services::GameOutcome;
use uncolympics::TournamentEngine;

use support::party::{
    create_session, drafting_party, engine_with_dice, formed_party, join_player, play_game,
    scored_game,
};

/// Everything already delivered to `sub`, without waiting for more.
async fn drain(sub: &mut Subscription) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    while let Ok(Some(signal)) =
        tokio::time::timeout(Duration::from_millis(50), sub.next()).await
    {
        match signal {
            SyncSignal::Event(event) => events.push(event),
            SyncSignal::ResyncRequired { missed } => panic!("unexpected lag of {missed}"),
        }
    }
    events
}

#[tokio::test]
async fn committed_changes_arrive_in_sequence() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.as_str();
    let player = join_player(&engine, &seat.session.room_code, "Ana").await;

    let mut sub = engine.subscribe(sid);
    let team = engine.create_team(sid, &player.id, "Red").await.unwrap();
    engine
        .join_team(sid, &player.id, &player.id, &team.id)
        .await
        .unwrap();
    engine
        .vote_for_leader(sid, &player.id, &team.id, &player.id)
        .await
        .unwrap();

    let events = drain(&mut sub).await;
    assert!(events.len() >= 4, "got {events:?}");
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
    assert!(events.iter().all(|e| e.session_id == sid));

    let created = &events[0];
    assert_eq!(created.entity, EntityKind::Team);
    assert_eq!(created.op, ChangeOp::Upsert);
    assert_eq!(created.id, team.id);
    assert_eq!(
        created.value.as_ref().map(|v| v["name"].clone()),
        Some(serde_json::json!("Red"))
    );

    assert!(events
        .iter()
        .any(|e| e.entity == EntityKind::LeaderVote && e.op == ChangeOp::Upsert));
    let leader_flag = events
        .iter()
        .rev()
        .find(|e| e.entity == EntityKind::Participant && e.id == player.id)
        .expect("participant change");
    assert_eq!(
        leader_flag.value.as_ref().and_then(|v| v["is_leader"].as_bool()),
        Some(true)
    );

    assert_eq!(engine.gateway().current_seq(sid), events.last().unwrap().seq);
}

#[tokio::test]
async fn rejected_operations_publish_nothing() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.as_str();
    let player = join_player(&engine, &seat.session.room_code, "Ana").await;

    let sub = engine.subscribe(sid);
    let before = engine.gateway().current_seq(sid);

    let err = engine.create_team(sid, &player.id, "   ").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidName);
    let err = engine
        .start_session(sid, &seat.participant.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::TeamNotReady);

    assert_eq!(engine.gateway().current_seq(sid), before);
    let mut rx = sub.into_receiver();
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn snapshot_plus_events_matches_a_fresh_snapshot() {
    let party = drafting_party(1).await;
    let engine = &party.engine;
    let sid = party.session_id.as_str();

    let mut sub = engine.subscribe(sid);
    let snapshot = engine.session_snapshot(sid).await.unwrap();
    let mut projection = LocalProjection::from_snapshot(&snapshot);

    let game = scored_game(engine, "Cornhole").await;
    play_game(
        &party,
        &game,
        &[(&party.red_players[0], 6.0), (&party.blue_players[1], 2.0)],
        GameOutcome::Team {
            team_id: party.red.id.clone(),
        },
    )
    .await;
    engine
        .compute_global_titles(sid, &party.referee.id)
        .await
        .unwrap();

    let events = drain(&mut sub).await;
    assert!(!events.is_empty());
    for event in &events {
        projection.apply(event);
    }
    // Replaying is harmless.
    for event in &events {
        assert!(!projection.apply(event));
    }

    let fresh = LocalProjection::from_snapshot(&engine.session_snapshot(sid).await.unwrap());
    assert_eq!(projection.seq(), fresh.seq());
    for kind in [
        EntityKind::Session,
        EntityKind::Team,
        EntityKind::Participant,
        EntityKind::DraftedGame,
        EntityKind::Statistic,
        EntityKind::Title,
        EntityKind::DiceRoll,
    ] {
        assert_eq!(projection.list(kind), fresh.list(kind), "{kind:?} diverged");
    }
}

#[tokio::test]
async fn leaving_a_team_publishes_ballot_deletes() {
    let party = formed_party(engine_with_dice(&[1]).await, 1, 2).await;
    let engine = &party.engine;
    let sid = party.session_id.as_str();
    let follower = &party.red_players[1];

    let mut sub = engine.subscribe(sid);
    engine.leave_team(sid, &follower.id, &follower.id).await.unwrap();

    let events = drain(&mut sub).await;
    assert!(events
        .iter()
        .any(|e| e.entity == EntityKind::LeaderVote && e.op == ChangeOp::Delete && e.value.is_none()));
}

#[tokio::test]
async fn slow_subscribers_are_told_to_resync() {
    let db = bootstrap_db(DbKind::SqliteMemory).await.unwrap();
    let config = EngineConfig {
        event_buffer: 2,
        ..EngineConfig::default()
    };
    let engine = TournamentEngine::new(db, config);
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.as_str();

    let mut sub = engine.subscribe(sid);
    for name in ["A", "B", "C", "D"] {
        join_player(&engine, &seat.session.room_code, name).await;
    }

    match sub.next().await {
        Some(SyncSignal::ResyncRequired { missed }) => assert!(missed >= 2),
        other => panic!("expected a resync signal, got {other:?}"),
    }
    assert_eq!(sub.status(), ConnectivityStatus::Reconnecting);
    sub.resynced();
    assert_eq!(sub.status(), ConnectivityStatus::Connected);
}

#[tokio::test]
async fn finishing_closes_the_channel() {
    let party = drafting_party(1).await;
    let engine = &party.engine;
    let sid = party.session_id.as_str();
    let game = scored_game(engine, "Cornhole").await;
    play_game(
        &party,
        &game,
        &[(&party.red_players[0], 1.0)],
        GameOutcome::Tie,
    )
    .await;

    let mut sub = engine.subscribe(sid);
    engine.finish_session(sid, &party.referee.id).await.unwrap();

    let mut last_session = None;
    while let Some(signal) = tokio::time::timeout(Duration::from_secs(1), sub.next())
        .await
        .expect("channel should close promptly")
    {
        if let SyncSignal::Event(e) = signal {
            if e.entity == EntityKind::Session {
                last_session = e.value;
            }
        }
    }
    assert_eq!(sub.status(), ConnectivityStatus::Disconnected);
    assert_eq!(
        last_session.as_ref().and_then(|v| v["status"].as_str()),
        Some("finished")
    );
    assert_eq!(engine.gateway().subscriber_count(sid), 0);
}

#[tokio::test]
async fn channels_are_released_when_the_last_listener_leaves() {
    let engine = engine_with_dice(&[1]).await;
    let seat = create_session(&engine, 1).await;
    let sid = seat.session.id.as_str();

    // Nobody listening: commits do not open a channel.
    let ana = join_player(&engine, &seat.session.room_code, "Ana").await;
    assert_eq!(engine.gateway().open_channels(), 0);

    let sub = engine.subscribe(sid);
    let stream = engine.subscribe(sid).into_stream();
    assert_eq!(engine.gateway().open_channels(), 1);
    assert_eq!(engine.gateway().subscriber_count(sid), 2);

    drop(sub);
    assert_eq!(engine.gateway().subscriber_count(sid), 1);
    drop(stream);
    assert_eq!(engine.gateway().open_channels(), 0);

    // The sequence survives the channel.
    let seq = engine.gateway().current_seq(sid);
    let mut sub = engine.subscribe(sid);
    engine.create_team(sid, &ana.id, "Red").await.unwrap();
    let events = drain(&mut sub).await;
    assert!(events.iter().all(|e| e.seq > seq));
}
