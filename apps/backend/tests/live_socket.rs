mod support;

use std::time::Duration;

use backend_test_support::unique_helpers::unique_device_token;
use serde_json::json;
use uncolympics::entities::participants::ParticipantRole;
use uncolympics::services::NewSession;

use support::app::test_state;
use support::live::{start_test_server, LiveClient};

const WAIT: Duration = Duration::from_secs(5);

#[actix_web::test]
async fn hello_carries_the_snapshot_and_changes_follow() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await;
    let engine = state.engine().clone();
    let (server, addr) = start_test_server(state).await?;

    let seat = engine
        .create_session(NewSession {
            name: "Live Cup".into(),
            room_code: None,
            round_target: 1,
            referee_name: "Ref".into(),
            device_token: unique_device_token(),
        })
        .await?;
    let sid = seat.session.id.clone();
    let device = unique_device_token();
    let player = engine
        .join_session(&seat.session.room_code, "Pat", &device, ParticipantRole::Player)
        .await?
        .participant;

    let mut client = LiveClient::connect(addr, &sid, &device).await?;
    let hello = client.expect_type("hello", WAIT).await?;
    assert_eq!(hello["participant_id"], player.id.as_str());
    assert_eq!(hello["snapshot"]["session"]["id"], sid.as_str());
    assert_eq!(
        hello["snapshot"]["participants"].as_array().map(Vec::len),
        Some(2)
    );
    let hello_seq = hello["snapshot"]["seq"].as_u64().unwrap_or(0);

    let team = engine.create_team(&sid, &player.id, "Otters").await?;
    let change = client.expect_type("change", WAIT).await?;
    assert_eq!(change["event"]["entity"], "team");
    assert_eq!(change["event"]["id"], team.id.as_str());
    assert_eq!(change["event"]["value"]["name"], "Otters");
    assert!(change["event"]["seq"].as_u64().unwrap_or(0) > hello_seq);

    // An explicit resync answers with a fresh snapshot.
    client.send_json(&json!({ "type": "resync" })).await?;
    let snapshot = client.expect_type("snapshot", WAIT).await?;
    assert_eq!(snapshot["snapshot"]["teams"].as_array().map(Vec::len), Some(1));

    server.stop(true).await;
    Ok(())
}

#[actix_web::test]
async fn unknown_devices_cannot_subscribe() -> Result<(), Box<dyn std::error::Error>> {
    let state = test_state().await;
    let engine = state.engine().clone();
    let (server, addr) = start_test_server(state).await?;

    let seat = engine
        .create_session(NewSession {
            name: "Closed Cup".into(),
            room_code: None,
            round_target: 1,
            referee_name: "Ref".into(),
            device_token: unique_device_token(),
        })
        .await?;

    let attempt = LiveClient::connect(addr, &seat.session.id, &unique_device_token()).await;
    assert!(attempt.is_err(), "handshake should be refused");
    assert_eq!(engine.gateway().subscriber_count(&seat.session.id), 0);

    server.stop(true).await;
    Ok(())
}
