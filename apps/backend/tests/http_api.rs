mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem;
use backend_test_support::unique_helpers::unique_device_token;
use serde_json::{json, Value};

use support::app::{test_app, test_state};

const DEVICE: &str = "x-device-id";

#[actix_web::test]
async fn health_reports_database_and_migrations() {
    let app = test_app!(test_state().await);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-trace-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["live_sessions"], 0);
    assert!(body["migrations"].as_u64().unwrap_or(0) >= 1);
}

#[actix_web::test]
async fn create_join_and_correlate_devices() {
    let app = test_app!(test_state().await);
    let referee = unique_device_token();
    let player = unique_device_token();

    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .insert_header((DEVICE, referee.as_str()))
        .set_json(json!({
            "name": "Summer Cup",
            "round_target": 3,
            "referee_name": "Riley",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let seat: Value = test::read_body_json(resp).await;
    let session_id = seat["session"]["id"].as_str().unwrap().to_string();
    let room_code = seat["session"]["room_code"].as_str().unwrap().to_string();
    assert_eq!(seat["participant"]["role"], "referee");
    assert!(seat["participant"].get("device_token").is_none());

    let req = test::TestRequest::post()
        .uri("/api/sessions/join")
        .insert_header((DEVICE, player.as_str()))
        .set_json(json!({ "room_code": room_code.to_lowercase(), "name": "Pat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let joined: Value = test::read_body_json(resp).await;
    assert_eq!(joined["session"]["id"], session_id.as_str());
    assert_eq!(joined["participant"]["role"], "player");

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((DEVICE, player.as_str()))
        .to_request();
    let me: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(me["participant"]["id"], joined["participant"]["id"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sessions/{session_id}"))
        .insert_header((DEVICE, player.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let snapshot: Value = test::read_body_json(resp).await;
    assert_eq!(snapshot["participants"].as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{session_id}/teams"))
        .insert_header((DEVICE, player.as_str()))
        .set_json(json!({ "name": "Otters" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let team: Value = test::read_body_json(resp).await;
    assert_eq!(team["name"], "Otters");
    assert_eq!(team["score"], 0.0);
}

#[actix_web::test]
async fn missing_device_header_is_rejected() {
    let app = test_app!(test_state().await);
    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .set_json(json!({ "name": "Cup", "round_target": 1, "referee_name": "R" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp.map_into_boxed_body(), "INVALID_HEADER", StatusCode::BAD_REQUEST).await;
}

#[actix_web::test]
async fn unknown_devices_cannot_act_in_a_session() {
    let app = test_app!(test_state().await);
    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .insert_header((DEVICE, unique_device_token().as_str()))
        .set_json(json!({ "name": "Cup", "round_target": 1, "referee_name": "R" }))
        .to_request();
    let seat: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let session_id = seat["session"]["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{session_id}/start"))
        .insert_header((DEVICE, unique_device_token().as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp.map_into_boxed_body(), "UNKNOWN_DEVICE", StatusCode::FORBIDDEN).await;
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let app = test_app!(test_state().await);
    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .insert_header((DEVICE, unique_device_token().as_str()))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp.map_into_boxed_body(), "BAD_REQUEST", StatusCode::BAD_REQUEST).await;
}

#[actix_web::test]
async fn domain_errors_keep_their_codes_over_http() {
    let app = test_app!(test_state().await);
    let referee = unique_device_token();
    let req = test::TestRequest::post()
        .uri("/api/sessions")
        .insert_header((DEVICE, referee.as_str()))
        .set_json(json!({ "name": "Cup", "round_target": 1, "referee_name": "R" }))
        .to_request();
    let seat: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let session_id = seat["session"]["id"].as_str().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/sessions/{session_id}/start"))
        .insert_header((DEVICE, referee.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem(
        resp.map_into_boxed_body(),
        "TEAM_NOT_READY",
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert_eq!(problem.title, "Team Not Ready");

    let req = test::TestRequest::post()
        .uri("/api/sessions/join")
        .insert_header((DEVICE, unique_device_token().as_str()))
        .set_json(json!({ "room_code": "ZZZZZ", "name": "Pat" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp.map_into_boxed_body(), "SESSION_NOT_FOUND", StatusCode::NOT_FOUND).await;
}
