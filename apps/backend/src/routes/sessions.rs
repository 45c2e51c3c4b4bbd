//! Session creation, joining and device correlation.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::entities::participants::ParticipantRole;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{DeviceId, SessionActor, ValidatedJson};
use crate::services::NewSession;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    name: String,
    #[serde(default)]
    room_code: Option<String>,
    round_target: i32,
    referee_name: String,
}

#[derive(Debug, Deserialize)]
struct JoinSessionRequest {
    room_code: String,
    name: String,
    #[serde(default = "default_role")]
    role: ParticipantRole,
}

fn default_role() -> ParticipantRole {
    ParticipantRole::Player
}

/// `POST /api/sessions`: the calling device becomes the referee.
async fn create_session(
    device: DeviceId,
    body: ValidatedJson<CreateSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let seat = app_state
        .engine()
        .create_session(NewSession {
            name: body.name,
            room_code: body.room_code,
            round_target: body.round_target,
            referee_name: body.referee_name,
            device_token: device.into_inner(),
        })
        .await?;
    Ok(HttpResponse::Created().json(seat))
}

/// `POST /api/sessions/join`
async fn join_session(
    device: DeviceId,
    body: ValidatedJson<JoinSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let seat = app_state
        .engine()
        .join_session(&body.room_code, &body.name, device.as_str(), body.role)
        .await?;
    Ok(HttpResponse::Ok().json(seat))
}

/// `GET /api/me`: the open session this device belongs to.
async fn whoami(
    device: DeviceId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match app_state.engine().resolve(device.as_str()).await? {
        Some(seat) => Ok(HttpResponse::Ok().json(seat)),
        None => Err(AppError::not_found(
            ErrorCode::ParticipantNotFound,
            "Device is not part of an open session",
        )),
    }
}

/// `GET /api/sessions/{session_id}`: full snapshot for (re)connecting clients.
async fn snapshot(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.engine().session_snapshot(&actor.session_id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions").route(web::post().to(create_session)))
        .service(web::resource("/sessions/join").route(web::post().to(join_session)))
        .service(web::resource("/me").route(web::get().to(whoami)))
        .service(web::resource("/sessions/{session_id}").route(web::get().to(snapshot)));
}
