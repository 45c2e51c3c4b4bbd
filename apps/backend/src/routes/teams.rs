//! Team formation and leader elections.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{SessionActor, ValidatedJson};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct TeamNameRequest {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct JoinTeamRequest {
    /// Defaults to the caller; the referee may move others.
    #[serde(default)]
    participant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteRequest {
    candidate_id: String,
}

async fn create_team(
    actor: SessionActor,
    body: ValidatedJson<TeamNameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let team = app_state
        .engine()
        .create_team(&actor.session_id, actor.id(), &body.name)
        .await?;
    Ok(HttpResponse::Created().json(team))
}

async fn rename_team(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: ValidatedJson<TeamNameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, team_id) = path.into_inner();
    let team = app_state
        .engine()
        .rename_team(&actor.session_id, actor.id(), &team_id, &body.name)
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

async fn join_team(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: Option<web::Json<JoinTeamRequest>>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, team_id) = path.into_inner();
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let participant_id = body.participant_id.unwrap_or_else(|| actor.id().to_string());
    let participant = app_state
        .engine()
        .join_team(&actor.session_id, actor.id(), &participant_id, &team_id)
        .await?;
    Ok(HttpResponse::Ok().json(participant))
}

async fn leave_team(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, participant_id) = path.into_inner();
    let participant = app_state
        .engine()
        .leave_team(&actor.session_id, actor.id(), &participant_id)
        .await?;
    Ok(HttpResponse::Ok().json(participant))
}

async fn vote(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: ValidatedJson<VoteRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, team_id) = path.into_inner();
    let result = app_state
        .engine()
        .vote_for_leader(&actor.session_id, actor.id(), &team_id, &body.candidate_id)
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn start_session(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state
        .engine()
        .start_session(&actor.session_id, actor.id())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions/{session_id}/teams").route(web::post().to(create_team)))
        .service(
            web::resource("/sessions/{session_id}/teams/{team_id}")
                .route(web::patch().to(rename_team)),
        )
        .service(
            web::resource("/sessions/{session_id}/teams/{team_id}/members")
                .route(web::post().to(join_team)),
        )
        .service(
            web::resource("/sessions/{session_id}/participants/{participant_id}/team")
                .route(web::delete().to(leave_team)),
        )
        .service(
            web::resource("/sessions/{session_id}/teams/{team_id}/votes")
                .route(web::post().to(vote)),
        )
        .service(
            web::resource("/sessions/{session_id}/start").route(web::post().to(start_session)),
        );
}
