//! Drafted-game lifecycle: statistics, results and status advances.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::entities::drafted_games::GameStatus;
use crate::error::AppError;
use crate::extractors::{SessionActor, ValidatedJson};
use crate::services::GameOutcome;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct StatisticRequest {
    /// Defaults to the caller.
    #[serde(default)]
    participant_id: Option<String>,
    key: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct AdvanceRequest {
    status: GameStatus,
}

async fn submit_statistic(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: ValidatedJson<StatisticRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, game_id) = path.into_inner();
    let body = body.into_inner();
    let subject = body.participant_id.unwrap_or_else(|| actor.id().to_string());
    let stat = app_state
        .engine()
        .submit_statistic(
            &actor.session_id,
            actor.id(),
            &game_id,
            &subject,
            &body.key,
            body.value,
        )
        .await?;
    Ok(HttpResponse::Ok().json(stat))
}

async fn record_result(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: ValidatedJson<GameOutcome>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, game_id) = path.into_inner();
    let game = app_state
        .engine()
        .record_game_result(&actor.session_id, actor.id(), &game_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(game))
}

async fn advance_status(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    body: ValidatedJson<AdvanceRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, game_id) = path.into_inner();
    let advance = app_state
        .engine()
        .advance_game_status(&actor.session_id, actor.id(), &game_id, body.status)
        .await?;
    Ok(HttpResponse::Ok().json(advance))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sessions/{session_id}/games/{game_id}/statistics")
            .route(web::post().to(submit_statistic)),
    )
    .service(
        web::resource("/sessions/{session_id}/games/{game_id}/result")
            .route(web::post().to(record_result)),
    )
    .service(
        web::resource("/sessions/{session_id}/games/{game_id}/status")
            .route(web::post().to(advance_status)),
    );
}
