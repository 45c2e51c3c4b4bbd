//! Session completion and the ceremony views.

use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::extractors::SessionActor;
use crate::state::app_state::AppState;

async fn compute_global_titles(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let titles = app_state
        .engine()
        .compute_global_titles(&actor.session_id, actor.id())
        .await?;
    Ok(HttpResponse::Ok().json(titles))
}

async fn finish_session(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state
        .engine()
        .finish_session(&actor.session_id, actor.id())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn standings(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let standings = app_state.engine().team_standings(&actor.session_id).await?;
    Ok(HttpResponse::Ok().json(standings))
}

async fn leaderboard(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let rows = app_state
        .engine()
        .title_leaderboard(&actor.session_id)
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

async fn history(
    actor: SessionActor,
    path: web::Path<(String, String)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (_, participant_id) = path.into_inner();
    let history = app_state
        .engine()
        .participant_history(&actor.session_id, &participant_id)
        .await?;
    Ok(HttpResponse::Ok().json(history))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/sessions/{session_id}/global-titles")
            .route(web::post().to(compute_global_titles)),
    )
    .service(web::resource("/sessions/{session_id}/finish").route(web::post().to(finish_session)))
    .service(web::resource("/sessions/{session_id}/standings").route(web::get().to(standings)))
    .service(
        web::resource("/sessions/{session_id}/leaderboard").route(web::get().to(leaderboard)),
    )
    .service(
        web::resource("/sessions/{session_id}/participants/{participant_id}/history")
            .route(web::get().to(history)),
    );
}
