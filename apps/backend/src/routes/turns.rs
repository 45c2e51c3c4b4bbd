//! First-pick dice roll and the draft.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::extractors::{SessionActor, ValidatedJson};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct DicePickRequest {
    team_id: String,
    value: i64,
}

#[derive(Debug, Deserialize)]
struct DraftPickRequest {
    team_id: String,
    catalog_id: String,
}

async fn dice_state(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = app_state.engine().dice_state(&actor.session_id).await?;
    Ok(HttpResponse::Ok().json(state))
}

async fn submit_dice_pick(
    actor: SessionActor,
    body: ValidatedJson<DicePickRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = app_state
        .engine()
        .submit_dice_pick(&actor.session_id, actor.id(), &body.team_id, body.value)
        .await?;
    Ok(HttpResponse::Ok().json(state))
}

async fn reset_dice(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let state = app_state
        .engine()
        .reset_dice_roll(&actor.session_id, actor.id())
        .await?;
    Ok(HttpResponse::Ok().json(state))
}

async fn confirm_dice(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state
        .engine()
        .confirm_dice_winner(&actor.session_id, actor.id())
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

async fn available_games(
    actor: SessionActor,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let games = app_state
        .engine()
        .list_available_games(&actor.session_id)
        .await?;
    Ok(HttpResponse::Ok().json(games))
}

async fn pick_game(
    actor: SessionActor,
    body: ValidatedJson<DraftPickRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let game = app_state
        .engine()
        .pick_game(&actor.session_id, actor.id(), &body.team_id, &body.catalog_id)
        .await?;
    Ok(HttpResponse::Created().json(game))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions/{session_id}/dice").route(web::get().to(dice_state)))
        .service(
            web::resource("/sessions/{session_id}/dice/picks")
                .route(web::post().to(submit_dice_pick)),
        )
        .service(
            web::resource("/sessions/{session_id}/dice/reset").route(web::post().to(reset_dice)),
        )
        .service(
            web::resource("/sessions/{session_id}/dice/confirm")
                .route(web::post().to(confirm_dice)),
        )
        .service(
            web::resource("/sessions/{session_id}/available-games")
                .route(web::get().to(available_games)),
        )
        .service(web::resource("/sessions/{session_id}/draft").route(web::post().to(pick_game)));
}
