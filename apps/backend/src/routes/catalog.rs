//! Game catalog: global entries and per-session custom games.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::stat_schema::StatSchema;
use crate::error::AppError;
use crate::extractors::{SessionActor, ValidatedJson};
use crate::services::NewCatalogEntry;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct CatalogEntryRequest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    rule_key: Option<String>,
    #[serde(default)]
    stat_schema: StatSchema,
}

impl From<CatalogEntryRequest> for NewCatalogEntry {
    fn from(req: CatalogEntryRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            rule_key: req.rule_key,
            stat_schema: req.stat_schema,
        }
    }
}

/// `POST /api/catalog`: operator-curated entry visible to every session.
async fn create_global_entry(
    body: ValidatedJson<CatalogEntryRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let entry = app_state
        .engine()
        .create_global_catalog_entry(body.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

async fn create_session_entry(
    actor: SessionActor,
    body: ValidatedJson<CatalogEntryRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let entry = app_state
        .engine()
        .create_session_catalog_entry(&actor.session_id, actor.id(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(entry))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/catalog").route(web::post().to(create_global_entry)))
        .service(
            web::resource("/sessions/{session_id}/catalog")
                .route(web::post().to(create_session_entry)),
        );
}
