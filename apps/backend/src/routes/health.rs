use actix_web::{web, HttpResponse};
use migration::count_applied_migrations;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum StoreStatus {
    Ok,
    Unreachable,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    app_version: &'static str,
    db: StoreStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<usize>,
    /// Sessions currently holding a live change channel.
    live_sessions: usize,
    time: String,
}

/// `GET /health`. Answers 200 whenever the process serves requests; `db`
/// reports whether the store responded to a ping.
async fn health(state: web::Data<AppState>) -> HttpResponse {
    let db = state.db();
    let (db_status, db_error, migrations) = match db.ping().await {
        Ok(()) => (StoreStatus::Ok, None, count_applied_migrations(db).await.ok()),
        Err(e) => (StoreStatus::Unreachable, Some(e.to_string()), None),
    };

    HttpResponse::Ok().json(HealthReport {
        status: "ok",
        app_version: env!("CARGO_PKG_VERSION"),
        db: db_status,
        db_error,
        migrations,
        live_sessions: state.engine().gateway().open_channels(),
        time: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
