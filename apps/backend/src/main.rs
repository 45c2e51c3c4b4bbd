use actix_web::{web, App, HttpServer};
use uncolympics::config::db::DbKind;
use uncolympics::config::engine::EngineConfig;
use uncolympics::infra::state::build_state;
use uncolympics::middleware::cors::cors_middleware;
use uncolympics::middleware::request_trace::RequestTrace;
use uncolympics::middleware::structured_logger::StructuredLogger;
use uncolympics::middleware::trace_span::TraceSpan;
use uncolympics::routes;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Configuration comes from the environment (docker env_file, or
    // `set -a; . ./.env; set +a` for local runs).
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let db_kind = DbKind::from_env().unwrap_or_else(|e| {
        eprintln!("❌ Invalid DB_KIND: {e}");
        std::process::exit(1);
    });
    let config = EngineConfig::from_env().unwrap_or_else(|e| {
        eprintln!("❌ Invalid engine configuration: {e}");
        std::process::exit(1);
    });

    println!("🚀 Starting Uncolympics backend on http://{host}:{port}");

    let app_state = match build_state()
        .with_db(db_kind)
        .with_config(config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    println!("✅ Database connected ({db_kind:?})");

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
