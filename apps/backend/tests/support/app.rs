//! Actix test service wired like `main.rs`, minus CORS.

use uncolympics::state::app_state::AppState;
use uncolympics::{build_state, TournamentEngine};

/// Build an initialised test service around `$state`.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(uncolympics::StructuredLogger)
                .wrap(uncolympics::TraceSpan)
                .wrap(uncolympics::RequestTrace)
                .app_data(actix_web::web::Data::new($state))
                .configure(uncolympics::routes::configure),
        )
        .await
    };
}
pub(crate) use test_app;

pub async fn test_state() -> AppState {
    backend_test_support::logging::init();
    build_state().build().await.expect("build test state")
}

pub fn state_for(engine: TournamentEngine) -> AppState {
    AppState::new(engine)
}
