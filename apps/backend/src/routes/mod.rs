use actix_web::web;

pub mod catalog;
pub mod games;
pub mod health;
pub mod realtime;
pub mod results;
pub mod sessions;
pub mod teams;
pub mod turns;

/// Register every route. `main.rs` and the HTTP tests share this so both
/// see the same surface.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
    cfg.service(
        web::scope("/api")
            .configure(catalog::configure_routes)
            .configure(sessions::configure_routes)
            .configure(teams::configure_routes)
            .configure(turns::configure_routes)
            .configure(games::configure_routes)
            .configure(results::configure_routes)
            .configure(realtime::configure_routes),
    );
}
