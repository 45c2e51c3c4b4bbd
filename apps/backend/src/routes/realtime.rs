use actix_web::web;

use crate::realtime::socket;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions/{session_id}/live").route(web::get().to(socket::upgrade)));
}
