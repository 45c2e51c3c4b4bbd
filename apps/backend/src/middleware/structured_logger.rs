use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::Error as ActixError;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::middleware::request_trace::TraceId;

/// One `request_completed` line per request, levelled by status class.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// Request facts captured before the handler consumes the request.
struct Completion {
    method: String,
    route: String,
    session_id: Option<String>,
    trace_id: Option<TraceId>,
    start: Instant,
}

impl Completion {
    fn log(&self, status: StatusCode) {
        let status_code = status.as_u16();
        let duration_us = self.start.elapsed().as_micros() as u64;
        let trace_id = self.trace_id.as_ref().map_or("unknown", TraceId::as_str);
        let session_id = self.session_id.as_deref().unwrap_or("-");
        let (method, route) = (self.method.as_str(), self.route.as_str());

        if status.is_server_error() {
            error!(method, route, session_id, status_code, duration_us, trace_id, "request_completed");
        } else if status.is_client_error() {
            warn!(method, route, session_id, status_code, duration_us, trace_id, "request_completed");
        } else {
            info!(method, route, session_id, status_code, duration_us, trace_id, "request_completed");
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Route patterns keep ids out of the log line's grouping key.
        let completion = Completion {
            method: req.method().to_string(),
            route: req
                .match_pattern()
                .unwrap_or_else(|| req.path().to_string()),
            session_id: req.match_info().get("session_id").map(str::to_string),
            trace_id: TraceId::of(req.request()),
            start: Instant::now(),
        };
        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            completion.log(status);
            result
        })
    }
}
