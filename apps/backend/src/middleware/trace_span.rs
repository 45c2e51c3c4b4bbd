//! Per-request tracing span.
//!
//! Wire it inside `RequestTrace` so the trace id is already in the request
//! extensions:
//!
//! App::new()
//!     .wrap(StructuredLogger)
//!     .wrap(TraceSpan)
//!     .wrap(RequestTrace)
//!
//! Session-scoped routes put `session_id` on the span, so every engine log
//! line of the request can be filtered by tournament.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use tracing::{field, info_span, Instrument};

use crate::extractors::device::DEVICE_HEADER;
use crate::middleware::request_trace::TraceId;

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::of(req.request());
        let span = info_span!(
            "request",
            trace_id = trace_id.as_ref().map_or("-", TraceId::as_str),
            method = %req.method(),
            path = %req.path(),
            session_id = field::Empty,
            device = req.headers().contains_key(DEVICE_HEADER),
        );
        if let Some(session_id) = req.match_info().get("session_id") {
            span.record("session_id", session_id);
        }

        Box::pin(self.service.call(req).instrument(span))
    }
}
