//! Assigns every request a trace id.
//!
//! A well-formed inbound `x-request-id` (clients reuse one across retries)
//! is kept, otherwise a fresh UUID is minted. The id lives in the request
//! extensions as [`TraceId`], scopes the handler future through
//! `trace_ctx`, and is echoed back as `x-request-id` and `x-trace-id`.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpMessage, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use lazy_regex::regex_is_match;
use uuid::Uuid;

use crate::trace_ctx;

const REQUEST_ID: &str = "x-request-id";
const TRACE_ID: &str = "x-trace-id";

/// Trace id of one HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Client-supplied ids are limited to 8-64 URL-safe characters.
    fn from_client(raw: &str) -> Option<Self> {
        regex_is_match!(r"^[A-Za-z0-9_-]{8,64}$", raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id `RequestTrace` stored on `req`, if it ran.
    pub fn of(req: &HttpRequest) -> Option<TraceId> {
        req.extensions().get::<TraceId>().cloned()
    }
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = req
            .headers()
            .get(REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(TraceId::from_client)
            .unwrap_or_else(TraceId::mint);
        req.extensions_mut().insert(trace_id.clone());

        let scoped = trace_id.as_str().to_string();
        let fut = self.service.call(req);

        Box::pin(trace_ctx::with_trace_id(scoped, async move {
            let mut res = fut.await?;
            if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
                let headers = res.headers_mut();
                headers.insert(HeaderName::from_static(REQUEST_ID), value.clone());
                headers.insert(HeaderName::from_static(TRACE_ID), value);
            }
            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App, HttpResponse};

    use super::*;

    async fn echo_ctx() -> HttpResponse {
        HttpResponse::Ok().body(trace_ctx::trace_id())
    }

    #[actix_web::test]
    async fn mints_an_id_and_scopes_the_handler_with_it() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/", web::get().to(echo_ctx)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = resp.headers().get(TRACE_ID).cloned().expect("trace header");
        assert_eq!(resp.headers().get(REQUEST_ID), Some(&header));
        let body = test::read_body(resp).await;
        assert_eq!(body, header.as_bytes());
        assert!(Uuid::parse_str(header.to_str().unwrap()).is_ok());
    }

    #[actix_web::test]
    async fn keeps_well_formed_client_ids_only() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTrace)
                .route("/", web::get().to(echo_ctx)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((REQUEST_ID, "retry-7f3a9c21"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get(TRACE_ID).unwrap(), "retry-7f3a9c21");

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((REQUEST_ID, "bad id; drop table"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.headers().get(TRACE_ID).unwrap(), "bad id; drop table");
    }
}
