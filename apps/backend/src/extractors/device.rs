//! Device token extractor.
//!
//! Clients identify themselves with an opaque per-device token, sent as the
//! `x-device-id` header. Browsers cannot set headers on a websocket upgrade,
//! so a `device` query parameter is accepted as a fallback.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use serde::Deserialize;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub const DEVICE_HEADER: &str = "x-device-id";
const MAX_TOKEN_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Deserialize)]
struct DeviceQuery {
    device: Option<String>,
}

fn parse_token(raw: &str) -> Result<DeviceId, AppError> {
    let token = raw.trim();
    if token.is_empty() || token.len() > MAX_TOKEN_LEN {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Device token must be 1..={MAX_TOKEN_LEN} bytes"),
        ));
    }
    if !token.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            "Device token must be printable ASCII",
        ));
    }
    Ok(DeviceId(token.to_string()))
}

pub(crate) fn extract(req: &HttpRequest) -> Result<DeviceId, AppError> {
    if let Some(value) = req.headers().get(DEVICE_HEADER) {
        let raw = value.to_str().map_err(|_| {
            AppError::bad_request(ErrorCode::InvalidHeader, "Device header is not valid text")
        })?;
        return parse_token(raw);
    }

    let query = web::Query::<DeviceQuery>::from_query(req.query_string()).ok();
    match query.and_then(|q| q.into_inner().device) {
        Some(raw) => parse_token(&raw),
        None => Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Missing {DEVICE_HEADER} header"),
        )),
    }
}

impl FromRequest for DeviceId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn header_wins_over_query() {
        let req = TestRequest::default()
            .uri("/live?device=from-query")
            .insert_header((DEVICE_HEADER, "from-header"))
            .to_http_request();
        assert_eq!(extract(&req).unwrap().as_str(), "from-header");
    }

    #[test]
    fn query_fallback() {
        let req = TestRequest::default()
            .uri("/live?device=phone-42")
            .to_http_request();
        assert_eq!(extract(&req).unwrap().as_str(), "phone-42");
    }

    #[test]
    fn missing_or_malformed_token_is_rejected() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(extract(&req).unwrap_err().code(), ErrorCode::InvalidHeader);

        let req = TestRequest::default()
            .insert_header((DEVICE_HEADER, "has space"))
            .to_http_request();
        assert!(extract(&req).is_err());

        let long = "x".repeat(MAX_TOKEN_LEN + 1);
        let req = TestRequest::default()
            .insert_header((DEVICE_HEADER, long.as_str()))
            .to_http_request();
        assert!(extract(&req).is_err());
    }
}
