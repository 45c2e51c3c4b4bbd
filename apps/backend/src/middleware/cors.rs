use std::env;

use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

use crate::extractors::device::DEVICE_HEADER;

/// Dev origins of the party clients (phone web app and the scoreboard).
const DEV_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

/// Origins listed in `raw` (comma separated). Entries that are not http(s)
/// are dropped, as are trailing slashes, which browsers never send.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect()
}

/// CORS for the party clients, from `CORS_ALLOWED_ORIGINS`.
///
/// Clients identify through `x-device-id` and read `x-trace-id` back to
/// report failures.
pub fn cors_middleware() -> Cors {
    let mut origins = parse_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());
    if origins.is_empty() {
        origins = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
    }

    origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::ACCEPT,
                HeaderName::from_static(DEVICE_HEADER),
                HeaderName::from_static("x-request-id"),
            ])
            .expose_headers(vec![
                HeaderName::from_static("x-trace-id"),
                HeaderName::from_static("x-request-id"),
            ])
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origins_keeps_http_entries_only() {
        let parsed = parse_origins(" https://party.example/ ,null,,ftp://x, http://10.0.0.5:3000");
        assert_eq!(parsed, vec!["https://party.example", "http://10.0.0.5:3000"]);
        assert!(parse_origins("").is_empty());
    }
}
