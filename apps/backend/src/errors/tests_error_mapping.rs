// Error mapping without HTTP or database dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::AppError;

#[test]
fn maps_validation_to_422() {
    let de = DomainError::validation(ValidationKind::TeamNotReady, "team Red has no leader");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::TeamNotReady);
    assert_eq!(app.status().as_u16(), 422);
    assert!(app.detail().contains("Red"));

    let other = DomainError::validation_other("anything else");
    let app: AppError = other.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_conflicts_to_409() {
    let pick = DomainError::conflict(ConflictKind::DicePickTaken, "already picked");
    let app: AppError = pick.into();
    assert_eq!(app.code().as_str(), "DICE_PICK_TAKEN");
    assert_eq!(app.status().as_u16(), 409);
    assert!(app.is_conflict());

    let other = DomainError::conflict(ConflictKind::Other("x".into()), "generic");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
}

#[test]
fn maps_not_found_to_404() {
    let nf = DomainError::not_found(NotFoundKind::DraftedGame, "no game");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "GAME_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);
}

#[test]
fn maps_forbidden_to_403() {
    let f = DomainError::forbidden(ForbiddenKind::RefereeOnly, "referee only");
    let app: AppError = f.into();
    assert_eq!(app.code().as_str(), "REFEREE_ONLY");
    assert_eq!(app.status().as_u16(), 403);
    assert!(!app.is_conflict());
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "DB_TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::infra(InfraErrorKind::DbUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "DB_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corr = DomainError::infra(InfraErrorKind::DataCorruption, "bad");
    let app: AppError = corr.into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn problem_details_body_carries_code_and_trace() {
    use actix_web::body::MessageBody;
    use actix_web::ResponseError;

    let app: AppError =
        DomainError::conflict(ConflictKind::NotYourTurn, "it is Blue's turn").into();
    let resp = app.error_response();
    assert_eq!(resp.status().as_u16(), 409);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    assert_eq!(
        resp.headers().get("x-trace-id").and_then(|v| v.to_str().ok()),
        Some("unknown")
    );

    let bytes = resp.into_body().try_into_bytes().expect("sized body");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(json["code"], "NOT_YOUR_TURN");
    assert_eq!(json["title"], "Not Your Turn");
    assert_eq!(json["trace_id"], "unknown");
}
