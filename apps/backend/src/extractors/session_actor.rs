use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use super::device;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::repos::participants::Participant;
use crate::state::app_state::AppState;

/// The participant behind the calling device, within the `{session_id}`
/// of the route.
#[derive(Debug, Clone)]
pub struct SessionActor {
    pub session_id: String,
    pub participant: Participant,
}

impl SessionActor {
    pub fn id(&self) -> &str {
        &self.participant.id
    }
}

impl FromRequest for SessionActor {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let device = device::extract(req);
        let session_id = req.match_info().get("session_id").map(str::to_string);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let device = device?;
            let session_id = session_id.ok_or_else(|| {
                AppError::bad_request(ErrorCode::BadRequest, "Missing session_id parameter")
            })?;
            let state = state.ok_or_else(|| AppError::internal("AppState not available"))?;

            let participant = state
                .engine()
                .resolve_in_session(&session_id, device.as_str())
                .await?;
            Ok(SessionActor {
                session_id,
                participant,
            })
        })
    }
}
