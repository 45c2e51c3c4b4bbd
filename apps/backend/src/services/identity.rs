//! Session creation, joining and device correlation.

use sea_orm::{ConnectionTrait, DatabaseTransaction};
use serde::Serialize;
use tracing::{debug, info};

use crate::entities::participants::ParticipantRole;
use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use crate::realtime::EventBatch;
use crate::repos::participants::{self, Participant, ParticipantCreate};
use crate::repos::sessions::{self, Session, SessionCreate};
use crate::utils::names::normalize_name;
use crate::utils::room_code::{generate_room_code, normalize_room_code};

const MAX_DEVICE_TOKEN_LEN: usize = 128;
const ROOM_CODE_ATTEMPTS: usize = 8;

/// Input for `create_session`.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub name: String,
    /// Generated when absent.
    pub room_code: Option<String>,
    pub round_target: i32,
    pub referee_name: String,
    pub device_token: String,
}

/// A session together with the caller's participant in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSeat {
    pub session: Session,
    pub participant: Participant,
}

#[derive(Default)]
pub struct IdentityService;

impl IdentityService {
    pub async fn create_session(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        req: NewSession,
        max_round_target: i32,
    ) -> Result<SessionSeat, AppError> {
        debug!(room_code = ?req.room_code, round_target = req.round_target, "Creating session");

        let name = normalize_name(&req.name, "session name")?;
        let referee_name = normalize_name(&req.referee_name, "referee name")?;
        let device_token = validate_device_token(&req.device_token)?;
        if !(1..=max_round_target).contains(&req.round_target) {
            return Err(DomainError::validation(
                ValidationKind::InvalidRoundTarget,
                format!("round target must be between 1 and {max_round_target}"),
            )
            .into());
        }

        let room_code = match req.room_code.as_deref() {
            Some(raw) => {
                let code = normalize_room_code(raw)?;
                if sessions::find_open_by_room_code(txn, &code).await?.is_some() {
                    return Err(DomainError::conflict(
                        ConflictKind::RoomCodeTaken,
                        format!("Room code {code} is already in use"),
                    )
                    .into());
                }
                code
            }
            None => free_room_code(txn).await?,
        };

        let session =
            sessions::create_session(txn, SessionCreate::new(name, &room_code, req.round_target))
                .await?;
        let referee = participants::create_participant(
            txn,
            ParticipantCreate::new(
                &session.id,
                referee_name,
                ParticipantRole::Referee,
                device_token,
            ),
        )
        .await?;
        let session = sessions::set_owner(txn, &session.id, &referee.id).await?;

        events.upsert(&session.id, &session);
        events.upsert(&session.id, &referee);

        info!(
            session_id = %session.id,
            room_code = %session.room_code,
            referee_id = %referee.id,
            "Session created"
        );
        Ok(SessionSeat {
            session,
            participant: referee,
        })
    }

    /// Join by room code. A device that already joined gets its existing
    /// participant back, even after the session left `forming`.
    pub async fn join_session(
        &self,
        txn: &DatabaseTransaction,
        events: &mut EventBatch,
        room_code: &str,
        name: &str,
        device_token: &str,
        role: ParticipantRole,
    ) -> Result<SessionSeat, AppError> {
        debug!(room_code, ?role, "Joining session");

        if role == ParticipantRole::Referee {
            return Err(DomainError::validation(
                ValidationKind::InvalidRole,
                "role must be player or spectator",
            )
            .into());
        }
        let code = normalize_room_code(room_code)?;
        let device_token = validate_device_token(device_token)?;

        let session = sessions::find_open_by_room_code(txn, &code)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Session, format!("Room {code} not found"))
            })?;

        if let Some(existing) = participants::find_by_device(txn, &session.id, device_token).await?
        {
            debug!(session_id = %session.id, participant_id = %existing.id, "Device rejoined");
            return Ok(SessionSeat {
                session,
                participant: existing,
            });
        }

        if session.status != SessionStatus::Forming {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "Tournament has already started",
            )
            .into());
        }

        let name = normalize_name(name, "name")?;
        let participant = participants::create_participant(
            txn,
            ParticipantCreate::new(&session.id, name, role, device_token),
        )
        .await?;
        events.upsert(&session.id, &participant);

        info!(
            session_id = %session.id,
            participant_id = %participant.id,
            ?role,
            "Participant joined"
        );
        Ok(SessionSeat {
            session,
            participant,
        })
    }

    /// The participant bound to `device_token` in the newest open session.
    pub async fn resolve<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        device_token: &str,
    ) -> Result<Option<SessionSeat>, AppError> {
        let Some(participant) = participants::find_active_by_device(conn, device_token).await?
        else {
            return Ok(None);
        };
        let session = sessions::require_session(conn, &participant.session_id).await?;
        Ok(Some(SessionSeat {
            session,
            participant,
        }))
    }

    pub async fn resolve_in_session<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
        device_token: &str,
    ) -> Result<Participant, AppError> {
        participants::find_by_device(conn, session_id, device_token)
            .await?
            .ok_or_else(|| {
                DomainError::forbidden(
                    ForbiddenKind::UnknownDevice,
                    format!("Device is not registered in session {session_id}"),
                )
                .into()
            })
    }
}

fn validate_device_token(raw: &str) -> Result<&str, DomainError> {
    let token = raw.trim();
    if token.is_empty() || token.len() > MAX_DEVICE_TOKEN_LEN {
        return Err(DomainError::validation_other(format!(
            "device token must be 1-{MAX_DEVICE_TOKEN_LEN} bytes"
        )));
    }
    Ok(token)
}

async fn free_room_code(txn: &DatabaseTransaction) -> Result<String, DomainError> {
    for _ in 0..ROOM_CODE_ATTEMPTS {
        let code = generate_room_code();
        if sessions::find_open_by_room_code(txn, &code).await?.is_none() {
            return Ok(code);
        }
    }
    Err(DomainError::conflict(
        ConflictKind::RoomCodeTaken,
        "Could not allocate a free room code; pick one explicitly",
    ))
}
