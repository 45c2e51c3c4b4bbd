//! DTOs for participants_sea adapter.

use crate::entities::participants::ParticipantRole;

#[derive(Debug, Clone)]
pub struct ParticipantCreate {
    pub session_id: String,
    pub name: String,
    pub role: ParticipantRole,
    pub device_token: String,
}

impl ParticipantCreate {
    pub fn new(
        session_id: impl Into<String>,
        name: impl Into<String>,
        role: ParticipantRole,
        device_token: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            name: name.into(),
            role,
            device_token: device_token.into(),
        }
    }

    /// Referees hold the leader flag for life.
    pub fn is_leader(&self) -> bool {
        self.role == ParticipantRole::Referee
    }
}
